//! Address service - the customer's address book.
//!
//! Addresses can only be created inside the service area. The registry's
//! city name replaces whatever the customer typed, and the first address a
//! customer saves becomes their default.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::DEFAULT_ADDRESS_LABEL;
use crate::domain::{Address, AddressChanges, NewAddress};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait AddressService: Send + Sync {
    /// Default first, then newest first
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Address>>;

    async fn get(&self, user_id: Uuid, id: Uuid) -> AppResult<Address>;

    async fn create(&self, user_id: Uuid, address: NewAddress) -> AppResult<Address>;

    async fn update(&self, user_id: Uuid, id: Uuid, changes: AddressChanges) -> AppResult<Address>;

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()>;
}

pub struct AddressManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> AddressManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl<U: UnitOfWork> AddressService for AddressManager<U> {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Address>> {
        self.uow.addresses().list_for_user(user_id).await
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> AppResult<Address> {
        self.uow
            .addresses()
            .find_for_user(user_id, id)
            .await?
            .ok_or_not_found("Address")
    }

    async fn create(&self, user_id: Uuid, address: NewAddress) -> AppResult<Address> {
        let postcode = address.postcode.trim().to_string();
        let registry = self
            .uow
            .service_area()
            .find_active_postcode(&postcode)
            .await?
            .ok_or_else(|| {
                AppError::business(format!("Postcode {} is not in our service area", postcode))
            })?;

        let is_first = self.uow.addresses().count_for_user(user_id).await? == 0;
        let now = Utc::now();

        let address = Address {
            id: Uuid::new_v4(),
            user_id,
            label: non_empty(address.label).unwrap_or_else(|| DEFAULT_ADDRESS_LABEL.to_string()),
            street: address.street.trim().to_string(),
            building: non_empty(address.building),
            floor: non_empty(address.floor),
            apartment: non_empty(address.apartment),
            postcode: registry.postcode,
            city: registry.city,
            instructions: non_empty(address.instructions),
            is_default: address.is_default || is_first,
            is_verified: true,
            created_at: now,
            updated_at: now,
        };

        let created = self.uow.addresses().create(address).await?;
        tracing::info!(user_id = %user_id, address_id = %created.id, "Address created");
        Ok(created)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, changes: AddressChanges) -> AppResult<Address> {
        let mut address = self.get(user_id, id).await?;

        if let Some(street) = changes.street {
            address.street = street.trim().to_string();
        }
        if changes.building.is_some() {
            address.building = non_empty(changes.building);
        }
        if changes.floor.is_some() {
            address.floor = non_empty(changes.floor);
        }
        if changes.apartment.is_some() {
            address.apartment = non_empty(changes.apartment);
        }
        if changes.instructions.is_some() {
            address.instructions = non_empty(changes.instructions);
        }
        if let Some(label) = non_empty(changes.label) {
            address.label = label;
        }
        if let Some(is_default) = changes.is_default {
            address.is_default = is_default;
        }
        address.updated_at = Utc::now();

        self.uow.addresses().update(address).await
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        if !self.uow.addresses().delete(user_id, id).await? {
            return Err(AppError::NotFound("Address"));
        }
        tracing::info!(user_id = %user_id, address_id = %id, "Address deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ServicePostcode;
    use crate::infra::repositories::ADDRESS_IN_USE_MESSAGE;
    use crate::services::test_support::{MockRepositories, TestUnitOfWork};
    use rust_decimal::Decimal;

    fn service(repos: MockRepositories) -> AddressManager<TestUnitOfWork> {
        AddressManager::new(Arc::new(TestUnitOfWork::new(repos)))
    }

    fn new_address() -> NewAddress {
        NewAddress {
            postcode: "2100".into(),
            city: "kbh".into(),
            street: "Østerbrogade".into(),
            building: Some("12".into()),
            floor: Some("".into()),
            apartment: None,
            instructions: None,
            label: None,
            is_default: false,
        }
    }

    fn registry_entry() -> ServicePostcode {
        ServicePostcode {
            id: Uuid::new_v4(),
            postcode: "2100".into(),
            city: "København Ø".into(),
            is_active: true,
            delivery_fee: Decimal::ZERO,
            min_order_amount: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    fn stored(user_id: Uuid) -> Address {
        let now = Utc::now();
        Address {
            id: Uuid::new_v4(),
            user_id,
            label: "Home".into(),
            street: "Østerbrogade".into(),
            building: Some("12".into()),
            floor: None,
            apartment: None,
            postcode: "2100".into(),
            city: "København Ø".into(),
            instructions: None,
            is_default: true,
            is_verified: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_first_address_is_default_with_registry_city() {
        let user_id = Uuid::new_v4();
        let mut repos = MockRepositories::default();
        repos
            .service_area
            .expect_find_active_postcode()
            .returning(|_| Ok(Some(registry_entry())));
        repos.addresses.expect_count_for_user().returning(|_| Ok(0));
        repos.addresses.expect_create().returning(|address| Ok(address));

        let address = service(repos).create(user_id, new_address()).await.unwrap();

        assert!(address.is_default);
        assert!(address.is_verified);
        assert_eq!(address.city, "København Ø");
        assert_eq!(address.label, "Home");
        assert_eq!(address.floor, None);
        assert_eq!(address.user_id, user_id);
    }

    #[tokio::test]
    async fn test_second_address_not_default_unless_asked() {
        let mut repos = MockRepositories::default();
        repos
            .service_area
            .expect_find_active_postcode()
            .returning(|_| Ok(Some(registry_entry())));
        repos.addresses.expect_count_for_user().returning(|_| Ok(2));
        repos.addresses.expect_create().returning(|address| Ok(address));

        let address = service(repos).create(Uuid::new_v4(), new_address()).await.unwrap();
        assert!(!address.is_default);
    }

    #[tokio::test]
    async fn test_postcode_outside_service_area_rejected() {
        let mut repos = MockRepositories::default();
        repos.service_area.expect_find_active_postcode().returning(|_| Ok(None));
        repos.addresses.expect_create().never();

        let mut address = new_address();
        address.postcode = "9990".into();
        let err = service(repos).create(Uuid::new_v4(), address).await.unwrap_err();

        assert_eq!(err.to_string(), "Postcode 9990 is not in our service area");
    }

    #[tokio::test]
    async fn test_update_applies_partial_changes() {
        let mut repos = MockRepositories::default();
        repos
            .addresses
            .expect_find_for_user()
            .returning(|user_id, _| Ok(Some(stored(user_id))));
        repos.addresses.expect_update().returning(|address| Ok(address));

        let address = service(repos)
            .update(
                Uuid::new_v4(),
                Uuid::new_v4(),
                AddressChanges {
                    floor: Some("2".into()),
                    label: Some("Work".into()),
                    ..AddressChanges::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(address.floor.as_deref(), Some("2"));
        assert_eq!(address.label, "Work");
        assert_eq!(address.street, "Østerbrogade");
        assert_eq!(address.postcode, "2100");
    }

    #[tokio::test]
    async fn test_delete_missing_address_is_not_found() {
        let mut repos = MockRepositories::default();
        repos.addresses.expect_delete().returning(|_, _| Ok(false));

        let result = service(repos).delete(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound("Address"))));
    }

    #[tokio::test]
    async fn test_delete_address_used_by_order_is_business_error() {
        let mut repos = MockRepositories::default();
        repos
            .addresses
            .expect_delete()
            .returning(|_, _| Err(AppError::business(ADDRESS_IN_USE_MESSAGE)));

        let err = service(repos).delete(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.to_string(), ADDRESS_IN_USE_MESSAGE);
    }
}
