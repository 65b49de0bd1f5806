//! Service-area service - postcode eligibility and registry admin.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{NewServicePostcode, PostcodeCheck, ServiceAddressRule, ServicePostcode};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait ServiceAreaService: Send + Sync {
    /// Whether the shop delivers to `postcode`
    async fn check_postcode(&self, postcode: &str) -> AppResult<PostcodeCheck>;

    /// Known street rules for an active postcode
    async fn street_rules(&self, postcode: &str) -> AppResult<Vec<ServiceAddressRule>>;

    async fn list_postcodes(&self) -> AppResult<Vec<ServicePostcode>>;

    async fn add_postcode(&self, postcode: NewServicePostcode) -> AppResult<ServicePostcode>;

    async fn deactivate_postcode(&self, postcode: &str) -> AppResult<ServicePostcode>;
}

pub struct ServiceAreaManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ServiceAreaManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> ServiceAreaService for ServiceAreaManager<U> {
    async fn check_postcode(&self, postcode: &str) -> AppResult<PostcodeCheck> {
        let entry = self.uow.service_area().find_active_postcode(postcode.trim()).await?;
        Ok(match entry {
            Some(entry) => PostcodeCheck::serviceable(entry.city),
            None => PostcodeCheck::not_serviceable(),
        })
    }

    async fn street_rules(&self, postcode: &str) -> AppResult<Vec<ServiceAddressRule>> {
        self.uow.service_area().list_street_rules(postcode.trim()).await
    }

    async fn list_postcodes(&self) -> AppResult<Vec<ServicePostcode>> {
        self.uow.service_area().list_postcodes().await
    }

    async fn add_postcode(&self, postcode: NewServicePostcode) -> AppResult<ServicePostcode> {
        let postcode = NewServicePostcode {
            postcode: postcode.postcode.trim().to_string(),
            city: postcode.city.trim().to_string(),
            ..postcode
        };
        let created = self.uow.service_area().create_postcode(postcode).await?;
        tracing::info!(postcode = %created.postcode, city = %created.city, "Service postcode added");
        Ok(created)
    }

    async fn deactivate_postcode(&self, postcode: &str) -> AppResult<ServicePostcode> {
        let entry = self
            .uow
            .service_area()
            .deactivate_postcode(postcode.trim())
            .await?
            .ok_or_not_found("Postcode")?;
        tracing::info!(postcode = %entry.postcode, "Service postcode deactivated");
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::service_area::NOT_SERVICEABLE_MESSAGE;
    use crate::errors::AppError;
    use crate::services::test_support::{MockRepositories, TestUnitOfWork};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn service(repos: MockRepositories) -> ServiceAreaManager<TestUnitOfWork> {
        ServiceAreaManager::new(Arc::new(TestUnitOfWork::new(repos)))
    }

    fn entry(postcode: &str, city: &str) -> ServicePostcode {
        ServicePostcode {
            id: Uuid::new_v4(),
            postcode: postcode.into(),
            city: city.into(),
            is_active: true,
            delivery_fee: Decimal::ZERO,
            min_order_amount: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_serviceable_postcode_returns_city() {
        let mut repos = MockRepositories::default();
        repos
            .service_area
            .expect_find_active_postcode()
            .withf(|postcode| postcode == "2100")
            .returning(|_| Ok(Some(entry("2100", "København Ø"))));

        let check = service(repos).check_postcode(" 2100 ").await.unwrap();
        assert!(check.valid);
        assert_eq!(check.city_name.as_deref(), Some("København Ø"));
        assert_eq!(check.error, None);
    }

    #[tokio::test]
    async fn test_unknown_postcode_is_not_serviceable() {
        let mut repos = MockRepositories::default();
        repos.service_area.expect_find_active_postcode().returning(|_| Ok(None));

        let check = service(repos).check_postcode("9990").await.unwrap();
        assert!(!check.valid);
        assert_eq!(check.city_name, None);
        assert_eq!(check.error.as_deref(), Some(NOT_SERVICEABLE_MESSAGE));
    }

    #[tokio::test]
    async fn test_deactivate_unknown_postcode_is_not_found() {
        let mut repos = MockRepositories::default();
        repos.service_area.expect_deactivate_postcode().returning(|_| Ok(None));

        let result = service(repos).deactivate_postcode("1234").await;
        assert!(matches!(result, Err(AppError::NotFound("Postcode"))));
    }

    #[tokio::test]
    async fn test_duplicate_postcode_is_conflict() {
        let mut repos = MockRepositories::default();
        repos
            .service_area
            .expect_create_postcode()
            .returning(|_| Err(AppError::conflict("Postcode")));

        let result = service(repos)
            .add_postcode(NewServicePostcode {
                postcode: "2100".into(),
                city: "København Ø".into(),
                delivery_fee: None,
                min_order_amount: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
