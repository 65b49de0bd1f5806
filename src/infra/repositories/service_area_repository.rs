//! Service-area repository: postcode allow-list and street rules.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::service_address::{self, Entity as ServiceAddressEntity};
use super::entities::service_postcode::{self, ActiveModel, Entity as ServicePostcodeEntity};
use crate::domain::{NewServicePostcode, ServiceAddressRule, ServicePostcode};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service-area repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ServiceAreaRepository: Send + Sync {
    /// Active registry entry for `postcode`
    async fn find_active_postcode(&self, postcode: &str) -> AppResult<Option<ServicePostcode>>;

    /// Street rules for an active postcode, ordered by street pattern
    async fn list_street_rules(&self, postcode: &str) -> AppResult<Vec<ServiceAddressRule>>;

    /// Every registry entry, ordered by postcode
    async fn list_postcodes(&self) -> AppResult<Vec<ServicePostcode>>;

    async fn create_postcode(&self, postcode: NewServicePostcode) -> AppResult<ServicePostcode>;

    /// Clear `is_active`; `None` when the postcode is unknown
    async fn deactivate_postcode(&self, postcode: &str) -> AppResult<Option<ServicePostcode>>;
}

/// Concrete implementation of ServiceAreaRepository
pub struct ServiceAreaStore {
    db: DatabaseConnection,
}

impl ServiceAreaStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ServiceAreaRepository for ServiceAreaStore {
    async fn find_active_postcode(&self, postcode: &str) -> AppResult<Option<ServicePostcode>> {
        let result = ServicePostcodeEntity::find()
            .filter(service_postcode::Column::Postcode.eq(postcode))
            .filter(service_postcode::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(ServicePostcode::from))
    }

    async fn list_street_rules(&self, postcode: &str) -> AppResult<Vec<ServiceAddressRule>> {
        if self.find_active_postcode(postcode).await?.is_none() {
            return Ok(Vec::new());
        }

        let models = ServiceAddressEntity::find()
            .filter(service_address::Column::Postcode.eq(postcode))
            .order_by_asc(service_address::Column::StreetPattern)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(ServiceAddressRule::from).collect())
    }

    async fn list_postcodes(&self) -> AppResult<Vec<ServicePostcode>> {
        let models = ServicePostcodeEntity::find()
            .order_by_asc(service_postcode::Column::Postcode)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(ServicePostcode::from).collect())
    }

    async fn create_postcode(&self, postcode: NewServicePostcode) -> AppResult<ServicePostcode> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            postcode: Set(postcode.postcode),
            city: Set(postcode.city),
            is_active: Set(true),
            delivery_fee: Set(postcode.delivery_fee.unwrap_or(Decimal::ZERO)),
            min_order_amount: Set(postcode.min_order_amount.unwrap_or(Decimal::ZERO)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| AppError::from_unique_violation(e, "Postcode"))?;

        Ok(ServicePostcode::from(model))
    }

    async fn deactivate_postcode(&self, postcode: &str) -> AppResult<Option<ServicePostcode>> {
        let Some(model) = ServicePostcodeEntity::find()
            .filter(service_postcode::Column::Postcode.eq(postcode))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active: ActiveModel = model.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Some(ServicePostcode::from(model)))
    }
}
