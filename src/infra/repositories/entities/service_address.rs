//! Street-level service rules.

use sea_orm::entity::prelude::*;

use crate::domain::ServiceAddressRule;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "service_addresses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub street_pattern: String,
    pub postcode: String,
    pub is_blacklisted: bool,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ServiceAddressRule {
    fn from(model: Model) -> Self {
        ServiceAddressRule {
            id: model.id,
            street_pattern: model.street_pattern,
            postcode: model.postcode,
            is_blacklisted: model.is_blacklisted,
            notes: model.notes,
        }
    }
}
