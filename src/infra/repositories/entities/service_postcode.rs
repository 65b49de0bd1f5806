//! Service-area postcode entity.

use sea_orm::entity::prelude::*;

use crate::domain::ServicePostcode;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "service_postcodes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub postcode: String,
    pub city: String,
    pub is_active: bool,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub delivery_fee: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub min_order_amount: Decimal,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ServicePostcode {
    fn from(model: Model) -> Self {
        ServicePostcode {
            id: model.id,
            postcode: model.postcode,
            city: model.city,
            is_active: model.is_active,
            delivery_fee: model.delivery_fee,
            min_order_amount: model.min_order_amount,
            created_at: model.created_at,
        }
    }
}
