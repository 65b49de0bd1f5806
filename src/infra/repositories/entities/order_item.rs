//! Order line entity with its frozen product snapshot.

use sea_orm::entity::prelude::*;

use crate::domain::{OrderItem, ProductSnapshot};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub product_snapshot: Json,
    pub quantity: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price_at_purchase: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub line_total: Decimal,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Restrict"
    )]
    Product,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for OrderItem {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let product_snapshot: ProductSnapshot = serde_json::from_value(model.product_snapshot)
            .map_err(|e| AppError::internal(format!("corrupt product snapshot: {}", e)))?;

        Ok(OrderItem {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            product_snapshot,
            quantity: model.quantity,
            price_at_purchase: model.price_at_purchase,
            line_total: model.line_total,
        })
    }
}
