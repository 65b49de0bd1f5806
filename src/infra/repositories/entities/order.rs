//! Order header entity.

use sea_orm::entity::prelude::*;

use crate::domain::{AddressSnapshot, Order, OrderStatus};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub address_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub address_snapshot: Json,
    pub status: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub delivery_fee: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total: Decimal,
    #[sea_orm(unique)]
    pub invoice_number: String,
    pub invoice_generated_at: Option<DateTimeUtc>,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Restrict"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::address::Entity",
        from = "Column::AddressId",
        to = "super::address::Column::Id",
        on_delete = "Restrict"
    )]
    Address,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Order {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let address_snapshot: AddressSnapshot = serde_json::from_value(model.address_snapshot)
            .map_err(|e| AppError::internal(format!("corrupt address snapshot: {}", e)))?;
        let status: OrderStatus = model
            .status
            .parse()
            .map_err(|_| AppError::internal(format!("unknown order status '{}'", model.status)))?;

        Ok(Order {
            id: model.id,
            user_id: model.user_id,
            address_id: model.address_id,
            address_snapshot,
            status,
            subtotal: model.subtotal,
            delivery_fee: model.delivery_fee,
            total: model.total,
            invoice_number: model.invoice_number,
            invoice_generated_at: model.invoice_generated_at,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
