//! Append-only order status history.

use sea_orm::entity::prelude::*;

use crate::domain::{OrderStatus, StatusChange};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "order_status_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_id: Uuid,
    pub status: String,
    pub changed_by: Option<Uuid>,
    pub notes: Option<String>,
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
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for StatusChange {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status: OrderStatus = model
            .status
            .parse()
            .map_err(|_| AppError::internal(format!("unknown order status '{}'", model.status)))?;

        Ok(StatusChange {
            id: model.id,
            order_id: model.order_id,
            status,
            changed_by: model.changed_by,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}
