//! Invoice record, one per order.

use sea_orm::entity::prelude::*;

use crate::domain::Invoice;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub order_id: Uuid,
    #[sea_orm(unique)]
    pub invoice_number: String,
    pub pdf_path: Option<String>,
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

impl From<Model> for Invoice {
    fn from(model: Model) -> Self {
        Invoice {
            id: model.id,
            order_id: model.order_id,
            invoice_number: model.invoice_number,
            issued_at: model.created_at,
            pdf_path: model.pdf_path,
        }
    }
}
