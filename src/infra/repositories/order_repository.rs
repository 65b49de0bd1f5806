//! Order repository: order documents, listings and the invoice record.
//!
//! Checkout and status changes run inside a unit-of-work transaction; the
//! statement helpers they use are shared here with the plain store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::invoice::{self, Entity as InvoiceEntity};
use super::entities::invoice_sequence::{self, Entity as InvoiceSequenceEntity};
use super::entities::order::{self, Entity as OrderEntity};
use super::entities::order_item::{self, Entity as OrderItemEntity};
use super::entities::order_status_history::{self, Entity as HistoryEntity};
use super::entities::user::Entity as UserEntity;
use crate::domain::{
    AdminOrderSummary, Invoice, InvoiceNumber, Order, OrderDetail, OrderDraft, OrderItem,
    OrderStatus, OrderSummary, StatusChange,
};
use crate::errors::{AppError, AppResult};
use crate::types::PageRequest;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Order repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Order with items and history; `owner` restricts to one user's orders
    async fn find_detail(&self, id: Uuid, owner: Option<Uuid>) -> AppResult<Option<OrderDetail>>;

    /// A user's orders, newest first
    async fn list_for_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> AppResult<(Vec<OrderSummary>, u64)>;

    /// All orders for the back office, newest first
    async fn list_all(
        &self,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> AppResult<(Vec<AdminOrderSummary>, u64)>;

    async fn find_invoice(&self, order_id: Uuid) -> AppResult<Option<Invoice>>;

    /// Remember where the rendered invoice was stored
    async fn record_invoice_file(&self, order_id: Uuid, path: String) -> AppResult<()>;
}

/// Concrete implementation of OrderRepository
pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct ItemCount {
    order_id: Uuid,
    item_count: i64,
}

/// Total quantity per order
async fn item_counts<C: ConnectionTrait>(
    conn: &C,
    order_ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, i64>> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = OrderItemEntity::find()
        .select_only()
        .column(order_item::Column::OrderId)
        .column_as(Expr::col(order_item::Column::Quantity).sum(), "item_count")
        .filter(order_item::Column::OrderId.is_in(order_ids))
        .group_by(order_item::Column::OrderId)
        .into_model::<ItemCount>()
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.order_id, row.item_count))
        .collect())
}

pub(crate) async fn items<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
    OrderItemEntity::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::CreatedAt)
        .order_by_asc(order_item::Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(OrderItem::try_from)
        .collect()
}

pub(crate) async fn history<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> AppResult<Vec<StatusChange>> {
    HistoryEntity::find()
        .filter(order_status_history::Column::OrderId.eq(order_id))
        .order_by_asc(order_status_history::Column::CreatedAt)
        .order_by_asc(order_status_history::Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(StatusChange::try_from)
        .collect()
}

pub(crate) async fn load_detail<C: ConnectionTrait>(conn: &C, order: Order) -> AppResult<OrderDetail> {
    let items = items(conn, order.id).await?;
    let history = history(conn, order.id).await?;
    Ok(OrderDetail {
        order,
        items,
        history,
    })
}

/// Next invoice sequence for `year`. The counter row is incremented in
/// place, so concurrent callers serialize on it until their transaction ends.
pub(crate) async fn next_invoice_sequence<C: ConnectionTrait>(conn: &C, year: i32) -> AppResult<u32> {
    let counter = invoice_sequence::ActiveModel {
        year: Set(year),
        last_value: Set(1),
    };

    let model = InvoiceSequenceEntity::insert(counter)
        .on_conflict(
            OnConflict::column(invoice_sequence::Column::Year)
                .value(
                    invoice_sequence::Column::LastValue,
                    Expr::cust("invoice_sequences.last_value + 1"),
                )
                .to_owned(),
        )
        .exec_with_returning(conn)
        .await?;

    u32::try_from(model.last_value)
        .map_err(|_| AppError::internal(format!("invoice sequence out of range: {}", model.last_value)))
}

/// Persist order, lines, first history entry and invoice record.
pub(crate) async fn insert_order<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    draft: OrderDraft,
    invoice_number: &InvoiceNumber,
    placed_note: &str,
    now: DateTime<Utc>,
) -> AppResult<OrderDetail> {
    let order_id = Uuid::new_v4();
    let address_snapshot = serde_json::to_value(&draft.address_snapshot)
        .map_err(|e| AppError::internal(format!("address snapshot: {}", e)))?;

    let order_model = order::ActiveModel {
        id: Set(order_id),
        user_id: Set(user_id),
        address_id: Set(draft.address_id),
        address_snapshot: Set(address_snapshot),
        status: Set(OrderStatus::Placed.as_str().to_string()),
        subtotal: Set(draft.subtotal),
        delivery_fee: Set(draft.delivery_fee),
        total: Set(draft.total),
        invoice_number: Set(invoice_number.to_string()),
        invoice_generated_at: Set(Some(now)),
        notes: Set(draft.notes),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    let line_models = draft
        .lines
        .into_iter()
        .map(|line| {
            let product_snapshot = serde_json::to_value(&line.snapshot)
                .map_err(|e| AppError::internal(format!("product snapshot: {}", e)))?;
            Ok(order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(line.product_id),
                product_snapshot: Set(product_snapshot),
                quantity: Set(line.quantity),
                price_at_purchase: Set(line.price_at_purchase),
                line_total: Set(line.line_total),
                created_at: Set(now),
            })
        })
        .collect::<AppResult<Vec<_>>>()?;
    OrderItemEntity::insert_many(line_models)
        .exec_without_returning(conn)
        .await?;

    append_history(
        conn,
        order_id,
        OrderStatus::Placed,
        Some(user_id),
        Some(placed_note.to_string()),
        now,
    )
    .await?;

    invoice::ActiveModel {
        order_id: Set(order_id),
        invoice_number: Set(invoice_number.to_string()),
        pdf_path: Set(None),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    load_detail(conn, Order::try_from(order_model)?).await
}

/// Order row locked for the rest of the transaction
pub(crate) async fn lock_order<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<Option<Order>> {
    OrderEntity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await?
        .map(Order::try_from)
        .transpose()
}

pub(crate) async fn set_status<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    status: OrderStatus,
    now: DateTime<Utc>,
) -> AppResult<()> {
    OrderEntity::update_many()
        .col_expr(order::Column::Status, Expr::value(status.as_str()))
        .col_expr(order::Column::UpdatedAt, Expr::value(now))
        .filter(order::Column::Id.eq(id))
        .exec(conn)
        .await?;
    Ok(())
}

pub(crate) async fn append_history<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    status: OrderStatus,
    changed_by: Option<Uuid>,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    order_status_history::ActiveModel {
        order_id: Set(order_id),
        status: Set(status.as_str().to_string()),
        changed_by: Set(changed_by),
        notes: Set(notes),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(())
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn find_detail(&self, id: Uuid, owner: Option<Uuid>) -> AppResult<Option<OrderDetail>> {
        let mut query = OrderEntity::find_by_id(id);
        if let Some(user_id) = owner {
            query = query.filter(order::Column::UserId.eq(user_id));
        }

        match query.one(&self.db).await? {
            Some(model) => Ok(Some(load_detail(&self.db, Order::try_from(model)?).await?)),
            None => Ok(None),
        }
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> AppResult<(Vec<OrderSummary>, u64)> {
        let paginator = OrderEntity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&self.db, page.limit);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.page - 1).await?;

        let counts = item_counts(&self.db, models.iter().map(|m| m.id).collect()).await?;
        let summaries = models
            .into_iter()
            .map(|model| {
                let order = Order::try_from(model)?;
                Ok(OrderSummary {
                    id: order.id,
                    item_count: counts.get(&order.id).copied().unwrap_or(0),
                    invoice_number: order.invoice_number,
                    status: order.status,
                    total: order.total,
                    created_at: order.created_at,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok((summaries, total))
    }

    async fn list_all(
        &self,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> AppResult<(Vec<AdminOrderSummary>, u64)> {
        let mut query = OrderEntity::find();
        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status.as_str()));
        }

        let paginator = query
            .find_also_related(UserEntity)
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&self.db, page.limit);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.page - 1).await?;

        let counts = item_counts(&self.db, rows.iter().map(|(m, _)| m.id).collect()).await?;
        let summaries = rows
            .into_iter()
            .map(|(model, customer)| {
                let order = Order::try_from(model)?;
                let (customer_email, customer_phone) = customer
                    .map(|user| (user.email, user.phone))
                    .unwrap_or_default();
                Ok(AdminOrderSummary {
                    id: order.id,
                    item_count: counts.get(&order.id).copied().unwrap_or(0),
                    invoice_number: order.invoice_number,
                    status: order.status,
                    total: order.total,
                    customer_email,
                    customer_phone,
                    address_snapshot: order.address_snapshot,
                    created_at: order.created_at,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok((summaries, total))
    }

    async fn find_invoice(&self, order_id: Uuid) -> AppResult<Option<Invoice>> {
        let result = InvoiceEntity::find()
            .filter(invoice::Column::OrderId.eq(order_id))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Invoice::from))
    }

    async fn record_invoice_file(&self, order_id: Uuid, path: String) -> AppResult<()> {
        InvoiceEntity::update_many()
            .col_expr(invoice::Column::PdfPath, Expr::value(path))
            .filter(invoice::Column::OrderId.eq(order_id))
            .exec(&self.db)
            .await?;

        OrderEntity::update_many()
            .col_expr(order::Column::InvoiceGeneratedAt, Expr::value(Utc::now()))
            .filter(order::Column::Id.eq(order_id))
            .exec(&self.db)
            .await?;

        Ok(())
    }
}
