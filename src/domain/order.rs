//! Orders, their frozen snapshots and checkout pricing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::address::Address;
use super::cart::CartLine;
use super::money;
use super::order_status::OrderStatus;
use crate::errors::{AppError, AppResult};

pub const UNVERIFIED_ADDRESS_MESSAGE: &str = "Please select a verified delivery address";
pub const EMPTY_CART_MESSAGE: &str = "Your cart is empty";
pub const NO_VALID_ITEMS_MESSAGE: &str = "No valid items in cart";
pub const PLACED_BY_CUSTOMER_NOTE: &str = "Order placed by customer";

/// Copy of the delivery address taken at checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AddressSnapshot {
    pub id: Uuid,
    pub label: String,
    pub street: String,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub apartment: Option<String>,
    pub postcode: String,
    pub city: String,
    pub instructions: Option<String>,
}

/// Copy of the product identity taken at checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductSnapshot {
    pub name: String,
    pub sku: String,
    pub unit: String,
    pub image_url: Option<String>,
}

/// Order header
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address_id: Uuid,
    pub address_snapshot: AddressSnapshot,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub invoice_number: String,
    pub invoice_generated_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_snapshot: ProductSnapshot,
    pub quantity: i32,
    pub price_at_purchase: Decimal,
    pub line_total: Decimal,
}

/// Append-only status history entry
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub id: i64,
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub changed_by: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Invoice record, one per order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: i32,
    pub order_id: Uuid,
    pub invoice_number: String,
    pub issued_at: DateTime<Utc>,
    pub pdf_path: Option<String>,
}

/// Order with its lines and history (history in time order)
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub history: Vec<StatusChange>,
}

/// Customer-facing order list entry
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderSummary {
    pub id: Uuid,
    #[schema(example = "INV-2025-000042")]
    pub invoice_number: String,
    pub status: OrderStatus,
    #[schema(value_type = String, example = "91.40")]
    pub total: Decimal,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Admin order list entry
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AdminOrderSummary {
    pub id: Uuid,
    pub invoice_number: String,
    pub status: OrderStatus,
    #[schema(value_type = String, example = "91.40")]
    pub total: Decimal,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub address_snapshot: AddressSnapshot,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Checkout request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct OrderCreate {
    pub address_id: Uuid,
    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

/// Admin status change request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

/// Order line priced at checkout
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: Uuid,
    pub snapshot: ProductSnapshot,
    pub quantity: i32,
    pub price_at_purchase: Decimal,
    pub line_total: Decimal,
}

/// Everything an order needs before it is persisted
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub address_id: Uuid,
    pub address_snapshot: AddressSnapshot,
    pub lines: Vec<PricedLine>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub notes: Option<String>,
}

impl OrderDraft {
    /// Price the cart against current catalog prices.
    ///
    /// Lines whose product is gone or inactive are dropped. Fails when the
    /// address is unverified, the cart is empty, or no line survives.
    pub fn price(
        address: &Address,
        cart: &[CartLine],
        delivery_fee: Decimal,
        notes: Option<String>,
    ) -> AppResult<Self> {
        if !address.is_verified {
            return Err(AppError::business(UNVERIFIED_ADDRESS_MESSAGE));
        }
        if cart.is_empty() {
            return Err(AppError::business(EMPTY_CART_MESSAGE));
        }

        let lines: Vec<PricedLine> = cart
            .iter()
            .filter_map(|line| {
                let product = line.active_product()?;
                let price_at_purchase = money::to_money(product.price);
                Some(PricedLine {
                    product_id: product.id,
                    snapshot: product.snapshot(),
                    quantity: line.item.quantity,
                    price_at_purchase,
                    line_total: money::line_total(price_at_purchase, line.item.quantity),
                })
            })
            .collect();

        if lines.is_empty() {
            return Err(AppError::business(NO_VALID_ITEMS_MESSAGE));
        }

        let subtotal = money::sum(lines.iter().map(|line| line.line_total));
        let delivery_fee = money::to_money(delivery_fee);

        Ok(Self {
            address_id: address.id,
            address_snapshot: address.snapshot(),
            lines,
            subtotal,
            delivery_fee,
            total: money::to_money(subtotal + delivery_fee),
            notes,
        })
    }
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_snapshot: ProductSnapshot,
    pub quantity: i32,
    #[schema(value_type = String, example = "24.95")]
    pub price_at_purchase: Decimal,
    #[schema(value_type = String, example = "49.90")]
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusChangeResponse {
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Full order document
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    #[schema(example = "INV-2025-000042")]
    pub invoice_number: String,
    pub status: OrderStatus,
    pub address_snapshot: AddressSnapshot,
    pub items: Vec<OrderItemResponse>,
    #[schema(value_type = String, example = "62.40")]
    pub subtotal: Decimal,
    #[schema(value_type = String, example = "29.00")]
    pub delivery_fee: Decimal,
    #[schema(value_type = String, example = "91.40")]
    pub total: Decimal,
    pub notes: Option<String>,
    pub status_history: Vec<StatusChangeResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderDetail> for OrderResponse {
    fn from(detail: OrderDetail) -> Self {
        let OrderDetail {
            order,
            items,
            history,
        } = detail;

        Self {
            id: order.id,
            invoice_number: order.invoice_number,
            status: order.status,
            address_snapshot: order.address_snapshot,
            items: items
                .into_iter()
                .map(|item| OrderItemResponse {
                    id: item.id,
                    product_id: item.product_id,
                    product_snapshot: item.product_snapshot,
                    quantity: item.quantity,
                    price_at_purchase: item.price_at_purchase,
                    line_total: item.line_total,
                })
                .collect(),
            subtotal: order.subtotal,
            delivery_fee: order.delivery_fee,
            total: order.total,
            notes: order.notes,
            status_history: history
                .into_iter()
                .map(|change| StatusChangeResponse {
                    status: change.status,
                    notes: change.notes,
                    created_at: change.created_at,
                })
                .collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}
