//! Shopping cart lines and the derived cart view.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::catalog::Product;
use super::money;
use crate::config::{MAX_CART_QUANTITY, MIN_CART_QUANTITY};

/// Persisted cart line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// A cart line joined with its product, if the product still exists
#[derive(Debug, Clone)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Option<Product>,
}

impl CartLine {
    /// The product, but only while it is still sellable.
    pub fn active_product(&self) -> Option<&Product> {
        self.product.as_ref().filter(|product| product.is_active)
    }
}

/// How an incoming quantity combines with the one already in the cart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityMerge {
    /// "Add to cart": quantities accumulate
    Sum,
    /// Guest-cart sync: the larger quantity wins
    Max,
}

impl QuantityMerge {
    pub fn combine(self, existing: i32, incoming: i32) -> i32 {
        match self {
            QuantityMerge::Sum => existing.saturating_add(incoming),
            QuantityMerge::Max => existing.max(incoming),
        }
    }

    /// SQL assigned to `quantity` when an insert hits the (cart, product) key.
    pub fn on_conflict_sql(self) -> &'static str {
        match self {
            QuantityMerge::Sum => "cart_items.quantity + EXCLUDED.quantity",
            QuantityMerge::Max => "GREATEST(cart_items.quantity, EXCLUDED.quantity)",
        }
    }
}

/// Add-to-cart request
#[derive(Debug, Clone, Copy, Deserialize, Validate, ToSchema)]
pub struct CartItemAdd {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 99, message = "Quantity must be between 1 and 99"))]
    #[serde(default = "default_quantity")]
    #[schema(example = 1, minimum = 1, maximum = 99)]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    MIN_CART_QUANTITY
}

/// Quantity update; 0 removes the line
#[derive(Debug, Clone, Copy, Deserialize, Validate, ToSchema)]
pub struct CartItemUpdate {
    #[validate(range(min = 0, max = 99, message = "Quantity must be between 0 and 99"))]
    #[schema(example = 3, minimum = 0, maximum = 99)]
    pub quantity: i32,
}

/// Guest cart merged into the user's cart after sign-in
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CartSync {
    pub items: Vec<CartSyncItem>,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct CartSyncItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

impl CartSync {
    /// One entry per product, quantities in range, larger quantity kept on duplicates.
    pub fn normalized(&self) -> BTreeMap<Uuid, i32> {
        let mut merged = BTreeMap::new();
        for item in &self.items {
            if !(MIN_CART_QUANTITY..=MAX_CART_QUANTITY).contains(&item.quantity) {
                continue;
            }
            merged
                .entry(item.product_id)
                .and_modify(|quantity: &mut i32| {
                    *quantity = QuantityMerge::Max.combine(*quantity, item.quantity)
                })
                .or_insert(item.quantity);
        }
        merged
    }
}

/// Cart line as shown to the customer
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartLineView {
    pub product_id: Uuid,
    pub name: String,
    pub slug: String,
    #[schema(value_type = String, example = "24.95")]
    pub price: Decimal,
    pub unit: String,
    pub image_url: Option<String>,
    pub quantity: i32,
    #[schema(value_type = String, example = "49.90")]
    pub line_total: Decimal,
}

/// Cart with derived totals; nothing here is stored
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    #[schema(value_type = String, example = "62.40")]
    pub subtotal: Decimal,
    pub item_count: i32,
}

impl CartView {
    /// Price lines at current catalog prices, skipping unavailable products.
    pub fn build(lines: &[CartLine]) -> Self {
        let items: Vec<CartLineView> = lines
            .iter()
            .filter_map(|line| {
                let product = line.active_product()?;
                Some(CartLineView {
                    product_id: product.id,
                    name: product.name.clone(),
                    slug: product.slug.clone(),
                    price: money::to_money(product.price),
                    unit: product.unit.clone(),
                    image_url: product.image_url.clone(),
                    quantity: line.item.quantity,
                    line_total: money::line_total(product.price, line.item.quantity),
                })
            })
            .collect();

        let subtotal = money::sum(items.iter().map(|item| item.line_total));
        let item_count = items.iter().map(|item| item.quantity).sum();

        Self {
            items,
            subtotal,
            item_count,
        }
    }

    pub fn empty() -> Self {
        Self::build(&[])
    }
}
