//! Products and categories.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::order::ProductSnapshot;
use crate::errors::{AppError, AppResult};

/// Sellable product. Products are never removed, only deactivated.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "BAN-ECO-001")]
    pub sku: String,
    #[schema(example = "Økologiske Bananer")]
    pub name: String,
    #[schema(example = "oko-bananer")]
    pub slug: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "24.95")]
    pub price: Decimal,
    #[schema(example = "bundt")]
    pub unit: String,
    #[schema(value_type = String, example = "1.000")]
    pub unit_quantity: Decimal,
    pub image_url: Option<String>,
    pub category_id: Option<i32>,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Frozen copy stored on order lines.
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            name: self.name.clone(),
            sku: self.sku.clone(),
            unit: self.unit.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

/// Product category; `parent_id` forms a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Category {
    pub id: i32,
    #[schema(example = "Frugt & Grønt")]
    pub name: String,
    #[schema(example = "frugt-gront")]
    pub slug: String,
    pub parent_id: Option<i32>,
    pub sort_order: i32,
    pub is_active: bool,
    pub image_url: Option<String>,
}

fn default_unit_quantity() -> Decimal {
    Decimal::new(1000, 3)
}

fn default_true() -> bool {
    true
}

/// Product creation request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 50, message = "SKU must be 1-50 characters"))]
    #[schema(example = "BAN-ECO-001")]
    pub sku: String,
    #[validate(length(min = 1, max = 255, message = "Slug must be 1-255 characters"))]
    #[schema(example = "oko-bananer")]
    pub slug: String,
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    #[schema(example = "Økologiske Bananer")]
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "24.95")]
    pub price: Decimal,
    #[validate(length(min = 1, max = 20, message = "Unit must be 1-20 characters"))]
    #[schema(example = "bundt")]
    pub unit: String,
    #[serde(default = "default_unit_quantity")]
    #[schema(value_type = String, example = "1.000")]
    pub unit_quantity: Decimal,
    pub image_url: Option<String>,
    pub category_id: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
}

impl NewProduct {
    /// Amount checks the derive cannot express.
    pub fn check_amounts(&self) -> AppResult<()> {
        check_positive_price(self.price)?;
        check_positive_unit_quantity(self.unit_quantity)
    }
}

/// Partial product update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ProductChanges {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, example = "22.50")]
    pub price: Option<Decimal>,
    #[validate(length(min = 1, max = 20, message = "Unit must be 1-20 characters"))]
    pub unit: Option<String>,
    #[schema(value_type = Option<String>)]
    pub unit_quantity: Option<Decimal>,
    pub image_url: Option<String>,
    pub category_id: Option<i32>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

impl ProductChanges {
    pub fn check_amounts(&self) -> AppResult<()> {
        if let Some(price) = self.price {
            check_positive_price(price)?;
        }
        if let Some(quantity) = self.unit_quantity {
            check_positive_unit_quantity(quantity)?;
        }
        Ok(())
    }
}

fn check_positive_price(price: Decimal) -> AppResult<()> {
    if price <= Decimal::ZERO {
        return Err(AppError::validation("Price must be greater than 0"));
    }
    if price.normalize().scale() > 2 {
        return Err(AppError::validation("Price must have at most 2 decimal places"));
    }
    Ok(())
}

fn check_positive_unit_quantity(quantity: Decimal) -> AppResult<()> {
    if quantity <= Decimal::ZERO {
        return Err(AppError::validation("Unit quantity must be greater than 0"));
    }
    Ok(())
}

/// Product listing filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub category_slug: Option<String>,
    /// Case-insensitive match on name, description or sku
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub include_inactive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(price: Decimal) -> NewProduct {
        NewProduct {
            sku: "MLK-001".into(),
            slug: "letmaelk".into(),
            name: "Letmælk 1.5%".into(),
            description: None,
            price,
            unit: "l".into(),
            unit_quantity: default_unit_quantity(),
            image_url: None,
            category_id: None,
            is_active: true,
            is_featured: false,
        }
    }

    #[test]
    fn test_price_must_be_positive() {
        assert!(new_product(Decimal::new(1095, 2)).check_amounts().is_ok());
        assert!(new_product(Decimal::ZERO).check_amounts().is_err());
        assert!(new_product(Decimal::new(10955, 3)).check_amounts().is_err());
    }

    #[test]
    fn test_length_rules() {
        let mut product = new_product(Decimal::ONE);
        product.sku = String::new();
        assert!(product.validate().is_err());
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let product: NewProduct = serde_json::from_str(
            r#"{"sku":"A1","slug":"a","name":"A","price":"9.95","unit":"stk"}"#,
        )
        .unwrap();
        assert!(product.is_active);
        assert!(!product.is_featured);
        assert_eq!(product.unit_quantity, Decimal::new(1000, 3));
    }
}
