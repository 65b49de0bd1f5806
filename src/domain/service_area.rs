//! Delivery service area: allow-listed postcodes and street rules.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Shown when a postcode is outside the service area
pub const NOT_SERVICEABLE_MESSAGE: &str =
    "We don't deliver to this area yet. Please check back later.";

/// Postcode the shop delivers to
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ServicePostcode {
    pub id: Uuid,
    #[schema(example = "2100")]
    pub postcode: String,
    #[schema(example = "København Ø")]
    pub city: String,
    pub is_active: bool,
    #[schema(value_type = String, example = "0.00")]
    pub delivery_fee: Decimal,
    #[schema(value_type = String, example = "200.00")]
    pub min_order_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Street-level rule inside a service postcode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ServiceAddressRule {
    pub id: Uuid,
    #[schema(example = "Østerbrogade")]
    pub street_pattern: String,
    pub postcode: String,
    pub is_blacklisted: bool,
    pub notes: Option<String>,
}

/// Outcome of a postcode lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PostcodeCheck {
    pub valid: bool,
    pub city_name: Option<String>,
    pub error: Option<String>,
}

impl PostcodeCheck {
    pub fn serviceable(city: impl Into<String>) -> Self {
        Self {
            valid: true,
            city_name: Some(city.into()),
            error: None,
        }
    }

    pub fn not_serviceable() -> Self {
        Self {
            valid: false,
            city_name: None,
            error: Some(NOT_SERVICEABLE_MESSAGE.to_string()),
        }
    }
}

/// Request to add a postcode to the service area
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewServicePostcode {
    #[validate(length(min = 4, max = 10, message = "Postcode must be 4-10 characters"))]
    #[schema(example = "2200")]
    pub postcode: String,
    #[validate(length(min = 1, max = 100, message = "City must be 1-100 characters"))]
    #[schema(example = "København N")]
    pub city: String,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "0.00")]
    pub delivery_fee: Option<Decimal>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "200.00")]
    pub min_order_amount: Option<Decimal>,
}
