//! Customer delivery addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::order::{AddressSnapshot, UNVERIFIED_ADDRESS_MESSAGE};
use crate::errors::{AppError, AppResult};

/// Saved delivery address. `is_verified` records whether the postcode was
/// serviceable when the address was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub label: String,
    pub street: String,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub apartment: Option<String>,
    pub postcode: String,
    pub city: String,
    pub instructions: Option<String>,
    pub is_default: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Address {
    /// The customer's own lookup result, accepted for delivery only when verified.
    /// A missing address gets the same message so other users' ids stay hidden.
    pub fn deliverable(found: Option<Address>) -> AppResult<Address> {
        found
            .filter(|address| address.is_verified)
            .ok_or_else(|| AppError::business(UNVERIFIED_ADDRESS_MESSAGE))
    }

    /// Frozen copy embedded in an order.
    pub fn snapshot(&self) -> AddressSnapshot {
        AddressSnapshot {
            id: self.id,
            label: self.label.clone(),
            street: self.street.clone(),
            building: self.building.clone(),
            floor: self.floor.clone(),
            apartment: self.apartment.clone(),
            postcode: self.postcode.clone(),
            city: self.city.clone(),
            instructions: self.instructions.clone(),
        }
    }

    /// One-line form, e.g. `Østerbrogade 12, 2100 København Ø`.
    pub fn full_address(&self) -> String {
        let street = match &self.building {
            Some(building) => format!("{} {}", self.street, building),
            None => self.street.clone(),
        };
        format!("{}, {} {}", street, self.postcode, self.city)
    }
}

/// Address creation request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewAddress {
    #[validate(length(min = 4, max = 10, message = "Postcode must be 4-10 characters"))]
    #[schema(example = "2100")]
    pub postcode: String,
    #[validate(length(min = 1, max = 100, message = "City must be 1-100 characters"))]
    #[schema(example = "København Ø")]
    pub city: String,
    #[validate(length(min = 1, max = 255, message = "Street must be 1-255 characters"))]
    #[schema(example = "Østerbrogade")]
    pub street: String,
    #[validate(length(max = 50, message = "Building must be at most 50 characters"))]
    #[schema(example = "12")]
    pub building: Option<String>,
    #[validate(length(max = 20, message = "Floor must be at most 20 characters"))]
    #[schema(example = "3")]
    pub floor: Option<String>,
    #[validate(length(max = 20, message = "Apartment must be at most 20 characters"))]
    #[schema(example = "tv")]
    pub apartment: Option<String>,
    pub instructions: Option<String>,
    #[validate(length(max = 50, message = "Label must be at most 50 characters"))]
    #[schema(example = "Home")]
    pub label: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// Partial address update. Postcode and city are fixed once verified.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct AddressChanges {
    #[validate(length(min = 1, max = 255, message = "Street must be 1-255 characters"))]
    pub street: Option<String>,
    #[validate(length(max = 50, message = "Building must be at most 50 characters"))]
    pub building: Option<String>,
    #[validate(length(max = 20, message = "Floor must be at most 20 characters"))]
    pub floor: Option<String>,
    #[validate(length(max = 20, message = "Apartment must be at most 20 characters"))]
    pub apartment: Option<String>,
    pub instructions: Option<String>,
    #[validate(length(max = 50, message = "Label must be at most 50 characters"))]
    pub label: Option<String>,
    pub is_default: Option<bool>,
}

/// Address response schema
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AddressResponse {
    pub id: Uuid,
    pub label: String,
    pub postcode: String,
    pub city: String,
    pub street: String,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub apartment: Option<String>,
    pub instructions: Option<String>,
    pub is_verified: bool,
    pub is_default: bool,
    #[schema(example = "Østerbrogade 12, 2100 København Ø")]
    pub full_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Address> for AddressResponse {
    fn from(address: Address) -> Self {
        let full_address = address.full_address();
        Self {
            id: address.id,
            label: address.label,
            postcode: address.postcode,
            city: address.city,
            street: address.street,
            building: address.building,
            floor: address.floor,
            apartment: address.apartment,
            instructions: address.instructions,
            is_verified: address.is_verified,
            is_default: address.is_default,
            full_address,
            created_at: address.created_at,
            updated_at: address.updated_at,
        }
    }
}
