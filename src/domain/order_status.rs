//! Order lifecycle state machine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult};

/// Lifecycle status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Placed,
    Confirmed,
    Packing,
    OutForDelivery,
    Delivered,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Placed,
        OrderStatus::Confirmed,
        OrderStatus::Packing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
    ];

    /// Stored and serialized form
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Placed => "PLACED",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Packing => "PACKING",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Canceled => "CANCELED",
        }
    }

    /// States reachable from this one in a single step.
    pub fn allowed_next(self) -> &'static [OrderStatus] {
        use OrderStatus::*;

        match self {
            Placed => &[Confirmed, Canceled],
            Confirmed => &[Packing, Canceled],
            Packing => &[OutForDelivery, Canceled],
            OutForDelivery => &[Delivered, Canceled],
            Delivered | Canceled => &[],
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    /// Validate a transition, returning the new status.
    pub fn transition_to(self, next: OrderStatus) -> AppResult<OrderStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AppError::business(format!(
                "Invalid status transition from {} to {}",
                self, next
            )))
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::validation(format!("Unknown order status '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::{self, *};

    fn expected_allowed(from: OrderStatus, to: OrderStatus) -> bool {
        matches!(
            (from, to),
            (Placed, Confirmed)
                | (Placed, Canceled)
                | (Confirmed, Packing)
                | (Confirmed, Canceled)
                | (Packing, OutForDelivery)
                | (Packing, Canceled)
                | (OutForDelivery, Delivered)
                | (OutForDelivery, Canceled)
        )
    }

    #[test]
    fn test_every_pair_matches_transition_table() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    expected_allowed(from, to),
                    "{} -> {}",
                    from,
                    to
                );
                assert_eq!(from.transition_to(to).is_ok(), expected_allowed(from, to));
            }
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(Delivered.allowed_next().is_empty());
        assert!(Canceled.allowed_next().is_empty());
        assert!(!Placed.allowed_next().is_empty());
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = Placed.transition_to(Delivered).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid status transition from PLACED to DELIVERED"
        );
    }

    #[test]
    fn test_parse_and_serialize() {
        assert_eq!("OUT_FOR_DELIVERY".parse::<OrderStatus>().unwrap(), OutForDelivery);
        assert_eq!("placed".parse::<OrderStatus>().unwrap(), Placed);
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&OutForDelivery).unwrap(),
            "\"OUT_FOR_DELIVERY\""
        );
    }
}
