//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::AppError;

/// JSON body extractor that runs `validator` rules before the handler.
///
/// ```rust,ignore
/// async fn add_item(ValidatedJson(item): ValidatedJson<CartItemAdd>) {
///     // item.quantity is already within 1..=99
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::validation(format_validation_errors(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Join rule messages field by field, in field-name order so the response is stable.
fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewServicePostcode, OrderCreate};
    use uuid::Uuid;

    #[test]
    fn test_messages_are_ordered_by_field() {
        let postcode = NewServicePostcode {
            postcode: "21".into(),
            city: String::new(),
            delivery_fee: None,
            min_order_amount: None,
        };
        let errors = postcode.validate().unwrap_err();

        assert_eq!(
            format_validation_errors(&errors),
            "City must be 1-100 characters, Postcode must be 4-10 characters"
        );
    }

    #[test]
    fn test_valid_payload_passes() {
        let order = OrderCreate {
            address_id: Uuid::new_v4(),
            notes: Some("Ring on the left".into()),
        };
        assert!(order.validate().is_ok());
    }
}
