//! Request payload validation
//!
//! Bridges `validator` errors into [`AppError`] with per-field details.

use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::utils::AppError;

/// Validate a deserialized payload before it reaches an engine
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(into_app_error)
}

fn into_app_error(errors: ValidationErrors) -> AppError {
    let mut fields: Vec<String> = errors.errors().keys().map(|k| k.to_string()).collect();
    fields.sort();

    AppError::validation(errors.to_string()).with_detail(
        "fields",
        Value::Array(fields.into_iter().map(Value::String).collect()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;
    use shared::models::{CartLineInput, LocationInput};

    #[test]
    fn test_valid_payload_passes() {
        let input = LocationInput {
            latitude: 10.0,
            longitude: 106.0,
            address: None,
        };
        assert!(validate_payload(&input).is_ok());
    }

    #[test]
    fn test_field_details() {
        let line = CartLineInput {
            product_id: "p1".into(),
            size_id: None,
            topping_ids: vec![],
            quantity: 0,
        };
        let err = validate_payload(&line).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let fields = &err.details.unwrap()["fields"];
        assert_eq!(fields, &serde_json::json!(["quantity"]));
    }
}
