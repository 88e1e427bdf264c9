//! Validation Utilities

use validator::{Validate, ValidationErrors};

use super::error::{AppError, FieldError};

/// Run `validator` rules on a request body, converting failures to `AppError`.
pub fn validate_request<T: Validate>(request: &T) -> Result<(), AppError> {
    request.validate().map_err(validation_error)
}

/// Convert validation errors to AppError, one `field: message` pair per
/// failing field, sorted so responses are stable.
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e
                    .message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            })
        })
        .collect();
    field_errors.sort_by(|a, b| a.field.cmp(&b.field));

    if field_errors.is_empty() {
        return AppError::Validation("Validation failed".into());
    }

    let message = field_errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    AppError::Validation(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "must not be empty"))]
        title: String,
        #[validate(range(min = 1, message = "must be positive"))]
        size: i32,
    }

    #[test]
    fn test_collects_every_field() {
        let err = validate_request(&Probe {
            title: String::new(),
            size: 0,
        })
        .unwrap_err();

        match err {
            AppError::Validation(msg) => {
                assert_eq!(msg, "size: must be positive; title: must not be empty")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(validate_request(&Probe {
            title: "ok".into(),
            size: 3,
        })
        .is_ok());
    }
}
