//! Declarative request validation.
//!
//! Rules are bound per field with `#[derive(validator::Validate)]`; this module turns
//! the aggregated `ValidationErrors` into our flat [`FieldError`] list. All rules on all
//! fields are evaluated; nothing short-circuits.

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::{AppError, FieldError};

/// Run every rule bound to `value` and collect the violations.
///
/// Output is ordered by field name, then by rule declaration order.
pub fn check<T: Validate>(value: &T) -> Vec<FieldError> {
    match value.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => to_field_errors(&errors),
    }
}

/// Like [`check`], but folds a non-empty result into a `ValidationFailed` error.
pub fn validate<T: Validate>(value: &T) -> Result<(), AppError> {
    let fields = check(value);
    if fields.is_empty() {
        Ok(())
    } else {
        Err(AppError::validation(fields))
    }
}

pub fn to_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut by_field: Vec<(String, Vec<FieldError>)> = errors
        .errors()
        .iter()
        .filter_map(|(field, kind)| match kind {
            ValidationErrorsKind::Field(list) => {
                let field = field.to_string();
                let out = list
                    .iter()
                    .map(|e| {
                        let message = e
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| default_message(&e.code).to_string());
                        FieldError::new(field.clone(), message)
                    })
                    .collect();
                Some((field, out))
            }
            // Request DTOs are flat.
            _ => None,
        })
        .collect();

    by_field.sort_by(|a, b| a.0.cmp(&b.0));
    by_field.into_iter().flat_map(|(_, errs)| errs).collect()
}

fn default_message(code: &str) -> &'static str {
    match code {
        "required" => "campo obrigatório",
        "length" => "campo não pode ser vazio",
        "range" => "valor abaixo do mínimo permitido",
        _ => "valor inválido",
    }
}
