//! Error taxonomy shared by every layer.
//!
//! Every failure that can reach a client is an [`AppError`] tagged with one of the
//! closed set of [`ErrorKind`]s. The kind decides the HTTP status and the default
//! message; lower-level causes ride along for logging and are never rendered.

use serde::Serialize;

/// Result type used by the service layer.
pub type AppResult<T> = Result<T, AppError>;

/// Boxed lower-level failure kept for server-side diagnostics.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Closed set of error categories.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Path id is not a positive integer.
    InvalidId,
    /// One or more request fields broke a rule.
    ValidationFailed,
    /// The addressed entity does not exist.
    NotFound,
    /// Persistence failure. The cause is never shown to the client.
    DatabaseError,
    /// Body could not be decoded.
    BadRequest,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidId => "invalid_id",
            ErrorKind::ValidationFailed => "validation_failed",
            ErrorKind::NotFound => "not_found",
            ErrorKind::DatabaseError => "database_error",
            ErrorKind::BadRequest => "bad_request",
        }
    }

    /// HTTP status code for this kind.
    pub fn status(self) -> u16 {
        match self {
            ErrorKind::InvalidId | ErrorKind::ValidationFailed | ErrorKind::BadRequest => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::DatabaseError => 500,
        }
    }

    /// Default user-facing message.
    pub fn default_message(self) -> &'static str {
        match self {
            ErrorKind::InvalidId => "ID inválido",
            ErrorKind::ValidationFailed => "falha de validação",
            ErrorKind::NotFound => "produto não encontrado",
            ErrorKind::DatabaseError => "erro interno ao acessar o banco de dados",
            ErrorKind::BadRequest => "dados inválidos",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// A single rule violation on one request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    #[serde(rename = "campo")]
    pub field: String,
    #[serde(rename = "mensagem")]
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Tagged application error.
#[derive(Debug)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    fields: Vec<FieldError>,
    source: Option<BoxError>,
}

impl AppError {
    /// Error of `kind` with its default message.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.default_message().to_string(),
            fields: Vec::new(),
            source: None,
        }
    }

    /// Error of `kind` with a custom client-safe message.
    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::new(kind)
        }
    }

    /// Attach a lower-level failure to `kind`.
    ///
    /// The cause is reachable through [`std::error::Error::source`] for logging; the
    /// client only ever sees the kind's default message.
    pub fn wrap(cause: impl Into<BoxError>, kind: ErrorKind) -> Self {
        Self {
            source: Some(cause.into()),
            ..Self::new(kind)
        }
    }

    pub fn invalid_id() -> Self {
        Self::new(ErrorKind::InvalidId)
    }

    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::BadRequest, message)
    }

    pub fn database(cause: impl Into<BoxError>) -> Self {
        Self::wrap(cause, ErrorKind::DatabaseError)
    }

    /// Validation failure carrying every field error found.
    pub fn validation(fields: Vec<FieldError>) -> Self {
        Self {
            fields,
            ..Self::new(ErrorKind::ValidationFailed)
        }
    }

    /// Validation failure for a single field; the field message becomes the top message.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: ErrorKind::ValidationFailed,
            fields: vec![FieldError::new(field, message.clone())],
            message,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.fields
    }

    pub fn status(&self) -> u16 {
        self.kind.status()
    }
}

impl core::fmt::Display for AppError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.source {
            Some(cause) => write!(f, "{}: {}", self.message, cause),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<ErrorKind> for AppError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset by peer")]
    struct DriverFailure;

    #[test]
    fn kinds_map_to_expected_statuses() {
        assert_eq!(ErrorKind::InvalidId.status(), 400);
        assert_eq!(ErrorKind::ValidationFailed.status(), 400);
        assert_eq!(ErrorKind::BadRequest.status(), 400);
        assert_eq!(ErrorKind::NotFound.status(), 404);
        assert_eq!(ErrorKind::DatabaseError.status(), 500);
    }

    #[test]
    fn wrap_keeps_cause_but_not_in_message() {
        let err = AppError::wrap(DriverFailure, ErrorKind::DatabaseError);

        assert_eq!(err.kind(), ErrorKind::DatabaseError);
        assert_eq!(err.message(), ErrorKind::DatabaseError.default_message());
        assert!(!err.message().contains("connection reset"));
        assert_eq!(
            err.source().map(|s| s.to_string()).as_deref(),
            Some("connection reset by peer")
        );
        // Display is for logs and includes the cause.
        assert!(err.to_string().contains("connection reset by peer"));
    }

    #[test]
    fn field_error_promotes_message() {
        let err = AppError::field("preco", "preço deve ser maior que zero");
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert_eq!(err.message(), "preço deve ser maior que zero");
        assert_eq!(err.fields(), &[FieldError::new("preco", "preço deve ser maior que zero")]);
    }

    #[test]
    fn field_error_serializes_with_wire_names() {
        let json = serde_json::to_value(FieldError::new("nome", "obrigatório")).unwrap();
        assert_eq!(json, serde_json::json!({"campo": "nome", "mensagem": "obrigatório"}));
    }
}
