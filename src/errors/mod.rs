use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Field name -> first validation message for that field.
pub type FieldErrors = BTreeMap<String, String>;

/// A secondary or compensating step that failed without failing the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub step: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(FieldErrors),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("This email is already registered.")]
    DuplicateEmail,
    #[error("{0}")]
    WeakCredential(String),
    #[error("Invalid email or password")]
    InvalidCredential,
    #[error("{operation} timed out")]
    Timeout { operation: &'static str },
    #[error("{cause}")]
    Compensated {
        cause: Box<AppError>,
        diagnostics: Vec<Diagnostic>,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Database Error: {0}")]
    DatabaseError(String),
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostics: Option<&'a [Diagnostic]>,
}

impl AppError {
    pub fn field(field: &str, message: &str) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), message.to_string());
        AppError::Validation(fields)
    }

    /// Prefixes the message of a surfaced remote error, keeping its kind.
    pub fn context(self, prefix: &str) -> Self {
        match self {
            AppError::DatabaseError(msg) => AppError::DatabaseError(format!("{}: {}", prefix, msg)),
            AppError::InternalServerError(msg) => {
                AppError::InternalServerError(format!("{}: {}", prefix, msg))
            }
            AppError::Conflict(msg) => AppError::Conflict(format!("{}: {}", prefix, msg)),
            AppError::NotFound(msg) => AppError::NotFound(format!("{}: {}", prefix, msg)),
            other => other,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some("23505") | Some("23503") => AppError::Conflict(db.message().to_string()),
                _ => AppError::DatabaseError(db.message().to_string()),
            },
            sqlx::Error::PoolTimedOut => AppError::Timeout {
                operation: "Database connection",
            },
            other => AppError::DatabaseError(other.to_string()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) | AppError::InvalidCredential => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) | AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::WeakCredential(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::Compensated { cause, .. } => cause.status_code(),
            AppError::Config(_) | AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(fields) => ErrorResponse {
                error: self.to_string(),
                fields: Some(fields),
                diagnostics: None,
            },
            AppError::Compensated { cause, diagnostics } => ErrorResponse {
                error: cause.to_string(),
                fields: None,
                diagnostics: Some(diagnostics),
            },
            _ => ErrorResponse {
                error: self.to_string(),
                fields: None,
                diagnostics: None,
            },
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
