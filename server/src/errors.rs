// server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use storeflow::FlowError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  /// The caller referenced a resource that belongs to another user.
  #[error("Ownership Violation: {0}")]
  Ownership(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Insufficient Stock: {0}")]
  InsufficientStock(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),

  /// A pipeline ended with `Stopped` where the request needed it to complete.
  #[error("Pipeline execution was halted by a handler.")]
  PipelineHaltedByHandler,
}

impl AppError {
  /// Maps a unique-constraint violation to a validation failure with `message`,
  /// leaving every other database error untouched.
  pub fn unique_violation_as(err: sqlx::Error, message: &str) -> Self {
    match &err {
      sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::Validation(message.to_string()),
      _ => AppError::Sqlx(err),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Ownership(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::InsufficientStock(_) => StatusCode::CONFLICT,
      AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Migrate(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_)
      | AppError::PipelineHaltedByHandler => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with server error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with client error");
    }
    let body = match self {
      AppError::Validation(m)
      | AppError::Auth(m)
      | AppError::Ownership(m)
      | AppError::NotFound(m)
      | AppError::InsufficientStock(m) => json!({ "error": m }),
      AppError::Config(_) => json!({ "error": "Configuration issue" }),
      AppError::Sqlx(_) | AppError::Migrate(_) => json!({ "error": "Database operation failed" }),
      AppError::Workflow { source } => {
        tracing::error!(flow_error_source = ?source, "Workflow error details");
        json!({ "error": "Workflow processing error" })
      }
      AppError::Internal(_) => json!({ "error": "An internal error occurred" }),
      AppError::PipelineHaltedByHandler => json!({ "error": "Request processing was halted" }),
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
