// order_service/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::models::OrderStatus;
use crate::store::StoreError;
use orka::OrkaError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Invalid status transition from '{from}' to '{to}'")]
  InvalidTransition { from: OrderStatus, to: OrderStatus },

  #[error("Configuration Error: {0}")]
  Config(String),

  /// The write phase of a unit of work failed and was rolled back.
  #[error("Transaction Error: {0}")]
  Transaction(#[source] StoreError),

  #[error("Storage Error: {0}")]
  Storage(#[from] StoreError),

  #[error("Orka Workflow Error: {source}")]
  Workflow {
    #[from]
    source: OrkaError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
      AppError::Config(_)
      | AppError::Transaction(_)
      | AppError::Storage(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    // Causes of server-side failures are logged, never sent to the client.
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Rejecting request");
    }

    let message = match self {
      AppError::Validation(m) | AppError::Auth(m) | AppError::NotFound(m) => m.clone(),
      AppError::InvalidTransition { from, to } => {
        format!("Cannot change status from '{}' to '{}'", from, to)
      }
      AppError::Transaction(_) => "Failed to create order".to_string(),
      AppError::Storage(_) => "Database operation failed".to_string(),
      AppError::Workflow { .. } => "Workflow processing error".to_string(),
      AppError::Config(_) => "Configuration issue".to_string(),
      AppError::Internal(_) => "An internal error occurred".to_string(),
    };
    HttpResponse::build(status).json(json!({ "error": message }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
