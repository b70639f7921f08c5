// order_service/src/services/status_machine.rs

//! Order status lifecycle.
//!
//! ```text
//! pending ──> processing ──> delivered
//!    │             │
//!    └─────────────┴──────> cancelled
//! ```

use crate::errors::AppError;
use crate::models::{OrderId, OrderStatus, StatusChange};
use crate::store::OrderStore;
use std::str::FromStr;
use tracing::{debug, info, instrument};

/// How strictly `set_status` follows the lifecycle graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusTransitionMode {
  /// Any recognized status may replace any other.
  #[default]
  Permissive,
  /// Only edges of the lifecycle graph are accepted.
  Strict,
}

impl FromStr for StatusTransitionMode {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "permissive" => Ok(StatusTransitionMode::Permissive),
      "strict" => Ok(StatusTransitionMode::Strict),
      other => Err(format!("expected 'permissive' or 'strict', got '{}'", other)),
    }
  }
}

/// Whether the lifecycle graph has an edge `from -> to`.
pub fn can_transition_to(from: OrderStatus, to: OrderStatus) -> bool {
  use OrderStatus::*;
  matches!(
    (from, to),
    (Pending, Processing) | (Processing, Delivered) | (Pending, Cancelled) | (Processing, Cancelled)
  )
}

/// Staying in the same status is always accepted.
pub fn check_transition(mode: StatusTransitionMode, from: OrderStatus, to: OrderStatus) -> Result<(), AppError> {
  match mode {
    StatusTransitionMode::Permissive => Ok(()),
    StatusTransitionMode::Strict if from == to || can_transition_to(from, to) => Ok(()),
    StatusTransitionMode::Strict => Err(AppError::InvalidTransition { from, to }),
  }
}

pub fn parse_status(raw: &str) -> Result<OrderStatus, AppError> {
  OrderStatus::from_str(raw).map_err(|_| AppError::Validation("Invalid status".to_string()))
}

/// Sets the status of `order_id`. The current status is locked for the
/// duration of the check and the write. Total and line items are untouched.
#[instrument(name = "status_machine::set_status", skip_all, fields(%order_id, %status, ?mode))]
pub async fn set_status(
  store: &dyn OrderStore,
  mode: StatusTransitionMode,
  order_id: OrderId,
  status: OrderStatus,
) -> Result<StatusChange, AppError> {
  let mut tx = store.begin().await?;

  let current = tx
    .lock_order_status(order_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

  check_transition(mode, current, status)?;

  if current == status {
    debug!("Status unchanged; nothing to write.");
    return Ok(StatusChange { id: order_id, status });
  }

  tx.set_order_status(order_id, status).await?;
  tx.commit().await?;

  info!(from = %current, to = %status, "Order status changed.");
  Ok(StatusChange { id: order_id, status })
}
