// order_service/src/services/order_placement.rs

//! Atomic order placement: header and line items are written in one unit of
//! work, priced from a snapshot taken inside that same unit of work.

use crate::errors::AppError;
use crate::models::{ContactDetails, LineItemRequest, NewOrderHeader, OrderReceipt, UserId};
use crate::services::{pricing, totals};
use crate::store::OrderStore;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct PlaceOrderCommand {
  pub user_id: Option<UserId>,
  pub contact: ContactDetails,
  pub items: Vec<LineItemRequest>,
  pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlacementOutcome {
  Created(OrderReceipt),
  /// An order with the same idempotency key was already committed.
  Replayed(OrderReceipt),
}

impl PlacementOutcome {
  pub fn receipt(&self) -> &OrderReceipt {
    match self {
      PlacementOutcome::Created(r) | PlacementOutcome::Replayed(r) => r,
    }
  }
}

/// Trims each contact field and rejects blanks.
pub fn validate_contact(phone: &str, email: &str, address: &str) -> Result<ContactDetails, AppError> {
  let required = |field: &str, value: &str| -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(AppError::Validation(format!("Invalid order data: {} is required", field)));
    }
    Ok(trimmed.to_string())
  };
  Ok(ContactDetails {
    phone: required("phone", phone)?,
    email: required("email", email)?,
    address: required("address", address)?,
  })
}

/// Places an order.
///
/// Prices are read once, inside the unit of work and before any write. A
/// validation failure means nothing was written. Any failure after the unit of
/// work began is `AppError::Transaction` and leaves no trace: the unit of work
/// is dropped uncommitted.
#[instrument(
  name = "order_placement::place_order",
  skip(store, cmd),
  fields(user_id = ?cmd.user_id, lines = cmd.items.len(), keyed = cmd.idempotency_key.is_some())
)]
pub async fn place_order(store: &dyn OrderStore, cmd: &PlaceOrderCommand) -> Result<PlacementOutcome, AppError> {
  pricing::validate_line_items(&cmd.items)?;

  let mut tx = store.begin().await.map_err(AppError::Transaction)?;

  let snapshot = pricing::resolve_price_snapshot(tx.as_mut(), &cmd.items).await?;
  let lines = pricing::price_lines(&cmd.items, &snapshot)?;
  let total = totals::compute_order_total(&lines)?;

  let header = NewOrderHeader {
    user_id: cmd.user_id,
    contact: cmd.contact.clone(),
    total,
    idempotency_key: cmd.idempotency_key.clone(),
  };

  let Some((order_id, created_at)) = tx.insert_order_header(&header).await.map_err(AppError::Transaction)? else {
    drop(tx);
    return replay_committed(store, cmd).await;
  };

  tx.insert_order_items(order_id, &lines)
    .await
    .map_err(AppError::Transaction)?;

  if let Err(commit_err) = tx.commit().await {
    // The key may have been committed by a concurrent placement meanwhile.
    if cmd.idempotency_key.is_some() {
      if let Ok(outcome) = replay_committed(store, cmd).await {
        return Ok(outcome);
      }
    }
    return Err(AppError::Transaction(commit_err));
  }

  info!(%order_id, %total, "Order placed.");
  Ok(PlacementOutcome::Created(OrderReceipt {
    id: order_id,
    total,
    created_at,
  }))
}

async fn replay_committed(store: &dyn OrderStore, cmd: &PlaceOrderCommand) -> Result<PlacementOutcome, AppError> {
  let Some(key) = cmd.idempotency_key.as_deref() else {
    return Err(AppError::Internal("Order header insert was skipped without an idempotency key".to_string()));
  };
  match store.find_receipt_by_idempotency_key(cmd.user_id, key).await {
    Ok(Some(receipt)) => {
      info!(order_id = %receipt.id, "Replaying order for repeated idempotency key.");
      Ok(PlacementOutcome::Replayed(receipt))
    }
    Ok(None) => {
      warn!("Idempotency key conflicted but no committed order holds it.");
      Err(AppError::Internal("Idempotency key conflict could not be resolved".to_string()))
    }
    Err(e) => Err(AppError::Transaction(e)),
  }
}
