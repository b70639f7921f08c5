// order_service/src/pipelines/contexts.rs

//! Underlying data structs for the order pipelines.
//! Handlers receive these wrapped in `orka::ContextData`.

use crate::models::{LineItemRequest, OrderId, OrderStatus, StatusChange, UserId};
use crate::services::order_placement::{PlaceOrderCommand, PlacementOutcome};
use crate::state::AppState;

#[derive(Clone)]
pub struct PlaceOrderCtxData {
  pub app_state: AppState,
  /// Identity from the caller's token, if any.
  pub caller_id: Option<UserId>,
  pub requested_user_id: Option<UserId>,
  pub phone: String,
  pub email: String,
  pub address: String,
  pub items: Vec<LineItemRequest>,
  pub idempotency_key: Option<String>,
  pub command: Option<PlaceOrderCommand>,
  pub outcome: Option<PlacementOutcome>,
}

#[derive(Clone)]
pub struct UpdateStatusCtxData {
  pub app_state: AppState,
  pub order_id: OrderId,
  pub raw_status: String,
  pub requested_status: Option<OrderStatus>,
  pub change: Option<StatusChange>,
}
