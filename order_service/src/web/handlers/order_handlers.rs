// order_service/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::extractors::{CallerIdentity, IdempotencyKey};
use crate::errors::AppError;
use crate::models::{LineItemRequest, OrderId, UserId};
use crate::pipelines::contexts::{PlaceOrderCtxData, UpdateStatusCtxData};
use crate::services::order_placement::PlacementOutcome;
use crate::services::order_reader;
use crate::state::AppState;
use orka::{ContextData, PipelineResult};

// Missing fields default to empty so validation can name them.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOrderPayload {
  pub user_id: Option<UserId>,
  pub phone: String,
  pub email: String,
  pub address: String,
  pub items: Vec<LineItemRequest>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct UpdateStatusPayload {
  pub status: String,
}

#[instrument(
  name = "handler::create_order",
  skip_all,
  fields(caller = ?caller.user_id(), lines = payload.items.len())
)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CreateOrderPayload>,
  caller: CallerIdentity,
  idempotency_key: IdempotencyKey,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let ctx = ContextData::new(PlaceOrderCtxData {
    app_state: app_state.get_ref().clone(),
    caller_id: caller.user_id(),
    requested_user_id: payload.user_id,
    phone: payload.phone,
    email: payload.email,
    address: payload.address,
    items: payload.items,
    idempotency_key: idempotency_key.0,
    command: None,
    outcome: None,
  });

  let result = app_state.orka_instance.run(ctx.clone()).await?;
  let outcome = ctx.with_write(|data| data.outcome.take());
  match outcome {
    Some(PlacementOutcome::Created(receipt)) => {
      info!(order_id = %receipt.id, "Order created.");
      Ok(HttpResponse::Created().json(receipt))
    }
    Some(PlacementOutcome::Replayed(receipt)) => Ok(HttpResponse::Ok().json(receipt)),
    None => {
      warn!(?result, "Placement pipeline finished without an outcome.");
      Err(AppError::Internal("Order placement produced no result".to_string()))
    }
  }
}

#[instrument(name = "handler::list_orders", skip_all, fields(caller = ?caller.user_id()))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  caller: CallerIdentity,
) -> Result<HttpResponse, AppError> {
  let orders = order_reader::list_orders(app_state.store.as_ref(), caller.user_id()).await?;
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::get_order", skip(app_state))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let order = order_reader::get_order(app_state.store.as_ref(), OrderId(path.into_inner())).await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::update_order_status", skip(app_state, payload))]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  payload: web::Json<UpdateStatusPayload>,
) -> Result<HttpResponse, AppError> {
  let ctx = ContextData::new(UpdateStatusCtxData {
    app_state: app_state.get_ref().clone(),
    order_id: OrderId(path.into_inner()),
    raw_status: payload.into_inner().status,
    requested_status: None,
    change: None,
  });

  match app_state.orka_instance.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let change = ctx.read().change;
      change
        .map(|c| HttpResponse::Ok().json(c))
        .ok_or_else(|| AppError::Internal("Status change produced no result".to_string()))
    }
    PipelineResult::Stopped => Err(AppError::Internal("Status change was halted".to_string())),
  }
}
