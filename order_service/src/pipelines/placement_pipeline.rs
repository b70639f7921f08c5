// order_service/src/pipelines/placement_pipeline.rs
use crate::errors::AppError;
use crate::pipelines::contexts::PlaceOrderCtxData;
use crate::services::order_placement::{self, PlaceOrderCommand, PlacementOutcome};
use crate::services::pricing;
use orka::{ContextData, Orka, Pipeline, PipelineControl, SkipCondition};
use std::sync::Arc;
use tracing::{info, instrument};

pub fn register_placement_pipeline(orka_registry: &Arc<Orka<AppError>>) {
  let without_key: SkipCondition<PlaceOrderCtxData> =
    Arc::new(|ctx: ContextData<PlaceOrderCtxData>| ctx.read().idempotency_key.is_none());

  let mut p = Pipeline::<PlaceOrderCtxData, AppError>::new(&[
    ("validate_order_request", false, None),
    ("replay_idempotent_order", true, Some(without_key)),
    ("place_order_atomically", false, None),
  ]);

  p.on_root("validate_order_request", validate_order_request);
  p.on_root("replay_idempotent_order", replay_idempotent_order);
  p.on_root("place_order_atomically", place_order_atomically);

  orka_registry.register_pipeline(p);
}

/// Checks the request shape and builds the placement command. The explicit
/// `userId` wins over the caller's identity.
#[instrument(name = "placement::validate_order_request", skip(ctx_data), err(Display))]
async fn validate_order_request(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, AppError> {
  let mut guard = ctx_data.write();
  let contact = order_placement::validate_contact(&guard.phone, &guard.email, &guard.address)?;
  pricing::validate_line_items(&guard.items)?;

  guard.command = Some(PlaceOrderCommand {
    user_id: guard.requested_user_id.or(guard.caller_id),
    contact,
    items: guard.items.clone(),
    idempotency_key: guard.idempotency_key.clone(),
  });
  Ok(PipelineControl::Continue)
}

/// Stops the pipeline with the stored receipt when the order's owner already
/// used the key.
#[instrument(name = "placement::replay_idempotent_order", skip(ctx_data), err(Display))]
async fn replay_idempotent_order(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, AppError> {
  let (store, owner, key) = {
    let guard = ctx_data.read();
    let owner = guard.command.as_ref().and_then(|cmd| cmd.user_id);
    (guard.app_state.store.clone(), owner, guard.idempotency_key.clone())
  };
  let Some(key) = key else {
    return Ok(PipelineControl::Continue);
  };

  match store.find_receipt_by_idempotency_key(owner, &key).await? {
    Some(receipt) => {
      info!(order_id = %receipt.id, "Idempotency key already used; replaying receipt.");
      ctx_data.write().outcome = Some(PlacementOutcome::Replayed(receipt));
      Ok(PipelineControl::Stop)
    }
    None => Ok(PipelineControl::Continue),
  }
}

#[instrument(name = "placement::place_order_atomically", skip(ctx_data), err(Display))]
async fn place_order_atomically(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, AppError> {
  let (store, command) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.command.clone())
  };
  let command = command.ok_or_else(|| AppError::Internal("Placement command was not prepared".to_string()))?;

  let outcome = order_placement::place_order(store.as_ref(), &command).await?;
  ctx_data.write().outcome = Some(outcome);
  Ok(PipelineControl::Continue)
}
