// order_service/src/pipelines/status_pipeline.rs
use crate::errors::AppError;
use crate::pipelines::contexts::UpdateStatusCtxData;
use crate::services::status_machine;
use orka::{ContextData, Orka, Pipeline, PipelineControl};
use std::sync::Arc;
use tracing::instrument;

pub fn register_status_pipeline(orka_registry: &Arc<Orka<AppError>>) {
  let mut p = Pipeline::<UpdateStatusCtxData, AppError>::new(&[
    ("parse_requested_status", false, None),
    ("apply_status_change", false, None),
  ]);

  p.on_root("parse_requested_status", |ctx_data: ContextData<UpdateStatusCtxData>| async move {
    let parsed = status_machine::parse_status(&ctx_data.read().raw_status)?;
    ctx_data.write().requested_status = Some(parsed);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on_root("apply_status_change", apply_status_change);

  orka_registry.register_pipeline(p);
}

#[instrument(name = "status::apply_status_change", skip(ctx_data), err(Display))]
async fn apply_status_change(ctx_data: ContextData<UpdateStatusCtxData>) -> Result<PipelineControl, AppError> {
  let (store, mode, order_id, requested) = {
    let guard = ctx_data.read();
    (
      guard.app_state.store.clone(),
      guard.app_state.config.order_status_mode,
      guard.order_id,
      guard.requested_status,
    )
  };
  let status = requested.ok_or_else(|| AppError::Internal("Requested status was not parsed".to_string()))?;

  let change = status_machine::set_status(store.as_ref(), mode, order_id, status).await?;
  ctx_data.write().change = Some(change);
  Ok(PipelineControl::Continue)
}
