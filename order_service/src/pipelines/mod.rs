// order_service/src/pipelines/mod.rs

//! Defines and registers the Orka pipelines behind the order endpoints.

use crate::errors::AppError;
use orka::Orka;
use std::sync::Arc;

pub mod contexts;
pub mod placement_pipeline;
pub mod status_pipeline;

/// Registers every order pipeline with `orka_instance`. Called once while
/// building `AppState`.
pub fn register_all_pipelines(orka_instance: &Arc<Orka<AppError>>) {
  tracing::info!("Registering Orka pipelines...");

  placement_pipeline::register_placement_pipeline(orka_instance);
  status_pipeline::register_status_pipeline(orka_instance);

  tracing::info!("All order pipelines registered with Orka.");
}
