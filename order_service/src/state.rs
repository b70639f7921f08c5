// order_service/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use crate::services::auth_service::TokenVerifier;
use crate::store::OrderStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn OrderStore>,
  pub orka_instance: Arc<orka::Orka<AppError>>,
  pub config: Arc<AppConfig>,
  pub token_verifier: Arc<TokenVerifier>,
}

impl AppState {
  /// Builds the shared state and registers every pipeline with its registry.
  pub fn new(store: Arc<dyn OrderStore>, config: AppConfig) -> Self {
    let orka_instance = Arc::new(orka::Orka::<AppError>::new());
    pipelines::register_all_pipelines(&orka_instance);
    let token_verifier = Arc::new(TokenVerifier::new(&config.jwt_secret));
    Self {
      store,
      orka_instance,
      config: Arc::new(config),
      token_verifier,
    }
  }
}
