// order_service/tests/common/mod.rs
#![allow(dead_code)]

use jsonwebtoken::{encode, EncodingKey, Header};
use once_cell::sync::Lazy;
use petcare_orders::config::AppConfig;
use petcare_orders::services::auth_service::TokenClaims;
use petcare_orders::services::status_machine::StatusTransitionMode;
use petcare_orders::state::AppState;
use petcare_orders::store::MemoryOrderStore;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub const JWT_SECRET: &str = "integration-test-secret";

static TRACING: Lazy<()> = Lazy::new(|| {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_test_writer()
    .try_init();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING);
}

pub fn test_config(mode: StatusTransitionMode) -> AppConfig {
  let mode = match mode {
    StatusTransitionMode::Permissive => "permissive",
    StatusTransitionMode::Strict => "strict",
  };
  AppConfig::from_source(|name| match name {
    "DATABASE_URL" => Some("postgres://unused/in-memory".to_string()),
    "JWT_SECRET" => Some(JWT_SECRET.to_string()),
    "ORDER_STATUS_MODE" => Some(mode.to_string()),
    _ => None,
  })
  .expect("test config")
}

/// Catalog: 1 = kibble at 9.99, 2 = chew toy at 4.50, 3 = collar at 15.00.
pub fn seeded_store() -> MemoryOrderStore {
  MemoryOrderStore::new()
    .with_product(1, "Salmon kibble", "9.99".parse().unwrap(), Some("kibble.png"))
    .with_product(2, "Chew toy", "4.50".parse().unwrap(), None)
    .with_product(3, "Reflective collar", "15.00".parse().unwrap(), Some("collar.png"))
}

pub fn app_state(store: &MemoryOrderStore, mode: StatusTransitionMode) -> AppState {
  setup_tracing();
  AppState::new(Arc::new(store.clone()), test_config(mode))
}

pub fn bearer_for(user_id: i64) -> String {
  let claims = TokenClaims {
    id: user_id,
    email: format!("user{}@example.com", user_id),
    exp: chrono::Utc::now().timestamp() + 3600,
  };
  let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes())).unwrap();
  format!("Bearer {}", token)
}

pub fn order_body(items: serde_json::Value) -> serde_json::Value {
  serde_json::json!({
    "phone": "555-0100",
    "email": "owner@example.com",
    "address": "12 Kennel Road",
    "items": items,
  })
}

/// Builds the service under test around `$state`.
macro_rules! spawn_app {
  ($state:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($state))
        .configure(petcare_orders::web::configure_app_routes),
    )
    .await
  };
}
