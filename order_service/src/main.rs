// order_service/src/main.rs

use petcare_orders::config::AppConfig;
use petcare_orders::state::AppState;
use petcare_orders::store::PgOrderStore;
use petcare_orders::web::configure_app_routes;

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting pet-care order service...");

  let app_config = AppConfig::from_env().context("Failed to load application configuration")?;
  tracing::debug!(config = ?app_config, "Loaded config details");

  let store = PgOrderStore::connect(&app_config.database_url, app_config.database_max_connections)
    .await
    .context("Failed to connect to the database")?;
  tracing::info!("Successfully connected to the database.");

  if app_config.run_migrations {
    store.run_migrations().await.context("Failed to apply migrations")?;
    tracing::info!("Database migrations applied.");
  }

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  let app_state = AppState::new(Arc::new(store), app_config);
  tracing::info!("Orka pipelines registered.");

  tracing::info!("Attempting to bind server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await?;

  Ok(())
}
