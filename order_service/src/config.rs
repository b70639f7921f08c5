// order_service/src/config.rs

use crate::errors::{AppError, Result};
use crate::services::status_machine::StatusTransitionMode;
use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,
  /// Shared HS256 secret for caller tokens.
  pub jwt_secret: String,
  pub order_status_mode: StatusTransitionMode,
  /// Apply embedded migrations at startup.
  pub run_migrations: bool,
}

// Secrets stay out of logs.
impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &"[REDACTED]")
      .field("database_max_connections", &self.database_max_connections)
      .field("jwt_secret", &"[REDACTED]")
      .field("order_status_mode", &self.order_status_mode)
      .field("run_migrations", &self.run_migrations)
      .finish()
  }
}

impl AppConfig {
  /// Loads `.env` if present, then reads the process environment.
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_source(|name| env::var(name).ok())
  }

  /// Builds the config from any variable lookup.
  pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let required = |name: &str| {
      lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", name)))
    };
    let or_default = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

    let server_host = or_default("SERVER_HOST", "127.0.0.1");
    let server_port = or_default("SERVER_PORT", "8080")
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = required("DATABASE_URL")?;
    let database_max_connections = or_default("DATABASE_MAX_CONNECTIONS", "10")
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS: {}", e)))?;
    let jwt_secret = required("JWT_SECRET")?;
    let order_status_mode = or_default("ORDER_STATUS_MODE", "permissive")
      .parse::<StatusTransitionMode>()
      .map_err(|e| AppError::Config(format!("Invalid ORDER_STATUS_MODE: {}", e)))?;
    let run_migrations = or_default("RUN_MIGRATIONS", "false")
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid RUN_MIGRATIONS value: {}", e)))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      jwt_secret,
      order_status_mode,
      run_migrations,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_source(|name| vars.get(name).cloned())
  }

  #[test]
  fn defaults_apply_when_only_required_vars_are_set() {
    let cfg = load(&[("DATABASE_URL", "postgres://localhost/pets"), ("JWT_SECRET", "s3cret")]).unwrap();
    assert_eq!(cfg.server_host, "127.0.0.1");
    assert_eq!(cfg.server_port, 8080);
    assert_eq!(cfg.database_max_connections, 10);
    assert_eq!(cfg.order_status_mode, StatusTransitionMode::Permissive);
    assert!(!cfg.run_migrations);
  }

  #[test]
  fn missing_secret_is_a_config_error() {
    let err = load(&[("DATABASE_URL", "postgres://localhost/pets")]).unwrap_err();
    assert!(matches!(err, AppError::Config(m) if m.contains("JWT_SECRET")));
  }

  #[test]
  fn invalid_values_are_rejected() {
    let base = [("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "s")];
    let with = |extra: (&'static str, &'static str)| {
      let mut vars = base.to_vec();
      vars.push(extra);
      load(&vars)
    };
    assert!(with(("SERVER_PORT", "eighty")).is_err());
    assert!(with(("ORDER_STATUS_MODE", "chaotic")).is_err());
    assert!(with(("RUN_MIGRATIONS", "yes")).is_err());
    assert_eq!(
      with(("ORDER_STATUS_MODE", "strict")).unwrap().order_status_mode,
      StatusTransitionMode::Strict
    );
  }

  #[test]
  fn debug_output_redacts_secrets() {
    let cfg = load(&[("DATABASE_URL", "postgres://user:pw@db/pets"), ("JWT_SECRET", "s3cret")]).unwrap();
    let printed = format!("{:?}", cfg);
    assert!(!printed.contains("s3cret"));
    assert!(!printed.contains("pw@db"));
  }
}
