// order_service/src/services/auth_service.rs

//! Verifies caller tokens issued by the accounts service.

use crate::errors::AppError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Claims carried by an accounts-service token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
  pub id: i64,
  pub email: String,
  pub exp: i64,
}

/// HS256 verifier for caller tokens.
#[derive(Clone)]
pub struct TokenVerifier {
  decoding_key: DecodingKey,
}

impl std::fmt::Debug for TokenVerifier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TokenVerifier").finish_non_exhaustive()
  }
}

impl TokenVerifier {
  pub fn new(secret: &str) -> Self {
    Self {
      decoding_key: DecodingKey::from_secret(secret.as_bytes()),
    }
  }

  /// Decodes and checks signature and expiry.
  #[instrument(name = "auth_service::verify", skip_all, err(Display))]
  pub fn verify(&self, token: &str) -> Result<TokenClaims, AppError> {
    let validation = Validation::new(Algorithm::HS256);
    match decode::<TokenClaims>(token, &self.decoding_key, &validation) {
      Ok(data) => {
        debug!(user_id = data.claims.id, "Caller token verified.");
        Ok(data.claims)
      }
      Err(e) => {
        let reason = match e.kind() {
          ErrorKind::ExpiredSignature => "Token expired",
          ErrorKind::InvalidSignature => "Invalid token signature",
          _ => "Invalid token",
        };
        warn!(error = %e, "Caller token rejected.");
        Err(AppError::Auth(reason.to_string()))
      }
    }
  }
}

/// The token part of an `Authorization: Bearer <token>` value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
  header_value
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
}
