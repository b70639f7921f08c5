// order_service/src/web/handlers/extractors.rs

//! Request extractors for caller identity and idempotency keys.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

use crate::errors::AppError;
use crate::models::UserId;
use crate::services::auth_service::bearer_token;
use crate::state::AppState;

pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";
const MAX_IDEMPOTENCY_KEY_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
  pub user_id: UserId,
  pub email: String,
}

/// Who is calling. No `Authorization` header means an anonymous caller; a
/// header that does not carry a valid bearer token is rejected.
#[derive(Debug, Clone, Default)]
pub struct CallerIdentity {
  pub user: Option<AuthenticatedUser>,
}

impl CallerIdentity {
  pub fn user_id(&self) -> Option<UserId> {
    self.user.as_ref().map(|u| u.user_id)
  }
}

impl FromRequest for CallerIdentity {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    ready(identify(req))
  }
}

fn identify(req: &HttpRequest) -> Result<CallerIdentity, AppError> {
  let Some(raw) = req.headers().get(AUTHORIZATION) else {
    return Ok(CallerIdentity::default());
  };
  let token = raw.to_str().ok().and_then(bearer_token).ok_or_else(|| {
    warn!("Authorization header is not a bearer token.");
    AppError::Auth("Invalid token".to_string())
  })?;

  let state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("Application state is not configured".to_string()))?;
  let claims = state.token_verifier.verify(token)?;

  Ok(CallerIdentity {
    user: Some(AuthenticatedUser {
      user_id: UserId(claims.id),
      email: claims.email,
    }),
  })
}

/// Optional `Idempotency-Key` header: 1 to 128 visible ASCII characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdempotencyKey(pub Option<String>);

impl IdempotencyKey {
  pub fn parse(raw: &str) -> Result<Self, AppError> {
    let valid = !raw.is_empty()
      && raw.len() <= MAX_IDEMPOTENCY_KEY_LEN
      && raw.bytes().all(|b| b.is_ascii_graphic());
    if !valid {
      return Err(AppError::Validation(format!(
        "{} must be 1 to {} visible ASCII characters",
        IDEMPOTENCY_KEY_HEADER, MAX_IDEMPOTENCY_KEY_LEN
      )));
    }
    Ok(Self(Some(raw.to_string())))
  }
}

impl FromRequest for IdempotencyKey {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let result = match req.headers().get(IDEMPOTENCY_KEY_HEADER) {
      None => Ok(IdempotencyKey(None)),
      Some(value) => match value.to_str() {
        Ok(raw) => IdempotencyKey::parse(raw),
        Err(_) => IdempotencyKey::parse(""),
      },
    };
    ready(result)
  }
}
