// server/src/web/extractors.rs

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::token_service::{TokenKind, UserClaims};
use crate::state::AppState;

/// The caller identified by an `Authorization: Bearer <access token>` header.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub claims: UserClaims,
}

impl AuthenticatedUser {
  pub fn user_id(&self) -> Uuid {
    self.claims.id
  }
}

/// Pulls the token out of a `Bearer` authorization header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
  let (scheme, token) = header_value.trim().split_once(' ')?;
  let token = token.trim();
  (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(authenticate(req))
  }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
  let app_state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;

  let token = req
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|value| value.to_str().ok())
    .and_then(bearer_token)
    .ok_or_else(|| {
      debug!("Request without a bearer token.");
      AppError::Auth("Authentication credentials were not provided.".to_string())
    })?;

  let claims = app_state.tokens.verify(token, TokenKind::Access)?;
  Ok(AuthenticatedUser { claims })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bearer_token_parsing() {
    assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
    assert_eq!(bearer_token("bearer   abc"), Some("abc"));
    assert_eq!(bearer_token("Basic abc"), None);
    assert_eq!(bearer_token("Bearer "), None);
    assert_eq!(bearer_token("abc"), None);
  }
}
