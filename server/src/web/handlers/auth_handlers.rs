// server/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::pipelines::contexts::Registration;
use crate::pipelines::{signin_pipeline, signup_pipeline};
use crate::services::token_service::{TokenKind, UserClaims};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginPayload {
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterPayload {
  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub last_name: String,
  pub middle_name: Option<String>,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub phone: String,
  #[serde(default)]
  pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshPayload {
  pub refresh: String,
}

#[instrument(name = "handler::login", skip(app_state, payload), fields(email = %payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<LoginPayload>,
) -> Result<HttpResponse, AppError> {
  let LoginPayload { email, password } = payload.into_inner();
  let (user, session) = signin_pipeline::authenticate(&app_state, &email, password).await?;

  info!(user_id = %user.id, "Login succeeded.");
  Ok(HttpResponse::Ok().json(json!({
    "user": UserClaims::from(&user),
    "access": session.access,
    "refresh": session.refresh,
  })))
}

#[instrument(name = "handler::register", skip(app_state, payload), fields(email = %payload.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RegisterPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let registration = Registration {
    first_name: payload.first_name,
    last_name: payload.last_name,
    middle_name: payload.middle_name,
    email: payload.email,
    phone: payload.phone,
    password: payload.password,
  };
  let (user, session) = signup_pipeline::register(&app_state, registration).await?;

  info!(user_id = %user.id, "Registration succeeded.");
  Ok(HttpResponse::Ok().json(json!({
    "user": UserClaims::from(&user),
    "access": session.access,
    "refresh": session.refresh,
  })))
}

/// Exchanges a refresh token for a new access token.
#[instrument(name = "handler::refresh_token", skip_all)]
pub async fn refresh_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RefreshPayload>,
) -> Result<HttpResponse, AppError> {
  let claims = app_state.tokens.verify(&payload.refresh, TokenKind::Refresh)?;
  let access = app_state.tokens.issue(TokenKind::Access, &claims)?;
  info!(user_id = %claims.id, "Access token refreshed.");
  Ok(HttpResponse::Ok().json(json!({ "access": access })))
}
