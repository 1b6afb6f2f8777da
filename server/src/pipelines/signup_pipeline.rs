// server/src/pipelines/signup_pipeline.rs

use storeflow::{ContextData, FlowRegistry, FlowResult, Pipeline, PipelineControl, PipelineResult};
use tracing::{event, info, instrument, warn, Level};

use crate::db::users::{self, NewUser};
use crate::errors::{AppError, Result as AppResult};
use crate::models::User;
use crate::pipelines::common_steps;
use crate::pipelines::contexts::{Registration, SignupCtxData};
use crate::services::auth_service;
use crate::services::token_service::TokenPair;
use crate::state::AppState;

/// Registers the user sign-up pipeline.
pub fn register_signup_pipeline(registry: &FlowRegistry<AppError>) -> FlowResult<()> {
  let mut p = Pipeline::<SignupCtxData, AppError>::new(&[
    ("validate_registration", false, None),
    ("check_existing_user", false, None),
    ("create_user", false, None),
    ("issue_session", false, None),
  ]);

  p.on_root("validate_registration", validate_registration)?;
  p.on_root("check_existing_user", check_existing_user)?;
  p.on_root("create_user", create_user)?;
  p.on_root("issue_session", issue_session)?;

  registry.register_pipeline(p);
  info!("Sign-up pipeline registered.");
  Ok(())
}

/// Runs the sign-up pipeline and returns the new user with their tokens.
#[instrument(name = "signup::register", skip_all, fields(email = %registration.email))]
pub async fn register(app_state: &AppState, registration: Registration) -> AppResult<(User, TokenPair)> {
  let ctx = ContextData::new(SignupCtxData {
    db_pool: app_state.db_pool.clone(),
    tokens: app_state.tokens.clone(),
    registration,
    created_user: None,
    session: None,
  });

  match app_state.flows.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let mut guard = ctx.write();
      let user = guard.created_user.take();
      let session = guard.session.take();
      match (user, session) {
        (Some(user), Some(session)) => Ok((user, session)),
        _ => Err(AppError::Internal("Sign-up completed without a user or session.".to_string())),
      }
    }
    PipelineResult::Stopped => Err(AppError::PipelineHaltedByHandler),
  }
}

async fn validate_registration(ctx: ContextData<SignupCtxData>) -> AppResult<PipelineControl> {
  let registration = { ctx.read().registration.clone() };
  if let Err(e) = registration.validate() {
    warn!(error = %e, "Registration input rejected.");
    return Err(e);
  }
  auth_service::check_password_policy(&registration.password)?;

  event!(Level::DEBUG, email = %registration.email, "Registration input validated.");
  Ok(PipelineControl::Continue)
}

async fn check_existing_user(ctx: ContextData<SignupCtxData>) -> AppResult<PipelineControl> {
  let (email, db_pool) = {
    let guard = ctx.read();
    (guard.registration.email.clone(), guard.db_pool.clone())
  };

  if users::email_exists(&db_pool, &email).await? {
    warn!(%email, "Sign-up attempted with an existing email.");
    return Err(AppError::Validation("An account with this email already exists.".to_string()));
  }
  Ok(PipelineControl::Continue)
}

async fn create_user(ctx: ContextData<SignupCtxData>) -> AppResult<PipelineControl> {
  let (registration, db_pool) = {
    let guard = ctx.read();
    (guard.registration.clone(), guard.db_pool.clone())
  };

  let password_hash = auth_service::hash_password(&registration.password)?;
  let new_user = NewUser {
    first_name: registration.first_name.trim(),
    last_name: registration.last_name.trim(),
    middle_name: registration.middle_name.as_deref().map(str::trim).filter(|m| !m.is_empty()),
    email: registration.email.trim(),
    phone: registration.phone.trim(),
    password_hash: &password_hash,
  };

  let user = users::insert(&db_pool, &new_user)
    .await
    .map_err(|e| AppError::unique_violation_as(e, "An account with this email already exists."))?;

  info!(user_id = %user.id, "User created.");
  ctx.write().created_user = Some(user);
  Ok(PipelineControl::Continue)
}

async fn issue_session(ctx: ContextData<SignupCtxData>) -> AppResult<PipelineControl> {
  let mut guard = ctx.write();
  let user = guard
    .created_user
    .as_ref()
    .ok_or_else(|| AppError::Internal("No user to issue a session for.".to_string()))?;
  let session = common_steps::issue_session(&guard.tokens, user)?;
  guard.session = Some(session);
  Ok(PipelineControl::Continue)
}
