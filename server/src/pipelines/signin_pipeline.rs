// server/src/pipelines/signin_pipeline.rs

use storeflow::{ContextData, FlowRegistry, FlowResult, Pipeline, PipelineControl, PipelineResult};
use tracing::{debug, event, info, instrument, warn, Level};

use crate::db::users;
use crate::errors::{AppError, Result as AppResult};
use crate::models::User;
use crate::pipelines::common_steps;
use crate::pipelines::contexts::SigninCtxData;
use crate::services::auth_service;
use crate::services::token_service::TokenPair;
use crate::state::AppState;

const BAD_CREDENTIALS: &str = "Invalid email or password.";

/// Registers the user sign-in pipeline.
pub fn register_signin_pipeline(registry: &FlowRegistry<AppError>) -> FlowResult<()> {
  let mut p = Pipeline::<SigninCtxData, AppError>::new(&[
    ("validate_signin_input", false, None),
    ("fetch_user_by_email", false, None),
    ("verify_user_password", false, None),
    ("issue_session", false, None),
  ]);

  p.on_root("validate_signin_input", validate_signin_input)?;
  p.on_root("fetch_user_by_email", fetch_user_by_email)?;
  p.on_root("verify_user_password", verify_user_password)?;
  p.on_root("issue_session", issue_session)?;

  registry.register_pipeline(p);
  info!("Sign-in pipeline registered.");
  Ok(())
}

/// Checks the credentials and returns the user with fresh tokens.
#[instrument(name = "signin::authenticate", skip(app_state, password))]
pub async fn authenticate(app_state: &AppState, email: &str, password: String) -> AppResult<(User, TokenPair)> {
  let ctx = ContextData::new(SigninCtxData {
    db_pool: app_state.db_pool.clone(),
    tokens: app_state.tokens.clone(),
    email: email.to_string(),
    password,
    user: None,
    session: None,
  });

  match app_state.flows.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let mut guard = ctx.write();
      match (guard.user.take(), guard.session.take()) {
        (Some(user), Some(session)) => Ok((user, session)),
        _ => Err(AppError::Internal("Sign-in completed without a user or session.".to_string())),
      }
    }
    PipelineResult::Stopped => Err(AppError::Auth(BAD_CREDENTIALS.to_string())),
  }
}

/// Blank credentials stop the run, which surfaces as the same
/// authentication failure as a wrong password.
async fn validate_signin_input(ctx: ContextData<SigninCtxData>) -> AppResult<PipelineControl> {
  let blank = {
    let guard = ctx.read();
    guard.email.trim().is_empty() || guard.password.is_empty()
  };
  if blank {
    debug!("Sign-in with blank credentials.");
    return Ok(PipelineControl::Stop);
  }
  Ok(PipelineControl::Continue)
}

async fn fetch_user_by_email(ctx: ContextData<SigninCtxData>) -> AppResult<PipelineControl> {
  let (email, password, db_pool) = {
    let guard = ctx.read();
    (guard.email.trim().to_string(), guard.password.clone(), guard.db_pool.clone())
  };

  match users::find_by_email(&db_pool, &email).await? {
    Some(user) => {
      event!(Level::DEBUG, user_id = %user.id, "User found for sign-in.");
      ctx.write().user = Some(user);
      Ok(PipelineControl::Continue)
    }
    None => {
      auth_service::verify_against_dummy(&password);
      warn!(%email, "Sign-in for unknown email.");
      Err(AppError::Auth(BAD_CREDENTIALS.to_string()))
    }
  }
}

async fn verify_user_password(ctx: ContextData<SigninCtxData>) -> AppResult<PipelineControl> {
  let (stored_hash, password, user_id) = {
    let guard = ctx.read();
    let user = guard
      .user
      .as_ref()
      .ok_or_else(|| AppError::Internal("No user loaded before password check.".to_string()))?;
    (user.password_hash.clone(), guard.password.clone(), user.id)
  };

  if auth_service::verify_password(&stored_hash, &password)? {
    event!(Level::INFO, %user_id, "Password verified.");
    Ok(PipelineControl::Continue)
  } else {
    warn!(%user_id, "Password mismatch on sign-in.");
    Err(AppError::Auth(BAD_CREDENTIALS.to_string()))
  }
}

async fn issue_session(ctx: ContextData<SigninCtxData>) -> AppResult<PipelineControl> {
  let mut guard = ctx.write();
  let user = guard
    .user
    .as_ref()
    .ok_or_else(|| AppError::Internal("No user to issue a session for.".to_string()))?;
  let session = common_steps::issue_session(&guard.tokens, user)?;
  guard.session = Some(session);
  Ok(PipelineControl::Continue)
}
