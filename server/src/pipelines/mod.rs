// server/src/pipelines/mod.rs

//! The storeflow pipelines behind every multi-step mutation.

use crate::errors::AppError;
use storeflow::{FlowRegistry, FlowResult};

pub mod common_steps;
pub mod contexts;

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod review_pipeline;
pub mod signin_pipeline;
pub mod signup_pipeline;

/// Registers every pipeline with `registry`. Called once at start-up.
pub fn register_all_pipelines(registry: &FlowRegistry<AppError>) -> FlowResult<()> {
  tracing::info!("Registering pipelines...");

  signup_pipeline::register_signup_pipeline(registry)?;
  signin_pipeline::register_signin_pipeline(registry)?;
  review_pipeline::register_review_pipeline(registry)?;
  cart_pipeline::register_cart_pipeline(registry)?;
  checkout_pipeline::register_checkout_pipeline(registry)?;

  tracing::info!("All application pipelines registered.");
  Ok(())
}
