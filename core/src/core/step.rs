// src/core/step.rs

//! Definition of a single pipeline step.

use super::ContextData;
use std::sync::Arc;

/// Evaluated right before a step runs; `true` skips the whole step.
pub type SkipCondition<TData> = Arc<dyn Fn(&ContextData<TData>) -> bool + Send + Sync + 'static>;

#[derive(Clone)]
pub struct StepDef<T: 'static + Send + Sync> {
  pub name: String,
  pub optional: bool,
  pub skip_if: Option<SkipCondition<T>>,
}

impl<T: 'static + Send + Sync> StepDef<T> {
  pub fn new(name: impl Into<String>, optional: bool, skip_if: Option<SkipCondition<T>>) -> Self {
    Self {
      name: name.into(),
      optional,
      skip_if,
    }
  }
}

impl<T: 'static + Send + Sync> std::fmt::Debug for StepDef<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("optional", &self.optional)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}

/// Builds a [`SkipCondition`] from a plain predicate over the context data.
pub fn skip_when<TData, F>(predicate: F) -> SkipCondition<TData>
where
  TData: 'static + Send + Sync,
  F: Fn(&TData) -> bool + Send + Sync + 'static,
{
  Arc::new(move |ctx: &ContextData<TData>| predicate(&ctx.read()))
}
