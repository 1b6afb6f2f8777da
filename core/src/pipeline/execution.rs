// src/pipeline/execution.rs

//! `Pipeline::run`: executes steps in order against a shared context.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, info_span, instrument, Instrument, Level};

enum PhaseOutcome<Err> {
  Continue,
  Stop,
  Failed(Err),
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step in order.
  ///
  /// A step is skipped when its `skip_if` condition holds. A step without
  /// any handler is skipped when optional and is a [`FlowError::HandlerMissing`]
  /// otherwise. The first handler error is returned as-is and no later
  /// handler runs; a `Stop` signal ends the run with [`PipelineResult::Stopped`].
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(&ctx_data) {
          event!(Level::DEBUG, step_name, "Step skipped by its condition.");
          continue;
        }
      }

      let phases = [
        ("before", self.before.get(step_name)),
        ("on", self.on.get(step_name)),
        ("after", self.after.get(step_name)),
      ];

      if phases.iter().all(|(_, handlers)| handlers.map_or(true, |v| v.is_empty())) {
        if step_def.optional {
          event!(Level::DEBUG, step_name, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(Level::ERROR, step_name, "Non-optional step has no handlers.");
        return Err(Err::from(FlowError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      let step_span = info_span!("pipeline_step", step_name, step_index = step_idx, optional = step_def.optional);

      for (phase_name, handlers) in phases {
        let Some(handlers) = handlers else { continue };
        match Self::run_phase(handlers, &ctx_data).instrument(step_span.clone()).await {
          PhaseOutcome::Continue => {}
          PhaseOutcome::Stop => {
            event!(Level::INFO, step_name, phase = phase_name, "Pipeline stopped by a handler.");
            return Ok(PipelineResult::Stopped);
          }
          PhaseOutcome::Failed(e) => {
            event!(Level::WARN, step_name, phase = phase_name, error = %e, "Handler failed.");
            return Err(e);
          }
        }
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }

  async fn run_phase(handlers: &[Handler<TData, Err>], ctx_data: &ContextData<TData>) -> PhaseOutcome<Err> {
    for handler_fn in handlers {
      match handler_fn(ctx_data.clone()).await {
        Ok(PipelineControl::Continue) => {}
        Ok(PipelineControl::Stop) => return PhaseOutcome::Stop,
        Err(e) => return PhaseOutcome::Failed(e),
      }
    }
    PhaseOutcome::Continue
  }
}
