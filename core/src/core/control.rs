// src/core/control.rs

//! Signals for controlling pipeline flow and the outcome of a pipeline run.

/// Returned by every handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  /// Run the remaining handlers of this step, then the next step.
  Continue,
  /// Halt the pipeline. No further handlers run.
  Stop,
}

/// Outcome of a full pipeline execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step that was not skipped ran to completion.
  Completed,
  /// A handler returned [`PipelineControl::Stop`].
  Stopped,
}

impl PipelineResult {
  pub fn is_completed(self) -> bool {
    self == PipelineResult::Completed
  }
}
