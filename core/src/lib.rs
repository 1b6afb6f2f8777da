// src/lib.rs

//! storeflow: named-step asynchronous pipelines.
//!
//! A pipeline is an ordered list of named steps. Each step can carry
//! `before`, `on` and `after` handlers that operate on a shared
//! [`ContextData`] and tell the runner whether to continue or stop.
//! Steps can be optional or skipped by a condition evaluated against the
//! context, which is how mutually exclusive branches are expressed.
//!
//! The department store server runs every multi-step mutation (registration,
//! sign-in, cart replacement, review aggregation, order placement) as one of
//! these pipelines, registered in a [`FlowRegistry`] keyed by context type.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context::Handler;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{skip_when, SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::FlowRegistry;
