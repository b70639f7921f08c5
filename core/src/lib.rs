// orka/src/lib.rs

//! Orka: a small async, type-safe step pipeline engine.
//!
//! A pipeline is an ordered list of named steps. Each step may carry
//! `before`, `on` and `after` handlers that share one lockable context
//! (`ContextData<T>`) and decide whether execution continues or stops.
//! Steps can be optional or skipped by a condition evaluated at run time.
//!
//! The `Orka` registry keys pipelines by their context data type, so a caller
//! only needs to build a context and hand it to `Orka::run`.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context::Handler;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::OrkaError;

pub use crate::registry::Orka;
