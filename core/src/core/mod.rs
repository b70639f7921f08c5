// orka/src/core/mod.rs

//! Building blocks shared by pipelines and the registry.

pub mod context;
pub mod context_data;
pub mod control;
pub mod step;
