// order_service/src/services/mod.rs

//! Order domain logic, independent of HTTP and of the pipeline wiring.

pub mod auth_service;
pub mod order_placement;
pub mod order_reader;
pub mod pricing;
pub mod status_machine;
pub mod totals;
