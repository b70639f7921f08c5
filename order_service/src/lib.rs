// order_service/src/lib.rs

//! Order placement and fulfillment service for the pet-care shop.
//!
//! Orders are placed through an Orka pipeline that validates the request,
//! replays repeated idempotency keys, and writes the order header and its
//! line items in a single unit of work.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;
