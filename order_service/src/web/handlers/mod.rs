// order_service/src/web/handlers/mod.rs

pub mod extractors;
pub mod order_handlers;
