// order_service/src/store/mod.rs

//! Storage seams for orders.
//!
//! `OrderStore` hands out read queries and opens `OrderTx` units of work. An
//! `OrderTx` that is dropped without `commit` discards every write it made.

pub mod memory;
pub mod postgres;

use crate::models::{
  NewOrderHeader, OrderHeaderRow, OrderId, OrderItemRow, OrderReceipt, OrderStatus, PricedLine, ProductId, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;

pub use memory::MemoryOrderStore;
pub use postgres::PgOrderStore;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Store unavailable: {0}")]
  Unavailable(String),
}

/// Which order headers a read should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFilter {
  ById(OrderId),
  ByOwner(UserId),
}

/// Read access to current catalog prices.
#[async_trait]
pub trait CatalogReader: Send {
  /// Current unit price of every id in `ids` that exists. Missing ids are
  /// simply absent from the map.
  async fn unit_prices(&mut self, ids: &[ProductId]) -> Result<HashMap<ProductId, Decimal>, StoreError>;
}

/// One open unit of work.
#[async_trait]
pub trait OrderTx: CatalogReader {
  /// Inserts a `pending` header. Returns `None` when the owner already used
  /// the header's idempotency key; nothing is written in that case.
  async fn insert_order_header(
    &mut self,
    header: &NewOrderHeader,
  ) -> Result<Option<(OrderId, DateTime<Utc>)>, StoreError>;

  async fn insert_order_items(&mut self, order_id: OrderId, lines: &[PricedLine]) -> Result<(), StoreError>;

  /// Current status of `order_id`, locked until the unit of work ends.
  async fn lock_order_status(&mut self, order_id: OrderId) -> Result<Option<OrderStatus>, StoreError>;

  async fn set_order_status(&mut self, order_id: OrderId, status: OrderStatus) -> Result<(), StoreError>;

  async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn begin(&self) -> Result<Box<dyn OrderTx>, StoreError>;

  /// Receipt of the order `owner` placed under `key`. Keys are scoped per
  /// owner; anonymous orders share one scope.
  async fn find_receipt_by_idempotency_key(
    &self,
    owner: Option<UserId>,
    key: &str,
  ) -> Result<Option<OrderReceipt>, StoreError>;

  /// Headers matching `filter`, newest first.
  async fn fetch_order_headers(&self, filter: HeaderFilter) -> Result<Vec<OrderHeaderRow>, StoreError>;

  /// Items of all `order_ids`, grouped by order and in insertion order.
  async fn fetch_order_items(&self, order_ids: &[OrderId]) -> Result<Vec<OrderItemRow>, StoreError>;
}
