// order_service/src/store/postgres.rs

//! Postgres-backed `OrderStore`.

use super::{CatalogReader, HeaderFilter, OrderStore, OrderTx, StoreError};
use crate::models::{
  NewOrderHeader, OrderHeaderRow, OrderId, OrderItemRow, OrderReceipt, OrderStatus, PricedLine, ProductId, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use std::collections::HashMap;
use tracing::instrument;

#[derive(Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .connect(database_url)
      .await?;
    Ok(Self::new(pool))
  }

  pub async fn run_migrations(&self) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(&self.pool).await?;
    Ok(())
  }
}

/// A pooled connection inside `BEGIN`. Dropping it without `commit` rolls back.
pub struct PgOrderTx {
  tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CatalogReader for PgOrderTx {
  #[instrument(name = "pg_unit_prices", skip(self), fields(count = ids.len()))]
  async fn unit_prices(&mut self, ids: &[ProductId]) -> Result<HashMap<ProductId, Decimal>, StoreError> {
    let raw_ids: Vec<i64> = ids.iter().map(|id| id.0).collect();
    let rows: Vec<(i64, Decimal)> =
      sqlx::query_as("SELECT id::BIGINT, price::NUMERIC FROM products WHERE id = ANY($1)")
        .bind(&raw_ids)
        .fetch_all(&mut *self.tx)
        .await?;
    Ok(rows.into_iter().map(|(id, price)| (ProductId(id), price)).collect())
  }
}

#[async_trait]
impl OrderTx for PgOrderTx {
  #[instrument(name = "pg_insert_order_header", skip_all)]
  async fn insert_order_header(
    &mut self,
    header: &NewOrderHeader,
  ) -> Result<Option<(OrderId, DateTime<Utc>)>, StoreError> {
    let inserted: Option<(OrderId, DateTime<Utc>)> = sqlx::query_as(
      r#"
      INSERT INTO orders (user_id, phone, email, address, total, status, idempotency_key)
      VALUES ($1, $2, $3, $4, $5, 'pending', $6)
      ON CONFLICT (COALESCE(user_id, 0), idempotency_key) DO NOTHING
      RETURNING id, created_at
      "#,
    )
    .bind(header.user_id)
    .bind(&header.contact.phone)
    .bind(&header.contact.email)
    .bind(&header.contact.address)
    .bind(header.total)
    .bind(header.idempotency_key.as_deref())
    .fetch_optional(&mut *self.tx)
    .await?;
    Ok(inserted)
  }

  #[instrument(name = "pg_insert_order_items", skip_all, fields(%order_id, count = lines.len()))]
  async fn insert_order_items(&mut self, order_id: OrderId, lines: &[PricedLine]) -> Result<(), StoreError> {
    if lines.is_empty() {
      return Ok(());
    }
    let mut builder: QueryBuilder<Postgres> =
      QueryBuilder::new("INSERT INTO order_items (order_id, product_id, quantity, price_at_purchase) ");
    builder.push_values(lines, |mut row, line| {
      row
        .push_bind(order_id)
        .push_bind(line.product_id)
        .push_bind(line.quantity)
        .push_bind(line.price_at_purchase);
    });
    builder.build().execute(&mut *self.tx).await?;
    Ok(())
  }

  #[instrument(name = "pg_lock_order_status", skip_all, fields(%order_id))]
  async fn lock_order_status(&mut self, order_id: OrderId) -> Result<Option<OrderStatus>, StoreError> {
    let status: Option<(OrderStatus,)> = sqlx::query_as("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
      .bind(order_id)
      .fetch_optional(&mut *self.tx)
      .await?;
    Ok(status.map(|(s,)| s))
  }

  #[instrument(name = "pg_set_order_status", skip_all, fields(%order_id, %status))]
  async fn set_order_status(&mut self, order_id: OrderId, status: OrderStatus) -> Result<(), StoreError> {
    sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
      .bind(status)
      .bind(order_id)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn commit(self: Box<Self>) -> Result<(), StoreError> {
    self.tx.commit().await?;
    Ok(())
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  async fn begin(&self) -> Result<Box<dyn OrderTx>, StoreError> {
    let tx = self.pool.begin().await?;
    Ok(Box::new(PgOrderTx { tx }))
  }

  #[instrument(name = "pg_find_receipt", skip_all, fields(owner = ?owner))]
  async fn find_receipt_by_idempotency_key(
    &self,
    owner: Option<UserId>,
    key: &str,
  ) -> Result<Option<OrderReceipt>, StoreError> {
    let row: Option<(OrderId, Decimal, DateTime<Utc>)> = sqlx::query_as(
      "SELECT id, total, created_at FROM orders WHERE COALESCE(user_id, 0) = COALESCE($1, 0) AND idempotency_key = $2",
    )
    .bind(owner)
    .bind(key)
    .fetch_optional(&self.pool)
    .await?;
    Ok(row.map(|(id, total, created_at)| OrderReceipt { id, total, created_at }))
  }

  #[instrument(name = "pg_fetch_order_headers", skip(self))]
  async fn fetch_order_headers(&self, filter: HeaderFilter) -> Result<Vec<OrderHeaderRow>, StoreError> {
    const HEADER_COLUMNS: &str = "SELECT id, user_id, phone, email, address, total, status, created_at FROM orders";
    let rows = match filter {
      HeaderFilter::ById(order_id) => {
        sqlx::query_as::<_, OrderHeaderRow>(&format!("{HEADER_COLUMNS} WHERE id = $1"))
          .bind(order_id)
          .fetch_all(&self.pool)
          .await?
      }
      HeaderFilter::ByOwner(user_id) => {
        sqlx::query_as::<_, OrderHeaderRow>(&format!(
          "{HEADER_COLUMNS} WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
      }
    };
    Ok(rows)
  }

  #[instrument(name = "pg_fetch_order_items", skip_all, fields(orders = order_ids.len()))]
  async fn fetch_order_items(&self, order_ids: &[OrderId]) -> Result<Vec<OrderItemRow>, StoreError> {
    if order_ids.is_empty() {
      return Ok(Vec::new());
    }
    let raw_ids: Vec<i64> = order_ids.iter().map(|id| id.0).collect();
    let rows: Vec<OrderItemRow> = sqlx::query_as(
      r#"
      SELECT oi.order_id, oi.product_id, oi.quantity, oi.price_at_purchase,
             p.name AS product_name, p.image AS product_image
      FROM order_items oi
      JOIN products p ON p.id = oi.product_id
      WHERE oi.order_id = ANY($1)
      ORDER BY oi.order_id, oi.id
      "#,
    )
    .bind(&raw_ids)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows)
  }
}
