// order_service/src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::str::FromStr;

use super::order_item::OrderItemView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, SqlxType)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct OrderId(pub i64);

impl std::fmt::Display for OrderId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Account identifier issued by the accounts service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

// Matches the `order_status` enum created by the migrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Processing,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 4] = [
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Processing => "processing",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }

  /// No transition leaves a terminal status.
  pub fn is_terminal(&self) -> bool {
    matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
  }
}

impl std::fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    OrderStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == s)
      .ok_or_else(|| format!("unrecognized order status '{}'", s))
  }
}

/// Contact fields required on every order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
  pub phone: String,
  pub email: String,
  pub address: String,
}

/// Header row about to be inserted. Status is always `pending` at insert.
#[derive(Debug, Clone)]
pub struct NewOrderHeader {
  pub user_id: Option<UserId>,
  pub contact: ContactDetails,
  pub total: Decimal,
  pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OrderHeaderRow {
  pub id: OrderId,
  pub user_id: Option<UserId>,
  pub phone: String,
  pub email: String,
  pub address: String,
  pub total: Decimal,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
}

/// What a successful placement hands back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
  pub id: OrderId,
  pub total: Decimal,
  pub created_at: DateTime<Utc>,
}

/// An order with its line items, as returned by the read endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderAggregate {
  pub id: OrderId,
  pub phone: String,
  pub email: String,
  pub address: String,
  pub total: Decimal,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
  pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusChange {
  pub id: OrderId,
  pub status: OrderStatus,
}
