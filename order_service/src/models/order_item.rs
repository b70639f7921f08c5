// order_service/src/models/order_item.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::order::OrderId;
use super::product::{ProductId, ProductSummary};

/// One `{productId, quantity}` entry of a placement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
  pub product_id: ProductId,
  pub quantity: i32,
}

/// A requested line with its unit price frozen at placement time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
  pub product_id: ProductId,
  pub quantity: i32,
  pub price_at_purchase: Decimal,
}

/// A stored line item joined with the live product display fields.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OrderItemRow {
  pub order_id: OrderId,
  pub product_id: ProductId,
  pub quantity: i32,
  pub price_at_purchase: Decimal,
  pub product_name: String,
  pub product_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
  pub product_id: ProductId,
  pub quantity: i32,
  pub price_at_purchase: Decimal,
  pub product: ProductSummary,
}

impl From<OrderItemRow> for OrderItemView {
  fn from(row: OrderItemRow) -> Self {
    Self {
      product_id: row.product_id,
      quantity: row.quantity,
      price_at_purchase: row.price_at_purchase,
      product: ProductSummary {
        name: row.product_name,
        image: row.product_image,
      },
    }
  }
}
