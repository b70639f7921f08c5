// order_service/src/services/order_reader.rs

//! Read side: orders with their line items and live product summaries.

use crate::errors::AppError;
use crate::models::{OrderAggregate, OrderHeaderRow, OrderId, OrderItemRow, OrderItemView, UserId};
use crate::store::{HeaderFilter, OrderStore};
use std::collections::HashMap;
use tracing::{debug, instrument};

#[instrument(name = "order_reader::get_order", skip(store))]
pub async fn get_order(store: &dyn OrderStore, order_id: OrderId) -> Result<OrderAggregate, AppError> {
  let headers = store.fetch_order_headers(HeaderFilter::ById(order_id)).await?;
  if headers.is_empty() {
    return Err(AppError::NotFound("Order not found".to_string()));
  }
  let items = store.fetch_order_items(&[order_id]).await?;
  assemble_aggregates(headers, items)
    .into_iter()
    .next()
    .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

/// Orders owned by `owner`, newest first. Without an owner there is nothing
/// to list: guest orders belong to nobody.
#[instrument(name = "order_reader::list_orders", skip(store))]
pub async fn list_orders(store: &dyn OrderStore, owner: Option<UserId>) -> Result<Vec<OrderAggregate>, AppError> {
  let Some(user_id) = owner else {
    debug!("Anonymous caller; returning an empty order list.");
    return Ok(Vec::new());
  };
  let headers = store.fetch_order_headers(HeaderFilter::ByOwner(user_id)).await?;
  if headers.is_empty() {
    return Ok(Vec::new());
  }
  let ids: Vec<OrderId> = headers.iter().map(|h| h.id).collect();
  let items = store.fetch_order_items(&ids).await?;
  Ok(assemble_aggregates(headers, items))
}

/// Attaches items to their headers. Header order is kept, as is the order of
/// items within each header.
pub fn assemble_aggregates(headers: Vec<OrderHeaderRow>, items: Vec<OrderItemRow>) -> Vec<OrderAggregate> {
  let mut by_order: HashMap<OrderId, Vec<OrderItemView>> = HashMap::new();
  for item in items {
    by_order.entry(item.order_id).or_default().push(item.into());
  }

  headers
    .into_iter()
    .map(|h| OrderAggregate {
      items: by_order.remove(&h.id).unwrap_or_default(),
      id: h.id,
      phone: h.phone,
      email: h.email,
      address: h.address,
      total: h.total,
      status: h.status,
      created_at: h.created_at,
    })
    .collect()
}
