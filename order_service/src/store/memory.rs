// order_service/src/store/memory.rs

//! In-process `OrderStore` for tests and local runs without Postgres.
//!
//! A `MemoryOrderTx` stages its writes and applies them only on `commit`;
//! dropping it discards them. There are no row locks: status changes on the
//! same order are last-commit-wins.

use super::{CatalogReader, HeaderFilter, OrderStore, OrderTx, StoreError};
use crate::models::{
  NewOrderHeader, OrderHeaderRow, OrderId, OrderItemRow, OrderReceipt, OrderStatus, PricedLine, ProductId, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct ProductRecord {
  name: String,
  image: Option<String>,
  price: Decimal,
}

#[derive(Debug, Clone)]
struct StoredOrder {
  row: OrderHeaderRow,
  idempotency_key: Option<String>,
}

impl StoredOrder {
  fn holds_key(&self, owner: Option<UserId>, key: &str) -> bool {
    self.row.user_id == owner && self.idempotency_key.as_deref() == Some(key)
  }
}

#[derive(Debug, Clone)]
struct StoredItem {
  id: i64,
  order_id: OrderId,
  line: PricedLine,
}

#[derive(Debug, Default)]
struct MemoryState {
  products: HashMap<ProductId, ProductRecord>,
  orders: Vec<StoredOrder>,
  items: Vec<StoredItem>,
  next_order_id: i64,
  next_item_id: i64,
  open_transactions: usize,
  fail_item_inserts: bool,
}

#[derive(Clone, Default)]
pub struct MemoryOrderStore {
  state: Arc<Mutex<MemoryState>>,
}

impl MemoryOrderStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds (or replaces) a catalog product.
  pub fn with_product(self, id: i64, name: &str, price: Decimal, image: Option<&str>) -> Self {
    self.state.lock().products.insert(
      ProductId(id),
      ProductRecord {
        name: name.to_string(),
        image: image.map(str::to_string),
        price,
      },
    );
    self
  }

  /// Changes a product's current price. Returns false if the product is unknown.
  pub fn set_product_price(&self, id: i64, price: Decimal) -> bool {
    match self.state.lock().products.get_mut(&ProductId(id)) {
      Some(product) => {
        product.price = price;
        true
      }
      None => false,
    }
  }

  /// Makes every subsequent `insert_order_items` fail.
  pub fn fail_item_inserts(&self, fail: bool) {
    self.state.lock().fail_item_inserts = fail;
  }

  pub fn order_count(&self) -> usize {
    self.state.lock().orders.len()
  }

  pub fn item_count(&self) -> usize {
    self.state.lock().items.len()
  }

  /// Units of work begun and not yet dropped.
  pub fn open_transactions(&self) -> usize {
    self.state.lock().open_transactions
  }
}

#[derive(Debug)]
enum StagedWrite {
  Header(StoredOrder),
  Items(Vec<StoredItem>),
  Status(OrderId, OrderStatus),
}

pub struct MemoryOrderTx {
  state: Arc<Mutex<MemoryState>>,
  staged: Vec<StagedWrite>,
}

impl MemoryOrderTx {
  fn staged_status(&self, order_id: OrderId) -> Option<OrderStatus> {
    self.staged.iter().rev().find_map(|write| match write {
      StagedWrite::Status(id, status) if *id == order_id => Some(*status),
      StagedWrite::Header(order) if order.row.id == order_id => Some(order.row.status),
      _ => None,
    })
  }
}

impl Drop for MemoryOrderTx {
  fn drop(&mut self) {
    let mut state = self.state.lock();
    state.open_transactions = state.open_transactions.saturating_sub(1);
  }
}

#[async_trait]
impl CatalogReader for MemoryOrderTx {
  async fn unit_prices(&mut self, ids: &[ProductId]) -> Result<HashMap<ProductId, Decimal>, StoreError> {
    let state = self.state.lock();
    Ok(
      ids
        .iter()
        .filter_map(|id| state.products.get(id).map(|p| (*id, p.price)))
        .collect(),
    )
  }
}

#[async_trait]
impl OrderTx for MemoryOrderTx {
  async fn insert_order_header(
    &mut self,
    header: &NewOrderHeader,
  ) -> Result<Option<(OrderId, DateTime<Utc>)>, StoreError> {
    let mut state = self.state.lock();
    if let Some(key) = header.idempotency_key.as_deref() {
      if state.orders.iter().any(|o| o.holds_key(header.user_id, key)) {
        return Ok(None);
      }
    }
    // Ids are consumed even if the unit of work later rolls back, like a sequence.
    state.next_order_id += 1;
    let id = OrderId(state.next_order_id);
    let created_at = Utc::now();
    drop(state);

    self.staged.push(StagedWrite::Header(StoredOrder {
      row: OrderHeaderRow {
        id,
        user_id: header.user_id,
        phone: header.contact.phone.clone(),
        email: header.contact.email.clone(),
        address: header.contact.address.clone(),
        total: header.total,
        status: OrderStatus::Pending,
        created_at,
      },
      idempotency_key: header.idempotency_key.clone(),
    }));
    Ok(Some((id, created_at)))
  }

  async fn insert_order_items(&mut self, order_id: OrderId, lines: &[PricedLine]) -> Result<(), StoreError> {
    let mut state = self.state.lock();
    if state.fail_item_inserts {
      return Err(StoreError::Unavailable("injected order_items failure".to_string()));
    }
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
      state.next_item_id += 1;
      items.push(StoredItem {
        id: state.next_item_id,
        order_id,
        line: *line,
      });
    }
    drop(state);
    self.staged.push(StagedWrite::Items(items));
    Ok(())
  }

  async fn lock_order_status(&mut self, order_id: OrderId) -> Result<Option<OrderStatus>, StoreError> {
    if let Some(status) = self.staged_status(order_id) {
      return Ok(Some(status));
    }
    let state = self.state.lock();
    Ok(state.orders.iter().find(|o| o.row.id == order_id).map(|o| o.row.status))
  }

  async fn set_order_status(&mut self, order_id: OrderId, status: OrderStatus) -> Result<(), StoreError> {
    self.staged.push(StagedWrite::Status(order_id, status));
    Ok(())
  }

  async fn commit(self: Box<Self>) -> Result<(), StoreError> {
    let mut this = self;
    let staged = std::mem::take(&mut this.staged);
    let mut state = this.state.lock();

    // A key committed by another unit of work since our insert wins.
    for write in &staged {
      if let StagedWrite::Header(order) = write {
        if let Some(key) = order.idempotency_key.as_deref() {
          if state.orders.iter().any(|o| o.holds_key(order.row.user_id, key)) {
            return Err(StoreError::Unavailable(
              "duplicate key value violates unique constraint on idempotency_key".to_string(),
            ));
          }
        }
      }
    }

    for write in staged {
      match write {
        StagedWrite::Header(order) => state.orders.push(order),
        StagedWrite::Items(items) => state.items.extend(items),
        StagedWrite::Status(order_id, status) => {
          if let Some(order) = state.orders.iter_mut().find(|o| o.row.id == order_id) {
            order.row.status = status;
          }
        }
      }
    }
    Ok(())
  }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
  async fn begin(&self) -> Result<Box<dyn OrderTx>, StoreError> {
    self.state.lock().open_transactions += 1;
    Ok(Box::new(MemoryOrderTx {
      state: Arc::clone(&self.state),
      staged: Vec::new(),
    }))
  }

  async fn find_receipt_by_idempotency_key(
    &self,
    owner: Option<UserId>,
    key: &str,
  ) -> Result<Option<OrderReceipt>, StoreError> {
    let state = self.state.lock();
    Ok(
      state
        .orders
        .iter()
        .find(|o| o.holds_key(owner, key))
        .map(|o| OrderReceipt {
          id: o.row.id,
          total: o.row.total,
          created_at: o.row.created_at,
        }),
    )
  }

  async fn fetch_order_headers(&self, filter: HeaderFilter) -> Result<Vec<OrderHeaderRow>, StoreError> {
    let state = self.state.lock();
    let mut rows: Vec<OrderHeaderRow> = state
      .orders
      .iter()
      .filter(|o| match filter {
        HeaderFilter::ById(id) => o.row.id == id,
        HeaderFilter::ByOwner(user_id) => o.row.user_id == Some(user_id),
      })
      .map(|o| o.row.clone())
      .collect();
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Ok(rows)
  }

  async fn fetch_order_items(&self, order_ids: &[OrderId]) -> Result<Vec<OrderItemRow>, StoreError> {
    let state = self.state.lock();
    let mut matching: Vec<&StoredItem> = state.items.iter().filter(|i| order_ids.contains(&i.order_id)).collect();
    matching.sort_by_key(|i| (i.order_id, i.id));
    Ok(
      matching
        .into_iter()
        .filter_map(|item| {
          state.products.get(&item.line.product_id).map(|product| OrderItemRow {
            order_id: item.order_id,
            product_id: item.line.product_id,
            quantity: item.line.quantity,
            price_at_purchase: item.line.price_at_purchase,
            product_name: product.name.clone(),
            product_image: product.image.clone(),
          })
        })
        .collect(),
    )
  }
}
