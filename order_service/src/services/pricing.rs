// order_service/src/services/pricing.rs

//! Price snapshot resolution: turns requested line items into lines priced
//! at the catalog's current unit price.

use crate::errors::AppError;
use crate::models::{LineItemRequest, PricedLine, ProductId};
use crate::store::CatalogReader;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, instrument, warn};

/// Unit price per distinct product, read once for a placement.
pub type PriceSnapshot = HashMap<ProductId, Decimal>;

/// Shape checks that need no catalog access.
pub fn validate_line_items(items: &[LineItemRequest]) -> Result<(), AppError> {
  if items.is_empty() {
    return Err(AppError::Validation(
      "Invalid order data: items must be a non-empty array".to_string(),
    ));
  }
  if let Some(bad) = items.iter().find(|item| item.quantity <= 0) {
    return Err(AppError::Validation(format!(
      "Invalid order data: quantity for product {} must be a positive integer",
      bad.product_id
    )));
  }
  Ok(())
}

/// Reads the current price of every distinct product in `items` with one
/// catalog call. Fails if any product is missing from the catalog. Line
/// shape is checked by `validate_line_items` beforehand.
#[instrument(name = "pricing::resolve_price_snapshot", skip_all, fields(lines = items.len()))]
pub async fn resolve_price_snapshot<C>(catalog: &mut C, items: &[LineItemRequest]) -> Result<PriceSnapshot, AppError>
where
  C: CatalogReader + ?Sized,
{
  let requested: BTreeSet<ProductId> = items.iter().map(|item| item.product_id).collect();
  let ids: Vec<ProductId> = requested.iter().copied().collect();
  let prices = catalog.unit_prices(&ids).await.map_err(AppError::Transaction)?;

  if prices.len() != requested.len() {
    let missing: Vec<String> = requested
      .iter()
      .filter(|id| !prices.contains_key(*id))
      .map(ToString::to_string)
      .collect();
    warn!(missing = ?missing, "Order references products missing from the catalog.");
    return Err(AppError::Validation(format!(
      "Invalid order data: unknown product id(s): {}",
      missing.join(", ")
    )));
  }

  debug!(products = prices.len(), "Resolved price snapshot.");
  Ok(prices)
}

/// Pairs each requested line with its snapshot price, keeping request order.
pub fn price_lines(items: &[LineItemRequest], snapshot: &PriceSnapshot) -> Result<Vec<PricedLine>, AppError> {
  items
    .iter()
    .map(|item| {
      let price = snapshot.get(&item.product_id).copied().ok_or_else(|| {
        AppError::Validation(format!(
          "Invalid order data: unknown product id(s): {}",
          item.product_id
        ))
      })?;
      Ok(PricedLine {
        product_id: item.product_id,
        quantity: item.quantity,
        price_at_purchase: price,
      })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::StoreError;
  use async_trait::async_trait;

  fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
  }

  struct FixedCatalog {
    prices: HashMap<ProductId, Decimal>,
    calls: usize,
  }

  #[async_trait]
  impl CatalogReader for FixedCatalog {
    async fn unit_prices(&mut self, ids: &[ProductId]) -> Result<HashMap<ProductId, Decimal>, StoreError> {
      self.calls += 1;
      Ok(
        ids
          .iter()
          .filter_map(|id| self.prices.get(id).map(|p| (*id, *p)))
          .collect(),
      )
    }
  }

  fn catalog() -> FixedCatalog {
    FixedCatalog {
      prices: HashMap::from([(ProductId(1), dec("9.99")), (ProductId(2), dec("4.50"))]),
      calls: 0,
    }
  }

  fn line(product_id: i64, quantity: i32) -> LineItemRequest {
    LineItemRequest {
      product_id: ProductId(product_id),
      quantity,
    }
  }

  #[test]
  fn empty_items_are_rejected() {
    assert!(matches!(validate_line_items(&[]), Err(AppError::Validation(_))));
  }

  #[test]
  fn non_positive_quantity_is_rejected() {
    let err = validate_line_items(&[line(1, 1), line(2, 0)]).unwrap_err();
    match err {
      AppError::Validation(msg) => assert!(msg.contains("product 2")),
      other => panic!("unexpected error: {other:?}"),
    }
    assert!(validate_line_items(&[line(1, -3)]).is_err());
  }

  #[tokio::test]
  async fn duplicate_products_resolve_with_one_read() {
    let mut catalog = catalog();
    let snapshot = resolve_price_snapshot(&mut catalog, &[line(1, 2), line(1, 1), line(2, 1)])
      .await
      .unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[&ProductId(1)], dec("9.99"));
    assert_eq!(catalog.calls, 1);
  }

  #[tokio::test]
  async fn missing_product_is_named_in_the_error() {
    let mut catalog = catalog();
    let err = resolve_price_snapshot(&mut catalog, &[line(1, 1), line(42, 1)])
      .await
      .unwrap_err();
    match err {
      AppError::Validation(msg) => assert!(msg.ends_with("42"), "{msg}"),
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[tokio::test]
  async fn resolver_only_checks_catalog_existence() {
    let mut catalog = catalog();
    let snapshot = resolve_price_snapshot(&mut catalog, &[line(2, 0)]).await.unwrap();
    assert_eq!(snapshot[&ProductId(2)], dec("4.50"));
    assert_eq!(catalog.calls, 1);
  }

  #[test]
  fn priced_lines_keep_request_order() {
    let snapshot = PriceSnapshot::from([(ProductId(1), dec("9.99")), (ProductId(2), dec("4.50"))]);
    let lines = price_lines(&[line(2, 3), line(1, 1)], &snapshot).unwrap();
    assert_eq!(lines[0].product_id, ProductId(2));
    assert_eq!(lines[0].price_at_purchase, dec("4.50"));
    assert_eq!(lines[1].quantity, 1);
  }
}
