// order_service/src/models/product.rs

use serde::{Deserialize, Serialize};

/// Identifier of a product in the external catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct ProductId(pub i64);

impl std::fmt::Display for ProductId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Display fields of a product, read live from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
  pub name: String,
  pub image: Option<String>,
}
