// order_service/src/models/mod.rs

//! Row and response shapes for orders, line items and catalog products.

pub mod order;
pub mod order_item;
pub mod product;

pub use order::{
  ContactDetails, NewOrderHeader, OrderAggregate, OrderHeaderRow, OrderId, OrderReceipt, OrderStatus, StatusChange,
  UserId,
};
pub use order_item::{LineItemRequest, OrderItemRow, OrderItemView, PricedLine};
pub use product::{ProductId, ProductSummary};
