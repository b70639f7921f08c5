// order_service/src/services/totals.rs

use crate::errors::AppError;
use crate::models::PricedLine;
use rust_decimal::Decimal;

/// Sum of `quantity × price_at_purchase` over `lines`, in exact decimal.
pub fn compute_order_total(lines: &[PricedLine]) -> Result<Decimal, AppError> {
  lines.iter().try_fold(Decimal::ZERO, |total, line| {
    if line.quantity <= 0 {
      return Err(AppError::Validation(format!(
        "Invalid order data: quantity for product {} must be a positive integer",
        line.product_id
      )));
    }
    let line_value = line
      .price_at_purchase
      .checked_mul(Decimal::from(line.quantity))
      .ok_or_else(|| overflow(line))?;
    if line_value.is_sign_negative() && !line_value.is_zero() {
      return Err(AppError::Validation(format!(
        "Invalid order data: product {} has a negative price",
        line.product_id
      )));
    }
    total.checked_add(line_value).ok_or_else(|| overflow(line))
  })
}

fn overflow(line: &PricedLine) -> AppError {
  AppError::Validation(format!(
    "Invalid order data: order total overflows at product {}",
    line.product_id
  ))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::ProductId;

  fn priced(product_id: i64, quantity: i32, price: &str) -> PricedLine {
    PricedLine {
      product_id: ProductId(product_id),
      quantity,
      price_at_purchase: price.parse().unwrap(),
    }
  }

  #[test]
  fn two_units_at_nine_ninety_nine() {
    let total = compute_order_total(&[priced(1, 2, "9.99")]).unwrap();
    assert_eq!(total.to_string(), "19.98");
  }

  #[test]
  fn decimal_sum_has_no_float_drift() {
    // 0.1 + 0.2 in binary floating point is 0.30000000000000004.
    let total = compute_order_total(&[priced(1, 1, "0.10"), priced(2, 1, "0.20")]).unwrap();
    assert_eq!(total, "0.30".parse::<Decimal>().unwrap());
  }

  #[test]
  fn free_items_are_allowed() {
    let total = compute_order_total(&[priced(1, 3, "0"), priced(2, 1, "5.00")]).unwrap();
    assert_eq!(total, "5.00".parse::<Decimal>().unwrap());
  }

  #[test]
  fn negative_price_is_rejected() {
    let err = compute_order_total(&[priced(7, 1, "-1.00")]).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
  }

  #[test]
  fn zero_quantity_is_rejected() {
    assert!(compute_order_total(&[priced(1, 0, "9.99")]).is_err());
  }

  #[test]
  fn overflow_is_an_error_not_a_panic() {
    let err = compute_order_total(&[priced(1, i32::MAX, &Decimal::MAX.to_string())]).unwrap_err();
    assert!(matches!(err, AppError::Validation(msg) if msg.contains("overflows")));
  }
}
