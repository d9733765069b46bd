//! Quantity-based discount policy.
//!
//! Tiers, by units of one product on a single line:
//!
//! ```text
//!  1 ..  3  no discount
//!  4 ..  9  10% of quantity * unit price
//! 10 .. 20  20% of quantity * unit price
//! 21 ..     rejected
//! ```
//!
//! The policy is authoritative: whatever discount a caller sends is replaced
//! by what is computed here, on create and on update alike.

use super::{Money, SaleError};

/// Most units of one product a single sale line may carry.
pub const MAX_QUANTITY_PER_PRODUCT: u32 = 20;

/// Lowest quantity that earns the bulk discount.
pub const BULK_DISCOUNT_MIN_QUANTITY: u32 = 10;

/// Bulk discount, in percent of the gross line amount.
pub const BULK_DISCOUNT_PERCENT: i64 = 20;

/// Lowest quantity that earns the volume discount.
pub const VOLUME_DISCOUNT_MIN_QUANTITY: u32 = 4;

/// Volume discount, in percent of the gross line amount.
pub const VOLUME_DISCOUNT_PERCENT: i64 = 10;

/// Discount and total computed for one sale line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePricing {
    /// Gross amount before discount (`quantity * unit_price`).
    pub gross: Money,
    /// Discount granted by the policy.
    pub discount: Money,
    /// `gross - discount`.
    pub total: Money,
}

/// Stateless discount policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscountPolicy;

impl DiscountPolicy {
    /// Returns the discount percentage applicable to `quantity`.
    ///
    /// Quantities above [`MAX_QUANTITY_PER_PRODUCT`] have no tier; callers must
    /// go through [`DiscountPolicy::price_line`] which rejects them.
    pub fn discount_percent(quantity: u32) -> i64 {
        if quantity >= BULK_DISCOUNT_MIN_QUANTITY {
            BULK_DISCOUNT_PERCENT
        } else if quantity >= VOLUME_DISCOUNT_MIN_QUANTITY {
            VOLUME_DISCOUNT_PERCENT
        } else {
            0
        }
    }

    /// Computes the discount for `quantity` units at `unit_price`.
    pub fn discount(
        product_name: &str,
        quantity: u32,
        unit_price: Money,
    ) -> Result<Money, SaleError> {
        Ok(Self::price_line(product_name, quantity, unit_price)?.discount)
    }

    /// Validates a line and computes its discount and total.
    ///
    /// Fails with [`SaleError::QuantityLimitExceeded`] above the per-product
    /// limit, and rejects zero quantities and negative prices.
    pub fn price_line(
        product_name: &str,
        quantity: u32,
        unit_price: Money,
    ) -> Result<LinePricing, SaleError> {
        if quantity == 0 {
            return Err(SaleError::InvalidQuantity {
                product_name: product_name.to_string(),
                quantity,
            });
        }

        if quantity > MAX_QUANTITY_PER_PRODUCT {
            return Err(SaleError::QuantityLimitExceeded {
                product_name: product_name.to_string(),
                quantity,
                limit: MAX_QUANTITY_PER_PRODUCT,
            });
        }

        if unit_price.is_negative() {
            return Err(SaleError::InvalidPrice {
                product_name: product_name.to_string(),
                price: unit_price.cents(),
            });
        }

        let gross = unit_price.checked_multiply(quantity).ok_or_else(|| {
            SaleError::AmountOutOfRange {
                product_name: product_name.to_string(),
            }
        })?;
        let discount = gross.percentage(Self::discount_percent(quantity));

        Ok(LinePricing {
            gross,
            discount,
            total: gross - discount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(quantity: u32, dollars: i64) -> LinePricing {
        DiscountPolicy::price_line("Widget", quantity, Money::from_dollars(dollars)).unwrap()
    }

    #[test]
    fn test_no_discount_below_four_units() {
        for quantity in 1..VOLUME_DISCOUNT_MIN_QUANTITY {
            let line = price(quantity, 100);
            assert!(line.discount.is_zero());
            assert_eq!(line.total, line.gross);
        }
    }

    #[test]
    fn test_ten_percent_from_four_to_nine_units() {
        let line = price(5, 100);
        assert_eq!(line.discount, Money::from_dollars(50));
        assert_eq!(line.total, Money::from_dollars(450));

        let line = price(4, 10);
        assert_eq!(line.discount, Money::from_dollars(4));

        let line = price(9, 10);
        assert_eq!(line.discount, Money::from_cents(900));
    }

    #[test]
    fn test_twenty_percent_from_ten_to_twenty_units() {
        let line = price(15, 50);
        assert_eq!(line.discount, Money::from_dollars(150));
        assert_eq!(line.total, Money::from_dollars(600));

        let line = price(10, 10);
        assert_eq!(line.discount, Money::from_dollars(20));

        let line = price(20, 10);
        assert_eq!(line.discount, Money::from_dollars(40));
        assert_eq!(line.total, Money::from_dollars(160));
    }

    #[test]
    fn test_more_than_twenty_units_rejected() {
        let result = DiscountPolicy::price_line("Crate of Beer", 21, Money::from_dollars(10));
        match result {
            Err(SaleError::QuantityLimitExceeded {
                product_name,
                quantity,
                limit,
            }) => {
                assert_eq!(product_name, "Crate of Beer");
                assert_eq!(quantity, 21);
                assert_eq!(limit, MAX_QUANTITY_PER_PRODUCT);
            }
            other => panic!("Expected QuantityLimitExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let result = DiscountPolicy::price_line("Widget", 0, Money::from_dollars(10));
        assert!(matches!(result, Err(SaleError::InvalidQuantity { .. })));
    }

    #[test]
    fn test_negative_price_rejected() {
        let result = DiscountPolicy::price_line("Widget", 1, Money::from_cents(-1));
        assert!(matches!(result, Err(SaleError::InvalidPrice { .. })));
    }

    #[test]
    fn test_overflowing_gross_rejected() {
        let result = DiscountPolicy::price_line("Widget", 20, Money::from_cents(i64::MAX / 10));
        assert_eq!(
            result,
            Err(SaleError::AmountOutOfRange {
                product_name: "Widget".to_string()
            })
        );
    }

    #[test]
    fn test_largest_representable_gross_stays_positive() {
        let line = DiscountPolicy::price_line("Widget", 10, Money::from_cents(i64::MAX / 10))
            .unwrap();
        assert!(!line.total.is_negative());
        assert_eq!(line.total + line.discount, line.gross);
    }

    #[test]
    fn test_free_items_are_allowed() {
        let line = price(12, 0);
        assert!(line.total.is_zero());
    }

    #[test]
    fn test_fractional_discount_rounds_to_cents() {
        // 4 * $0.99 = 396 cents, 10% = 39.6 -> 40
        let line = DiscountPolicy::price_line("Gum", 4, Money::from_cents(99)).unwrap();
        assert_eq!(line.discount.cents(), 40);
        assert_eq!(line.total.cents(), 356);
    }

    #[test]
    fn test_total_never_negative_over_valid_domain() {
        for quantity in 1..=MAX_QUANTITY_PER_PRODUCT {
            for cents in [0, 1, 5, 99, 1_000, 123_456] {
                let line =
                    DiscountPolicy::price_line("Widget", quantity, Money::from_cents(cents))
                        .unwrap();
                assert!(!line.total.is_negative());
                assert_eq!(line.gross - line.discount, line.total);
            }
        }
    }

    #[test]
    fn test_discount_matches_price_line() {
        let discount = DiscountPolicy::discount("Widget", 5, Money::from_dollars(100)).unwrap();
        assert_eq!(discount, Money::from_dollars(50));
    }
}
