//! Sale aggregate and related types.

mod aggregate;
mod commands;
mod discount;
mod events;
mod value_objects;

pub use aggregate::{Sale, SaleItem, SaleParts};
pub use commands::{CreateSale, SaleItemInput, UpdateSale};
pub use discount::{
    BULK_DISCOUNT_MIN_QUANTITY, BULK_DISCOUNT_PERCENT, DiscountPolicy, LinePricing,
    MAX_QUANTITY_PER_PRODUCT, VOLUME_DISCOUNT_MIN_QUANTITY, VOLUME_DISCOUNT_PERCENT,
};
pub use events::{
    ItemCancelledData, SaleCancelledData, SaleCreatedData, SaleEvent, SaleModifiedData,
};
pub use value_objects::{BranchRef, CustomerRef, Money};

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur while building or changing a sale.
///
/// All of them are raised before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleError {
    /// A required header field is blank.
    #[error("Invalid sale header: {field} is required")]
    InvalidHeader { field: &'static str },

    /// A line exceeds the per-product quantity limit.
    #[error(
        "Cannot purchase more than {limit} identical items for product {product_name} (requested {quantity})"
    )]
    QuantityLimitExceeded {
        product_name: String,
        quantity: u32,
        limit: u32,
    },

    /// A line has a non-positive quantity.
    #[error("Invalid quantity {quantity} for product {product_name} (must be greater than 0)")]
    InvalidQuantity { product_name: String, quantity: u32 },

    /// A line has a negative unit price.
    #[error("Invalid unit price {price} for product {product_name} (must not be negative)")]
    InvalidPrice { product_name: String, price: i64 },

    /// A line or sale amount does not fit in the money range.
    #[error("Amount out of range for product {product_name}")]
    AmountOutOfRange { product_name: String },

    /// A date range whose start lies after its end.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}
