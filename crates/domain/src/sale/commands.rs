//! Sale commands.

use chrono::{DateTime, Utc};
use common::{ProductId, SaleId};
use serde::{Deserialize, Serialize};

use super::{BranchRef, CustomerRef, Money};

/// A requested sale line.
///
/// `discount` is accepted for wire compatibility only. The discount policy
/// recomputes it and the submitted value is never used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItemInput {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    #[serde(default)]
    pub discount: Money,
}

impl SaleItemInput {
    /// Creates a line request with no caller-supplied discount.
    pub fn new(
        product_id: ProductId,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            product_id,
            product_name: product_name.into(),
            quantity,
            unit_price,
            discount: Money::zero(),
        }
    }

    /// Sets the caller-supplied discount (which the policy will override).
    pub fn with_discount(mut self, discount: Money) -> Self {
        self.discount = discount;
        self
    }
}

/// Command to create a new sale.
#[derive(Debug, Clone)]
pub struct CreateSale {
    /// Human-facing unique sale number.
    pub sale_number: String,

    /// When the sale was made.
    pub sale_date: DateTime<Utc>,

    pub customer: CustomerRef,

    pub branch: BranchRef,

    /// Lines to price and attach, in order.
    pub items: Vec<SaleItemInput>,
}

impl CreateSale {
    /// Creates a new CreateSale command without items.
    pub fn new(
        sale_number: impl Into<String>,
        sale_date: DateTime<Utc>,
        customer: CustomerRef,
        branch: BranchRef,
    ) -> Self {
        Self {
            sale_number: sale_number.into(),
            sale_date,
            customer,
            branch,
            items: Vec::new(),
        }
    }

    /// Appends a line.
    pub fn with_item(mut self, item: SaleItemInput) -> Self {
        self.items.push(item);
        self
    }
}

/// Command to update an existing sale.
///
/// An empty `items` list means "leave the lines as they are", not "remove
/// every line". There is currently no way to clear all lines of a sale.
#[derive(Debug, Clone)]
pub struct UpdateSale {
    /// Sale to update.
    pub sale_id: SaleId,

    /// Requested cancellation flag.
    pub is_cancelled: bool,

    /// Full replacement line list, or empty to keep the current lines.
    pub items: Vec<SaleItemInput>,
}

impl UpdateSale {
    /// Creates an update that only sets the cancellation flag.
    pub fn new(sale_id: SaleId, is_cancelled: bool) -> Self {
        Self {
            sale_id,
            is_cancelled,
            items: Vec::new(),
        }
    }

    /// Creates an update that cancels the sale and leaves its lines alone.
    pub fn cancel(sale_id: SaleId) -> Self {
        Self::new(sale_id, true)
    }

    /// Replaces the line list.
    pub fn with_items(mut self, items: Vec<SaleItemInput>) -> Self {
        self.items = items;
        self
    }

    /// Returns true when the update replaces the line list.
    pub fn replaces_items(&self) -> bool {
        !self.items.is_empty()
    }
}
