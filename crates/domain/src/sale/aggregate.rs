//! Sale aggregate implementation.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use common::{ProductId, SaleId, SaleItemId, Version};
use serde::{Deserialize, Serialize};

use super::{BranchRef, CustomerRef, DiscountPolicy, Money, SaleError, SaleItemInput};

/// One priced line of a sale.
///
/// Lines are only built through [`SaleItem::priced`], so `discount` and
/// `total_amount` always match the discount policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItem {
    /// Line identity, assigned when the line is built.
    pub id: SaleItemId,

    pub product_id: ProductId,

    /// Human-readable product name.
    pub product_name: String,

    pub quantity: u32,

    pub unit_price: Money,

    /// Discount granted by the policy.
    pub discount: Money,

    /// `quantity * unit_price - discount`.
    pub total_amount: Money,
}

impl SaleItem {
    /// Prices a requested line, assigning it a fresh line id.
    ///
    /// Any discount on the input is ignored.
    pub fn priced(input: &SaleItemInput) -> Result<Self, SaleError> {
        let pricing =
            DiscountPolicy::price_line(&input.product_name, input.quantity, input.unit_price)?;

        Ok(Self {
            id: SaleItemId::new(),
            product_id: input.product_id,
            product_name: input.product_name.clone(),
            quantity: input.quantity,
            unit_price: input.unit_price,
            discount: pricing.discount,
            total_amount: pricing.total,
        })
    }
}

/// Plain data used to rebuild a [`Sale`] from storage.
#[derive(Debug, Clone)]
pub struct SaleParts {
    pub id: SaleId,
    pub version: Version,
    pub sale_number: String,
    pub sale_date: DateTime<Utc>,
    pub customer: CustomerRef,
    pub branch: BranchRef,
    pub is_cancelled: bool,
    pub total_amount: Money,
    pub items: Vec<SaleItem>,
}

/// Sale aggregate root.
///
/// A header (number, date, customer, branch, cancellation flag) plus an
/// ordered list of lines. `total_amount` is kept equal to the sum of the line
/// totals whenever the lines change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    id: SaleId,

    /// Row version for optimistic concurrency, managed by the store.
    #[serde(default)]
    version: Version,

    sale_number: String,

    sale_date: DateTime<Utc>,

    customer: CustomerRef,

    branch: BranchRef,

    is_cancelled: bool,

    total_amount: Money,

    items: Vec<SaleItem>,
}

impl Sale {
    /// Creates a new, unpersisted sale with no lines.
    ///
    /// Fails with [`SaleError::InvalidHeader`] if the sale number, customer
    /// name or branch name is blank.
    pub fn new(
        sale_number: impl Into<String>,
        sale_date: DateTime<Utc>,
        customer: CustomerRef,
        branch: BranchRef,
    ) -> Result<Self, SaleError> {
        let sale_number = sale_number.into();

        if sale_number.trim().is_empty() {
            return Err(SaleError::InvalidHeader {
                field: "sale_number",
            });
        }
        if customer.name.trim().is_empty() {
            return Err(SaleError::InvalidHeader {
                field: "customer_name",
            });
        }
        if branch.name.trim().is_empty() {
            return Err(SaleError::InvalidHeader {
                field: "branch_name",
            });
        }

        Ok(Self {
            id: SaleId::new(),
            version: Version::initial(),
            sale_number,
            sale_date,
            customer,
            branch,
            is_cancelled: false,
            total_amount: Money::zero(),
            items: Vec::new(),
        })
    }

    /// Rebuilds a sale from stored data without re-running validation.
    pub fn from_parts(parts: SaleParts) -> Self {
        Self {
            id: parts.id,
            version: parts.version,
            sale_number: parts.sale_number,
            sale_date: parts.sale_date,
            customer: parts.customer,
            branch: parts.branch,
            is_cancelled: parts.is_cancelled,
            total_amount: parts.total_amount,
            items: parts.items,
        }
    }

    /// Prices every requested line.
    ///
    /// All-or-nothing: the first invalid line aborts and nothing is returned.
    /// The line totals must also sum to an amount that fits.
    pub fn price_items(inputs: &[SaleItemInput]) -> Result<Vec<SaleItem>, SaleError> {
        let items = inputs
            .iter()
            .map(SaleItem::priced)
            .collect::<Result<Vec<_>, _>>()?;

        items.iter().try_fold(Money::zero(), |total, item| {
            total
                .checked_add(item.total_amount)
                .ok_or_else(|| SaleError::AmountOutOfRange {
                    product_name: item.product_name.clone(),
                })
        })?;

        Ok(items)
    }
}

// Query methods
impl Sale {
    pub fn id(&self) -> SaleId {
        self.id
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn sale_number(&self) -> &str {
        &self.sale_number
    }

    pub fn sale_date(&self) -> DateTime<Utc> {
        self.sale_date
    }

    pub fn customer(&self) -> &CustomerRef {
        &self.customer
    }

    pub fn branch(&self) -> &BranchRef {
        &self.branch
    }

    pub fn is_cancelled(&self) -> bool {
        self.is_cancelled
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns the lines in the order they were submitted.
    pub fn items(&self) -> &[SaleItem] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of the line totals.
    pub fn computed_total(&self) -> Money {
        self.items.iter().map(|item| item.total_amount).sum()
    }

    /// Returns the ids of current lines whose product does not appear in
    /// `incoming`, in current line order.
    ///
    /// Must be called before the lines are replaced.
    pub fn removed_lines(&self, incoming: &[SaleItemInput]) -> Vec<SaleItemId> {
        let kept: HashSet<ProductId> = incoming.iter().map(|input| input.product_id).collect();

        self.items
            .iter()
            .filter(|item| !kept.contains(&item.product_id))
            .map(|item| item.id)
            .collect()
    }
}

// Mutation methods
impl Sale {
    /// Sets the cancellation flag.
    pub fn set_cancelled(&mut self, is_cancelled: bool) {
        self.is_cancelled = is_cancelled;
    }

    /// Replaces every line and recomputes the total.
    pub fn replace_items(&mut self, items: Vec<SaleItem>) {
        self.items = items;
        self.total_amount = self.computed_total();
    }

    /// Sets the row version. Called by stores on persistence.
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }
}
