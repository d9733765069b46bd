//! Read-side views of a sale.
//!
//! These are what callers receive and what the read cache stores.

use chrono::{DateTime, Utc};
use common::{BranchId, CustomerId, ProductId, SaleId, SaleItemId};
use domain::{Money, Sale, SaleItem};
use serde::{Deserialize, Serialize};

/// A sale as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleDto {
    pub id: SaleId,
    pub sale_number: String,
    pub sale_date: DateTime<Utc>,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub branch_id: BranchId,
    pub branch_name: String,
    pub is_cancelled: bool,
    pub total_amount: Money,
    pub items: Vec<SaleItemDto>,
}

/// One line of a [`SaleDto`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItemDto {
    pub id: SaleItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub discount: Money,
    pub total_amount: Money,
}

impl From<&SaleItem> for SaleItemDto {
    fn from(item: &SaleItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            discount: item.discount,
            total_amount: item.total_amount,
        }
    }
}

impl From<&Sale> for SaleDto {
    fn from(sale: &Sale) -> Self {
        Self {
            id: sale.id(),
            sale_number: sale.sale_number().to_string(),
            sale_date: sale.sale_date(),
            customer_id: sale.customer().id,
            customer_name: sale.customer().name.clone(),
            branch_id: sale.branch().id,
            branch_name: sale.branch().name.clone(),
            is_cancelled: sale.is_cancelled(),
            total_amount: sale.total_amount(),
            items: sale.items().iter().map(SaleItemDto::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{BranchRef, CustomerRef, SaleItemInput};

    #[test]
    fn test_mapping_keeps_lines_and_totals() {
        let mut sale = Sale::new(
            "S-1",
            Utc::now(),
            CustomerRef::new(CustomerId::new(), "Acme Ltd"),
            BranchRef::new(BranchId::new(), "Downtown"),
        )
        .unwrap();
        sale.replace_items(
            Sale::price_items(&[
                SaleItemInput::new(ProductId::new(), "Widget", 5, Money::from_dollars(100)),
                SaleItemInput::new(ProductId::new(), "Gadget", 1, Money::from_dollars(3)),
            ])
            .unwrap(),
        );

        let dto = SaleDto::from(&sale);

        assert_eq!(dto.id, sale.id());
        assert_eq!(dto.customer_name, "Acme Ltd");
        assert_eq!(dto.items.len(), 2);
        assert_eq!(dto.items[0].id, sale.items()[0].id);
        assert_eq!(dto.items[0].discount, Money::from_dollars(50));
        assert_eq!(dto.total_amount, Money::from_dollars(453));
    }

    #[test]
    fn test_json_round_trip() {
        let sale = Sale::new(
            "S-2",
            Utc::now(),
            CustomerRef::new(CustomerId::new(), "Acme Ltd"),
            BranchRef::new(BranchId::new(), "Downtown"),
        )
        .unwrap();
        let dto = SaleDto::from(&sale);

        let json = serde_json::to_string(&dto).unwrap();
        let back: SaleDto = serde_json::from_str(&json).unwrap();

        assert_eq!(back, dto);
    }
}
