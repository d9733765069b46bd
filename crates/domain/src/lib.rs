//! Domain layer for the sales system.
//!
//! This crate provides:
//! - the [`Sale`] aggregate and its [`SaleItem`] lines
//! - the quantity-based [`DiscountPolicy`]
//! - the [`SaleEvent`] lifecycle notifications and the [`DomainEvent`] trait
//! - command inputs for creating and updating sales

pub mod event;
pub mod sale;

pub use event::DomainEvent;
pub use sale::{
    BranchRef, CreateSale, CustomerRef, DiscountPolicy, ItemCancelledData, LinePricing, Money,
    Sale, SaleCancelledData, SaleCreatedData, SaleError, SaleEvent, SaleItem, SaleItemInput,
    SaleModifiedData, SaleParts, UpdateSale,
};
