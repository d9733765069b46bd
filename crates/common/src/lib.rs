//! Shared types for the sales system.
//!
//! Typed identifiers keep sale, line, customer, branch and product ids from
//! being mixed up, and [`Version`] is the optimistic-concurrency token the
//! store compares on update.

mod types;
mod version;

pub use types::{BranchId, CustomerId, ProductId, SaleId, SaleItemId};
pub use version::Version;
