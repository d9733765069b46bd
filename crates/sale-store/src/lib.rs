//! Durable storage for the sale aggregate.
//!
//! - [`SaleStore`] is the contract the lifecycle service consumes
//! - [`InMemorySaleStore`] backs tests and local runs
//! - [`PostgresSaleStore`] persists sales and their lines with sqlx

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemorySaleStore;
pub use postgres::PostgresSaleStore;
pub use query::DateRange;
pub use store::SaleStore;
