//! A recycling machine takes in recyclable items by type and weight and pays
//! out cash for them from a fixed float.
//!
//! - [`Ledger`]: cash balance, catalog of accepted types and the items taken in
//! - [`Catalog`]: accepted types, keyed by [`normalize_type`]
//! - [`machine`]: the front panel and the session file format

pub mod catalog;
pub mod ledger;
pub mod machine;
pub mod transaction;

pub use catalog::{normalize_type, Catalog, CatalogEntry};
pub use ledger::{Ledger, STARTING_CASH};
pub use transaction::{LedgerError, Transaction};
