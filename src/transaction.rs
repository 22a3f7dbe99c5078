use std::fmt::Display;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::catalog::normalize_type;

#[non_exhaustive]
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    /// The item type has no entry in the machine's catalog.
    /// Carries the normalized type that was looked up.
    #[error("unknown item type `{0}`")]
    UnknownItemType(String),

    /// The machine does not hold strictly more cash than the payout.
    #[error("insufficient funds: price {price} but only {balance} in the machine")]
    InsufficientFunds { price: Decimal, balance: Decimal },

    /// Transactions must weigh something.
    #[error("weight must be positive, got {0}")]
    InvalidWeight(Decimal),

    /// Catalog entries need a type that survives normalization.
    #[error("item type must not be blank")]
    BlankItemType,

    /// Catalog prices must be positive.
    #[error("price per pound must be positive, got {0}")]
    InvalidPrice(Decimal),

    /// The payout or the weight total does not fit in a `Decimal`.
    #[error("amount too large for the machine")]
    Overflow,
}

/// One accepted recycling event.
///
/// A transaction is immutable once built. The type is stored as entered;
/// every comparison against the catalog goes through [`normalize_type`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    item_type: String,

    /// Weight in pounds, always positive.
    weight: Decimal,
}

impl Transaction {
    pub fn new(item_type: impl Into<String>, weight: Decimal) -> Result<Self, LedgerError> {
        if weight <= Decimal::ZERO {
            return Err(LedgerError::InvalidWeight(weight));
        }

        Ok(Transaction {
            item_type: item_type.into(),
            weight,
        })
    }

    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    /// The catalog key this transaction is priced under.
    pub fn normalized_type(&self) -> String {
        normalize_type(&self.item_type)
    }

    pub fn weight(&self) -> Decimal {
        self.weight
    }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:.2} lbs", self.normalized_type(), self.weight)
    }
}
