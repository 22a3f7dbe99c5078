use std::fmt::Display;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info, warn};

use crate::{
    catalog::{Catalog, CatalogEntry},
    transaction::{LedgerError, Transaction},
};

/// Cash a machine holds when installed and after every restock.
pub const STARTING_CASH: Decimal = dec!(200.00);

/// The state of one recycling machine: what it accepts, the cash it can pay
/// out, and the items it has taken in since it was last emptied.
#[derive(Debug)]
pub struct Ledger {
    id: String,
    location: String,
    catalog: Catalog,
    cash_balance: Decimal,

    /// Always the sum of the weights in `transactions`.
    cumulative_weight: Decimal,

    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new(id: impl Into<String>, location: impl Into<String>) -> Self {
        Ledger::with_catalog(id, location, Catalog::default())
    }

    pub fn with_catalog(
        id: impl Into<String>,
        location: impl Into<String>,
        catalog: Catalog,
    ) -> Self {
        Ledger {
            id: id.into(),
            location: location.into(),
            catalog,
            cash_balance: STARTING_CASH,
            cumulative_weight: Decimal::ZERO,
            transactions: Vec::new(),
        }
    }

    pub fn lookup(&self, item_type: &str) -> Option<&CatalogEntry> {
        self.catalog.lookup(item_type)
    }

    /// Payout for `transaction`: its weight times the listed price per pound.
    pub fn price_of(&self, transaction: &Transaction) -> Result<Decimal, LedgerError> {
        let entry = self
            .lookup(transaction.item_type())
            .ok_or_else(|| LedgerError::UnknownItemType(transaction.normalized_type()))?;

        transaction
            .weight()
            .checked_mul(entry.price_per_weight())
            .ok_or(LedgerError::Overflow)
    }

    /// Takes in an item and pays for it out of the cash balance.
    /// Returns the amount paid.
    ///
    /// The machine must hold strictly more than the payout; when it doesn't,
    /// or the type isn't listed, nothing changes.
    pub fn accept(&mut self, transaction: Transaction) -> Result<Decimal, LedgerError> {
        let (price, balance, weight) = match self.settle(&transaction) {
            Ok(settled) => settled,
            Err(err) => {
                warn!(%err, "item rejected");
                return Err(err);
            }
        };

        self.cash_balance = balance;
        self.cumulative_weight = weight;
        debug!(%transaction, %price, balance = %self.cash_balance, "item accepted");
        self.transactions.push(transaction);

        Ok(price)
    }

    /// Works out the payout and the balance and weight after it, touching nothing.
    fn settle(
        &self,
        transaction: &Transaction,
    ) -> Result<(Decimal, Decimal, Decimal), LedgerError> {
        let price = self.price_of(transaction)?;

        if self.cash_balance <= price {
            return Err(LedgerError::InsufficientFunds {
                price,
                balance: self.cash_balance,
            });
        }

        let balance = self
            .cash_balance
            .checked_sub(price)
            .ok_or(LedgerError::Overflow)?;
        let weight = self
            .cumulative_weight
            .checked_add(transaction.weight())
            .ok_or(LedgerError::Overflow)?;

        Ok((price, balance, weight))
    }

    /// Accepts each item in order. Every item is judged against the balance
    /// left by the ones before it; a rejection does not stop the rest.
    pub fn accept_all(
        &mut self,
        transactions: impl IntoIterator<Item = Transaction>,
    ) -> Vec<Result<Decimal, LedgerError>> {
        transactions
            .into_iter()
            .map(|transaction| self.accept(transaction))
            .collect()
    }

    /// Refills the cash to [`STARTING_CASH`], discarding whatever was left.
    pub fn restock(&mut self) {
        info!(previous = %self.cash_balance, "machine restocked");
        self.cash_balance = STARTING_CASH;
    }

    /// Empties the bin: forgets every recorded item and zeroes the weight.
    pub fn reset(&mut self) {
        info!(items = self.transactions.len(), weight = %self.cumulative_weight, "machine emptied");
        self.transactions.clear();
        self.cumulative_weight = Decimal::ZERO;
    }

    pub fn add_catalog_entry(&mut self, entry: CatalogEntry) -> bool {
        self.catalog.add(entry)
    }

    pub fn upsert_catalog_entry(
        &mut self,
        item_type: &str,
        price_per_weight: Decimal,
    ) -> Result<(), LedgerError> {
        self.catalog.upsert(item_type, price_per_weight)
    }

    pub fn remove_catalog_entry(&mut self, item_type: &str) -> bool {
        self.catalog.remove(item_type)
    }

    /// One-line display form, e.g. `RCM-1 lobby $196.40  2.00 lbs`.
    pub fn summarize(&self) -> String {
        self.to_string()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cash_balance(&self) -> Decimal {
        self.cash_balance
    }

    pub fn cumulative_weight(&self) -> Decimal {
        self.cumulative_weight
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}

impl Display for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} ${:.2}  {:.2} lbs",
            self.id, self.location, self.cash_balance, self.cumulative_weight
        )
    }
}
