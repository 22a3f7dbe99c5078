use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{
    ledger::Ledger,
    transaction::{LedgerError, Transaction},
};

/// Input the front panel refuses before the ledger ever sees it.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("Invalid Input: {0:?}")]
    InvalidInput(String),
}

/// Parses a weight or price the way a user types it: surrounding
/// whitespace is ignored and the value must be a positive decimal.
pub fn parse_amount(text: &str) -> Result<Decimal, InputError> {
    match Decimal::from_str(text.trim()) {
        Ok(amount) if amount > Decimal::ZERO => Ok(amount),
        _ => Err(InputError::InvalidInput(text.to_string())),
    }
}

/// What the front panel shows after the recycle button is pressed.
#[derive(Debug, PartialEq)]
pub enum Submission {
    Paid(Decimal),
    Rejected(LedgerError),
    Invalid(InputError),
}

impl Display for Submission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Submission::Paid(amount) => write!(f, "Item Value: {:.2}", amount),
            Submission::Rejected(err) => write!(f, "Item Rejected: {}", err),
            Submission::Invalid(err) => write!(f, "{}", err),
        }
    }
}

/// Handles one press of the recycle button with the two text fields as typed.
pub fn submit(ledger: &mut Ledger, type_text: &str, weight_text: &str) -> Submission {
    let weight = match parse_amount(weight_text) {
        Ok(weight) => weight,
        Err(err) => return Submission::Invalid(err),
    };

    let accepted = Transaction::new(type_text, weight).and_then(|tx| ledger.accept(tx));

    match accepted {
        Ok(paid) => Submission::Paid(paid),
        Err(err) => Submission::Rejected(err),
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ActionType {
    /// A user drops an item in the machine.
    ///
    /// |action     |type   |amount |
    /// |-----------|-------|-------|
    /// |recycle    |glass  |2.0    |
    ///
    /// `amount` is the weight in pounds, kept as typed so that bad input
    /// is reported on the receipt rather than failing the session.
    Recycle,

    /// An operator refills the cash.
    ///
    /// |action     |type   |amount |
    /// |-----------|-------|-------|
    /// |restock    |       |       |
    Restock,

    /// An operator empties the bin.
    ///
    /// |action     |type   |amount |
    /// |-----------|-------|-------|
    /// |empty      |       |       |
    Empty,

    /// An operator lists a type or changes its price per pound.
    ///
    /// |action     |type   |amount |
    /// |-----------|-------|-------|
    /// |price      |steel  |0.5    |
    Price,

    /// An operator stops accepting a type.
    ///
    /// |action     |type   |amount |
    /// |-----------|-------|-------|
    /// |remove     |steel  |       |
    Remove,
}

/// One row of a session file.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Action {
    #[serde(rename = "action")]
    pub action_type: ActionType,

    #[serde(rename = "type")]
    pub item_type: Option<String>,

    pub amount: Option<String>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Accepted,
    Rejected,
    Invalid,
    Ok,
}

/// Receipts show amounts with at least this many decimals. Extra precision
/// is kept so that consecutive rows add up to the cent and below.
const DISPLAY_SCALE: u32 = 2;

fn shown(mut amount: Decimal) -> Decimal {
    if amount.scale() < DISPLAY_SCALE {
        amount.rescale(DISPLAY_SCALE);
    }
    amount
}

/// One output row per session row: the outcome and the machine state after it.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Receipt {
    /// Empty when the row could not be read.
    pub action: Option<ActionType>,

    #[serde(rename = "type")]
    pub item_type: String,

    pub status: Status,

    /// Only set for accepted recycles.
    pub paid: Option<Decimal>,

    pub cash: Decimal,

    pub weight: Decimal,
}

impl Receipt {
    fn new(
        action: Option<ActionType>,
        item_type: &str,
        status: Status,
        paid: Option<Decimal>,
        ledger: &Ledger,
    ) -> Self {
        Receipt {
            action,
            item_type: item_type.trim().to_string(),
            status,
            paid: paid.map(shown),
            cash: shown(ledger.cash_balance()),
            weight: shown(ledger.cumulative_weight()),
        }
    }
}

/// Replays one raw session row. A row that does not parse as an [`Action`]
/// gets an `invalid` receipt and leaves the ledger alone.
pub fn replay(
    record: &csv::StringRecord,
    headers: &csv::StringRecord,
    ledger: &mut Ledger,
) -> Receipt {
    match record.deserialize::<Action>(Some(headers)) {
        Ok(action) => action.apply_to(ledger),
        Err(err) => {
            warn!(%err, "unreadable session row");
            let item_type = headers
                .iter()
                .position(|header| header == "type")
                .and_then(|i| record.get(i))
                .unwrap_or_default();
            Receipt::new(None, item_type, Status::Invalid, None, ledger)
        }
    }
}

impl Action {
    fn item_type(&self) -> &str {
        self.item_type.as_deref().unwrap_or_default()
    }

    fn amount(&self) -> &str {
        self.amount.as_deref().unwrap_or_default()
    }

    /// Applies this row to the ledger. Rejections end up on the receipt
    /// rather than failing the session.
    pub fn apply_to(&self, ledger: &mut Ledger) -> Receipt {
        let mut paid = None;

        let status = match self.action_type {
            ActionType::Recycle => match submit(ledger, self.item_type(), self.amount()) {
                Submission::Paid(amount) => {
                    paid = Some(amount);
                    Status::Accepted
                }
                Submission::Rejected(_) => Status::Rejected,
                Submission::Invalid(_) => Status::Invalid,
            },
            ActionType::Restock => {
                ledger.restock();
                Status::Ok
            }
            ActionType::Empty => {
                ledger.reset();
                Status::Ok
            }
            ActionType::Price => match parse_amount(self.amount()) {
                Ok(price) => match ledger.upsert_catalog_entry(self.item_type(), price) {
                    Ok(()) => Status::Ok,
                    Err(_) => Status::Rejected,
                },
                Err(_) => Status::Invalid,
            },
            ActionType::Remove => {
                if ledger.remove_catalog_entry(self.item_type()) {
                    Status::Ok
                } else {
                    Status::Rejected
                }
            }
        };

        Receipt::new(Some(self.action_type), self.item_type(), status, paid, ledger)
    }
}
