use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing::info;

use crate::transaction::LedgerError;

/// Strips every whitespace character and lower-cases the rest.
///
/// Two type strings name the same item iff their normalized forms are equal,
/// so `" Glass"`, `"GLASS "` and `"gla ss"` all price as `glass`.
pub fn normalize_type(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// An item type the machine accepts and what it pays for it.
///
/// A catalog file row looks like
///
/// |type       |price  |
/// |-----------|-------|
/// |glass      |1.8    |
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Normalized item type.
    #[serde(rename = "type", deserialize_with = "deserialize_type")]
    item_type: String,

    /// Payout per pound.
    #[serde(rename = "price", with = "rust_decimal::serde::str")]
    price_per_weight: Decimal,
}

fn deserialize_type<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(|raw| normalize_type(&raw))
}

impl CatalogEntry {
    pub fn new(item_type: &str, price_per_weight: Decimal) -> Result<Self, LedgerError> {
        let entry = CatalogEntry {
            item_type: normalize_type(item_type),
            price_per_weight,
        };
        entry.validate()?;
        Ok(entry)
    }

    fn validate(&self) -> Result<(), LedgerError> {
        if self.item_type.is_empty() {
            return Err(LedgerError::BlankItemType);
        }
        if self.price_per_weight <= Decimal::ZERO {
            return Err(LedgerError::InvalidPrice(self.price_per_weight));
        }
        Ok(())
    }

    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    pub fn price_per_weight(&self) -> Decimal {
        self.price_per_weight
    }
}

/// Ordered list of accepted item types, unique by normalized type.
/// Insertion order only matters for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Default for Catalog {
    /// The types every machine accepts out of the box.
    fn default() -> Self {
        Catalog {
            entries: vec![
                CatalogEntry {
                    item_type: "plastic".to_string(),
                    price_per_weight: dec!(1.2),
                },
                CatalogEntry {
                    item_type: "aluminium".to_string(),
                    price_per_weight: dec!(2.2),
                },
                CatalogEntry {
                    item_type: "glass".to_string(),
                    price_per_weight: dec!(1.8),
                },
            ],
        }
    }
}

impl Catalog {
    fn position(&self, item_type: &str) -> Option<usize> {
        let key = normalize_type(item_type);
        self.entries.iter().position(|entry| entry.item_type == key)
    }

    pub fn lookup(&self, item_type: &str) -> Option<&CatalogEntry> {
        self.position(item_type).map(|i| &self.entries[i])
    }

    /// Inserts `entry` unless its type is already listed, whatever the price.
    /// Returns whether the entry was inserted.
    pub fn add(&mut self, entry: CatalogEntry) -> bool {
        if self.position(&entry.item_type).is_some() {
            return false;
        }

        info!(item_type = %entry.item_type, price = %entry.price_per_weight, "catalog entry added");
        self.entries.push(entry);
        true
    }

    /// Sets the price for `item_type`, appending a new entry if it is not listed.
    pub fn upsert(&mut self, item_type: &str, price_per_weight: Decimal) -> Result<(), LedgerError> {
        let entry = CatalogEntry::new(item_type, price_per_weight)?;

        match self.position(&entry.item_type) {
            Some(i) => {
                info!(item_type = %entry.item_type, price = %price_per_weight, "catalog price updated");
                self.entries[i].price_per_weight = price_per_weight;
            }
            None => {
                self.add(entry);
            }
        }

        Ok(())
    }

    /// Removes the entry for `item_type`. Returns whether one was listed.
    pub fn remove(&mut self, item_type: &str) -> bool {
        match self.position(item_type) {
            Some(i) => {
                let entry = self.entries.remove(i);
                info!(item_type = %entry.item_type, "catalog entry removed");
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
