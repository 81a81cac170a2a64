//! Reference prices from an external price feed.
//!
//! Values are chaos-equivalents keyed by currency or item name. Payload
//! parsing lives here so it can be exercised without a network.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::error::LedgerError;

/// The base currency; always worth exactly one of itself.
pub const BASE_CURRENCY: &str = "Chaos Orb";

/// Default alternate currency looked up when applying prices to a ledger.
pub const DEFAULT_ALT_CURRENCY: &str = "Divine Orb";

pub const DEFAULT_FEED_URL: &str = "https://poe.ninja/api/data";
pub const DEFAULT_LEAGUE: &str = "Settlers";
pub const DEFAULT_ITEM_TYPES: [&str; 2] = ["Fragment", "Scarab"];

#[derive(Debug, Deserialize)]
struct CurrencyOverview {
    lines: Vec<CurrencyLine>,
}

#[derive(Debug, Deserialize)]
struct CurrencyLine {
    #[serde(rename = "currencyTypeName")]
    name: String,
    #[serde(rename = "chaosEquivalent")]
    chaos_equivalent: f64,
}

#[derive(Debug, Deserialize)]
struct ItemOverview {
    lines: Vec<ItemLine>,
}

#[derive(Debug, Deserialize)]
struct ItemLine {
    name: String,
    #[serde(rename = "chaosValue")]
    chaos_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePrices {
    values: BTreeMap<String, f64>,
}

impl Default for ReferencePrices {
    fn default() -> Self {
        let mut values = BTreeMap::new();
        values.insert(BASE_CURRENCY.to_string(), 1.0);
        ReferencePrices { values }
    }
}

impl ReferencePrices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, chaos_value: f64) {
        self.values.insert(name.into(), chaos_value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge a currency overview payload (`lines[].currencyTypeName`,
    /// `lines[].chaosEquivalent`).
    pub fn merge_currency_overview(&mut self, body: &str) -> Result<usize, LedgerError> {
        let overview: CurrencyOverview = serde_json::from_str(body)
            .map_err(|e| LedgerError::fetch(format!("unexpected currency payload: {e}")))?;
        let count = overview.lines.len();
        for line in overview.lines {
            self.insert(line.name, line.chaos_equivalent);
        }
        Ok(count)
    }

    /// Merge an item overview payload (`lines[].name`, `lines[].chaosValue`).
    pub fn merge_item_overview(&mut self, body: &str) -> Result<usize, LedgerError> {
        let overview: ItemOverview = serde_json::from_str(body)
            .map_err(|e| LedgerError::fetch(format!("unexpected item payload: {e}")))?;
        let count = overview.lines.len();
        for line in overview.lines {
            self.insert(line.name, line.chaos_value);
        }
        Ok(count)
    }

    /// Units of `have` needed for one unit of `want`.
    pub fn exchange_rate(&self, want: &str, have: &str) -> Result<f64, LedgerError> {
        let want_price = self
            .get(want)
            .ok_or_else(|| LedgerError::fetch(format!("no reference price for '{want}'")))?;
        let have_price = self
            .get(have)
            .ok_or_else(|| LedgerError::fetch(format!("no reference price for '{have}'")))?;
        if have_price <= 0.0 {
            return Err(LedgerError::fetch(format!(
                "reference price for '{have}' is not positive"
            )));
        }
        Ok(want_price / have_price)
    }
}
