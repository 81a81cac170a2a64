//! JSON file ledger store.
//!
//! The document keeps the key names the ledger has always used on disk.
//! Derived values are written for readers of the file but ignored on load,
//! since the engine recomputes them. Unknown keys round-trip untouched.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::error::LedgerError;
use crate::domain::ledger::LedgerState;
use crate::domain::record::{RecordField, TradeRecord};
use crate::domain::valuation::Resources;
use crate::ports::store_port::LedgerStore;

pub const DEFAULT_DATA_FILE: &str = "items_data.json";

fn default_ratio() -> f64 {
    1.0
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredLedger {
    #[serde(default)]
    items: Vec<StoredItem>,
    #[serde(default)]
    current_chaos: f64,
    #[serde(default)]
    current_divine: f64,
    #[serde(default = "default_ratio")]
    dc_ratio: f64,
    #[serde(default)]
    item_coin_value: f64,
    #[serde(default)]
    conversion_coin_value: f64,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredItem {
    #[serde(default)]
    item_name: String,
    #[serde(default)]
    receive_price: f64,
    #[serde(default)]
    sell_price: f64,
    #[serde(default)]
    divine_sell_price: f64,
    #[serde(flatten)]
    values: Map<String, Value>,
}

fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// A stored amount the engine can use: finite and non-negative. Anything
/// else is replaced by zero.
fn stored_amount(item: &str, field: RecordField, value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!(item, field = field.key(), value, "replacing invalid stored amount with 0");
        0.0
    }
}

impl StoredItem {
    fn from_record(record: &TradeRecord) -> Self {
        let mut values = record.extra.clone();
        for field in RecordField::ALL.iter().copied().filter(|f| f.is_derived()) {
            let value = match record.numeric(field) {
                Some(v) if field.is_integer() => Value::from(v as u64),
                Some(v) => number(v),
                None => Value::Null,
            };
            values.insert(field.key().to_string(), value);
        }
        StoredItem {
            item_name: record.name.clone(),
            receive_price: record.buy_price,
            sell_price: record.sell_price_base,
            divine_sell_price: record.sell_price_alt,
            values,
        }
    }

    fn into_record(mut self) -> TradeRecord {
        for field in RecordField::ALL.iter().filter(|f| f.is_derived()) {
            self.values.remove(field.key());
        }
        let name = self.item_name;
        let buy = stored_amount(&name, RecordField::BuyPrice, self.receive_price);
        let sell = stored_amount(&name, RecordField::SellPriceBase, self.sell_price);
        let alt = stored_amount(&name, RecordField::SellPriceAlt, self.divine_sell_price);
        let mut record = TradeRecord::new(name, buy, sell, alt);
        record.extra = self.values;
        record
    }
}

impl StoredLedger {
    fn from_state(state: &LedgerState) -> Self {
        StoredLedger {
            items: state.records.iter().map(StoredItem::from_record).collect(),
            current_chaos: state.resources.on_hand_base,
            current_divine: state.resources.on_hand_alt,
            dc_ratio: state.resources.exchange_ratio,
            item_coin_value: state.resources.auxiliary_unit_cost,
            conversion_coin_value: state.resources.conversion_fee_per_unit,
            extra: state.extra.clone(),
        }
    }

    fn into_state(self) -> LedgerState {
        // A hand-edited ratio of zero or less would make every alt figure meaningless.
        let exchange_ratio = if self.dc_ratio > 0.0 && self.dc_ratio.is_finite() {
            self.dc_ratio
        } else {
            warn!(dc_ratio = self.dc_ratio, "ignoring non-positive exchange ratio");
            default_ratio()
        };
        LedgerState {
            records: self.items.into_iter().map(StoredItem::into_record).collect(),
            resources: Resources {
                on_hand_base: self.current_chaos.max(0.0),
                on_hand_alt: self.current_divine.max(0.0),
                exchange_ratio,
                auxiliary_unit_cost: self.item_coin_value.max(0.0),
                conversion_fee_per_unit: self.conversion_coin_value.max(0.0),
            },
            extra: self.extra,
        }
    }
}

/// Parse a ledger document. Derived fields come back zeroed.
pub fn from_json(content: &str) -> Result<LedgerState, serde_json::Error> {
    let stored: StoredLedger = serde_json::from_str(content)?;
    Ok(stored.into_state())
}

/// Render a ledger document, pretty-printed.
pub fn to_json(state: &LedgerState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&StoredLedger::from_state(state))
}

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn persistence_error(&self, reason: impl ToString) -> LedgerError {
        LedgerError::Persistence {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> Result<Option<LedgerState>, LedgerError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.persistence_error(e)),
        };
        let state = from_json(&content).map_err(|e| self.persistence_error(e))?;
        debug!(path = %self.path.display(), records = state.records.len(), "read ledger file");
        Ok(Some(state))
    }

    /// Write to a sibling temp file, then rename over the target so an
    /// interrupted write never leaves a truncated document.
    fn save(&self, state: &LedgerState) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.persistence_error(e))?;
            }
        }
        let json = to_json(state).map_err(|e| self.persistence_error(e))?;
        let tmp = self.temp_path();
        fs::write(&tmp, json).map_err(|e| self.persistence_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            self.persistence_error(e)
        })?;
        Ok(())
    }

    fn quarantine(&self) -> Result<Option<String>, LedgerError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".corrupt");
        let target = self.path.with_file_name(name);
        fs::rename(&self.path, &target).map_err(|e| self.persistence_error(e))?;
        Ok(Some(target.display().to_string()))
    }
}
