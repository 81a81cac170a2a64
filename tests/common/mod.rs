#![allow(dead_code)]

use flipledger::domain::error::LedgerError;
use flipledger::domain::ledger::{Ledger, LedgerState, ResourceKind};
use flipledger::domain::reference::ReferencePrices;
use flipledger::domain::valuation::Resources;
use flipledger::ports::price_port::PriceFeed;
use flipledger::ports::store_port::LedgerStore;
use std::cell::{Cell, RefCell};
use std::io::Write;

/// In-memory store that records every save and can be told to fail.
pub struct MemoryStore {
    pub loaded: Option<LedgerState>,
    pub saved: RefCell<Option<LedgerState>>,
    pub saves: Cell<usize>,
    pub fail_saves: Cell<bool>,
    pub fail_load: bool,
    pub quarantined: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            loaded: None,
            saved: RefCell::new(None),
            saves: Cell::new(0),
            fail_saves: Cell::new(false),
            fail_load: false,
            quarantined: Cell::new(false),
        }
    }

    pub fn with_state(mut self, state: LedgerState) -> Self {
        self.loaded = Some(state);
        self
    }

    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn last_saved(&self) -> Option<LedgerState> {
        self.saved.borrow().clone()
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<Option<LedgerState>, LedgerError> {
        if self.fail_load {
            return Err(LedgerError::Persistence {
                path: "memory".into(),
                reason: "unreadable".into(),
            });
        }
        Ok(self.loaded.clone())
    }

    fn save(&self, state: &LedgerState) -> Result<(), LedgerError> {
        if self.fail_saves.get() {
            return Err(LedgerError::Persistence {
                path: "memory".into(),
                reason: "disk full".into(),
            });
        }
        self.saves.set(self.saves.get() + 1);
        *self.saved.borrow_mut() = Some(state.clone());
        Ok(())
    }

    fn quarantine(&self) -> Result<Option<String>, LedgerError> {
        self.quarantined.set(true);
        Ok(Some("memory.corrupt".into()))
    }
}

/// Price feed answering from a fixed table, or failing with `error`.
pub struct FakeFeed {
    pub prices: Vec<(String, f64)>,
    pub error: Option<String>,
}

impl FakeFeed {
    pub fn with_prices(prices: &[(&str, f64)]) -> Self {
        Self {
            prices: prices.iter().map(|(n, v)| (n.to_string(), *v)).collect(),
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            prices: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl PriceFeed for FakeFeed {
    fn fetch(&self) -> Result<ReferencePrices, LedgerError> {
        if let Some(reason) = &self.error {
            return Err(LedgerError::fetch(reason.clone()));
        }
        let mut prices = ReferencePrices::new();
        for (name, value) in &self.prices {
            prices.insert(name.clone(), *value);
        }
        Ok(prices)
    }
}

pub fn resources(base: f64, alt: f64, ratio: f64) -> Resources {
    Resources {
        on_hand_base: base,
        on_hand_alt: alt,
        exchange_ratio: ratio,
        auxiliary_unit_cost: 0.0,
        conversion_fee_per_unit: 0.0,
    }
}

pub fn empty_ledger() -> Ledger<MemoryStore> {
    Ledger::new(MemoryStore::new(), LedgerState::default())
}

/// 100 chaos on hand, ratio 1.0, one record: Widget bought at 10, sold at 20 / 25.
pub fn widget_ledger() -> Ledger<MemoryStore> {
    let mut ledger = empty_ledger();
    ledger.set_resource(ResourceKind::Base, 100.0).unwrap();
    ledger.add_record("Widget", 10.0, 20.0, 25.0).unwrap();
    ledger
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
