//! The ledger engine.
//!
//! [`Ledger`] exclusively owns the [`LedgerState`] and the store it persists
//! to. Every mutating operation validates its input first, so a rejected call
//! leaves the state untouched; once the state has changed the whole ledger is
//! saved. A failed save is returned to the caller but the in-memory change
//! stands.

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::domain::amount;
use crate::domain::error::LedgerError;
use crate::domain::export::ExportRows;
use crate::domain::record::{RecordField, TradeRecord};
use crate::domain::reference::ReferencePrices;
use crate::domain::sort::{self, RowView, SortState};
use crate::domain::valuation::{self, Resources};
use crate::ports::store_port::LedgerStore;

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerState {
    /// Records in insertion order.
    pub records: Vec<TradeRecord>,
    pub resources: Resources,
    /// Top-level document keys this version does not know about.
    pub extra: Map<String, Value>,
}

impl Default for LedgerState {
    fn default() -> Self {
        LedgerState {
            records: Vec::new(),
            resources: Resources::default(),
            extra: Map::new(),
        }
    }
}

impl LedgerState {
    pub fn with_resources(resources: Resources) -> Self {
        LedgerState {
            resources,
            ..Self::default()
        }
    }

    pub fn recompute_all(&mut self) {
        let res = self.resources;
        for record in &mut self.records {
            valuation::recompute(record, &res);
        }
    }
}

/// Which on-hand currency a resource update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Base,
    Alt,
}

impl ResourceKind {
    pub fn key(self) -> &'static str {
        match self {
            ResourceKind::Base => "current_chaos",
            ResourceKind::Alt => "current_divine",
        }
    }
}

pub struct Ledger<S: LedgerStore> {
    state: LedgerState,
    store: S,
    sort: SortState,
}

impl<S: LedgerStore> Ledger<S> {
    /// Wrap an existing state. Derived fields are recomputed immediately.
    pub fn new(store: S, mut state: LedgerState) -> Self {
        state.recompute_all();
        Ledger {
            state,
            store,
            sort: SortState::default(),
        }
    }

    /// Load from `store`, or start from `seed` resources when nothing is saved.
    pub fn open(store: S, seed: Resources) -> Result<Self, LedgerError> {
        let state = match store.load()? {
            Some(state) => {
                info!(records = state.records.len(), "loaded ledger");
                state
            }
            None => {
                info!("no saved ledger, starting empty");
                LedgerState::with_resources(seed)
            }
        };
        Ok(Self::new(store, state))
    }

    /// Like [`Ledger::open`], but an unreadable document is quarantined and
    /// replaced by an empty ledger. The load error is handed back so the
    /// caller can warn about it.
    pub fn open_or_default(store: S, seed: Resources) -> (Self, Option<LedgerError>) {
        match store.load() {
            Ok(loaded) => {
                let state = loaded.unwrap_or_else(|| LedgerState::with_resources(seed));
                (Self::new(store, state), None)
            }
            Err(e) => {
                warn!(error = %e, "failed to load ledger, starting empty");
                match store.quarantine() {
                    Ok(Some(moved_to)) => warn!(moved_to = %moved_to, "kept unreadable ledger"),
                    Ok(None) => {}
                    Err(qe) => warn!(error = %qe, "could not quarantine unreadable ledger"),
                }
                (Self::new(store, LedgerState::with_resources(seed)), Some(e))
            }
        }
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn records(&self) -> &[TradeRecord] {
        &self.state.records
    }

    pub fn resources(&self) -> &Resources {
        &self.state.resources
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn len(&self) -> usize {
        self.state.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&TradeRecord, LedgerError> {
        self.state.records.get(index).ok_or(LedgerError::Index {
            index,
            len: self.state.records.len(),
        })
    }

    fn persist(&self) -> Result<(), LedgerError> {
        self.store.save(&self.state)?;
        debug!(records = self.state.records.len(), "ledger saved");
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), LedgerError> {
        self.get(index).map(|_| ())
    }

    pub fn add_record(
        &mut self,
        name: &str,
        buy_price: f64,
        sell_price_base: f64,
        sell_price_alt: f64,
    ) -> Result<TradeRecord, LedgerError> {
        let buy = amount::validate_non_negative(RecordField::BuyPrice.key(), buy_price)?;
        let sell = amount::validate_non_negative(RecordField::SellPriceBase.key(), sell_price_base)?;
        let alt = amount::validate_non_negative(RecordField::SellPriceAlt.key(), sell_price_alt)?;

        let mut record = TradeRecord::new(name, buy, sell, alt);
        valuation::recompute(&mut record, &self.state.resources);
        self.state.records.push(record.clone());
        info!(
            name = %record.name,
            index = self.state.records.len() - 1,
            profit = record.derived.profit_base_to_base,
            "record added"
        );

        self.persist()?;
        Ok(record)
    }

    /// [`Ledger::add_record`] with amounts given as user text.
    pub fn add_record_text(
        &mut self,
        name: &str,
        buy_price: &str,
        sell_price_base: &str,
        sell_price_alt: &str,
    ) -> Result<TradeRecord, LedgerError> {
        let buy = amount::parse_field(RecordField::BuyPrice.key(), buy_price)?;
        let sell = amount::parse_field(RecordField::SellPriceBase.key(), sell_price_base)?;
        let alt = amount::parse_field(RecordField::SellPriceAlt.key(), sell_price_alt)?;
        self.add_record(name, buy, sell, alt)
    }

    pub fn edit_field(
        &mut self,
        index: usize,
        field_name: &str,
        new_value: &str,
    ) -> Result<TradeRecord, LedgerError> {
        self.check_index(index)?;
        let field: RecordField = field_name.parse()?;
        if !field.is_editable() {
            return Err(LedgerError::UnsupportedField {
                field: field.key().to_string(),
            });
        }
        let value = amount::parse_field(field.key(), new_value)?;

        let res = self.state.resources;
        let record = &mut self.state.records[index];
        match field {
            RecordField::BuyPrice => record.buy_price = value,
            RecordField::SellPriceBase => record.sell_price_base = value,
            RecordField::SellPriceAlt => record.sell_price_alt = value,
            _ => unreachable!("non-editable fields are rejected above"),
        }
        valuation::recompute(record, &res);
        let updated = record.clone();
        info!(index, field = %field, value, "record edited");

        self.persist()?;
        Ok(updated)
    }

    pub fn delete_record(&mut self, index: usize) -> Result<(), LedgerError> {
        self.check_index(index)?;
        let removed = self.state.records.remove(index);
        info!(index, name = %removed.name, "record deleted");
        self.persist()
    }

    pub fn set_resource(&mut self, kind: ResourceKind, quantity: f64) -> Result<(), LedgerError> {
        let quantity = amount::validate_non_negative(kind.key(), quantity)?;
        match kind {
            ResourceKind::Base => self.state.resources.on_hand_base = quantity,
            ResourceKind::Alt => self.state.resources.on_hand_alt = quantity,
        }
        info!(resource = kind.key(), quantity, "resource updated");
        self.recompute_all();
        self.persist()
    }

    pub fn set_exchange_ratio(&mut self, ratio: f64) -> Result<(), LedgerError> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(LedgerError::input("dc_ratio", "must be a positive number"));
        }
        self.state.resources.exchange_ratio = ratio;
        info!(ratio, "exchange ratio updated");
        self.recompute_all();
        self.persist()
    }

    pub fn set_auxiliary_unit_cost(&mut self, cost: f64) -> Result<(), LedgerError> {
        let cost = amount::validate_non_negative("item_coin_value", cost)?;
        self.state.resources.auxiliary_unit_cost = cost;
        info!(cost, "auxiliary unit cost updated");
        self.recompute_all();
        self.persist()
    }

    pub fn set_conversion_fee(&mut self, fee: f64) -> Result<(), LedgerError> {
        let fee = amount::validate_non_negative("conversion_coin_value", fee)?;
        self.state.resources.conversion_fee_per_unit = fee;
        info!(fee, "conversion fee updated");
        self.recompute_all();
        self.persist()
    }

    /// Apply fetched reference prices: the alternate currency's value becomes
    /// the exchange ratio. Returns the ratio applied.
    pub fn apply_reference_prices(
        &mut self,
        prices: &ReferencePrices,
        alt_currency: &str,
    ) -> Result<f64, LedgerError> {
        let ratio = prices.get(alt_currency).ok_or_else(|| {
            LedgerError::fetch(format!("feed has no price for '{alt_currency}'"))
        })?;
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(LedgerError::fetch(format!(
                "feed price for '{alt_currency}' is not positive"
            )));
        }
        self.set_exchange_ratio(ratio)?;
        Ok(ratio)
    }

    pub fn recompute_all(&mut self) {
        self.state.recompute_all();
    }

    /// Sort the displayed rows by `field`, toggling direction on repeats.
    /// Canonical order and the saved document are not affected.
    pub fn sort_by(&mut self, field: RecordField) -> Vec<RowView<'_>> {
        self.sort.toggle(field);
        sort::view(&self.state.records, self.sort)
    }

    /// Sort the displayed rows by `field` in an explicit direction.
    pub fn sort_by_direction(&mut self, field: RecordField, descending: bool) -> Vec<RowView<'_>> {
        self.sort = SortState {
            field: Some(field),
            descending,
        };
        sort::view(&self.state.records, self.sort)
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    /// Rows in current display order.
    pub fn rows(&self) -> Vec<RowView<'_>> {
        sort::view(&self.state.records, self.sort)
    }

    pub fn export_records(&self) -> ExportRows<'_> {
        ExportRows::new(&self.state.records)
    }
}
