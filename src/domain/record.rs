//! Trade record model and field addressing.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::domain::error::LedgerError;

/// Values derived from a record's prices and the ledger's resources.
///
/// Ratio fields are `None` when their denominator is zero or negative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Derived {
    pub profit_base_to_base: f64,
    pub profit_base_to_alt: f64,
    pub affordable_with_base: u64,
    pub affordable_with_alt: u64,
    pub affordable_quantity: u64,
    pub total_profit_base_to_base: f64,
    pub total_profit_base_to_alt: f64,
    pub auxiliary_cost: f64,
    pub auxiliary_cost_per_profit_base: Option<f64>,
    pub auxiliary_cost_per_profit_alt: Option<f64>,
    /// Base currency tied up buying the whole batch.
    pub required_base: f64,
    pub sale_proceeds_base: f64,
    /// Proceeds of the alt sale, converted to base.
    pub sale_proceeds_alt: f64,
    /// Flat fee for converting the alt proceeds back to base.
    pub conversion_fee: f64,
    pub auxiliary_cost_per_profit_alt_with_fee: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub name: String,
    pub buy_price: f64,
    pub sell_price_base: f64,
    pub sell_price_alt: f64,
    pub derived: Derived,
    /// Keys read from disk that this version does not know about.
    pub extra: Map<String, Value>,
}

impl TradeRecord {
    /// A record with the given inputs and zeroed derived fields.
    pub fn new(name: impl Into<String>, buy_price: f64, sell_price_base: f64, sell_price_alt: f64) -> Self {
        TradeRecord {
            name: name.into(),
            buy_price,
            sell_price_base,
            sell_price_alt,
            derived: Derived::default(),
            extra: Map::new(),
        }
    }

    /// Numeric value of a field, for sorting and display. `None` for the name
    /// and for ratios that are not computable.
    pub fn numeric(&self, field: RecordField) -> Option<f64> {
        let d = &self.derived;
        match field {
            RecordField::Name => None,
            RecordField::BuyPrice => Some(self.buy_price),
            RecordField::SellPriceBase => Some(self.sell_price_base),
            RecordField::SellPriceAlt => Some(self.sell_price_alt),
            RecordField::ProfitBaseToBase => Some(d.profit_base_to_base),
            RecordField::ProfitBaseToAlt => Some(d.profit_base_to_alt),
            RecordField::AffordableWithBase => Some(d.affordable_with_base as f64),
            RecordField::AffordableWithAlt => Some(d.affordable_with_alt as f64),
            RecordField::AffordableQuantity => Some(d.affordable_quantity as f64),
            RecordField::TotalProfitBaseToBase => Some(d.total_profit_base_to_base),
            RecordField::TotalProfitBaseToAlt => Some(d.total_profit_base_to_alt),
            RecordField::AuxiliaryCost => Some(d.auxiliary_cost),
            RecordField::AuxiliaryCostPerProfitBase => d.auxiliary_cost_per_profit_base,
            RecordField::AuxiliaryCostPerProfitAlt => d.auxiliary_cost_per_profit_alt,
            RecordField::RequiredBase => Some(d.required_base),
            RecordField::SaleProceedsBase => Some(d.sale_proceeds_base),
            RecordField::SaleProceedsAlt => Some(d.sale_proceeds_alt),
            RecordField::ConversionFee => Some(d.conversion_fee),
            RecordField::AuxiliaryCostPerProfitAltWithFee => {
                d.auxiliary_cost_per_profit_alt_with_fee
            }
        }
    }
}

/// Every addressable column of a trade record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Name,
    BuyPrice,
    SellPriceBase,
    SellPriceAlt,
    ProfitBaseToBase,
    ProfitBaseToAlt,
    AffordableWithBase,
    AffordableWithAlt,
    AffordableQuantity,
    TotalProfitBaseToBase,
    TotalProfitBaseToAlt,
    AuxiliaryCost,
    AuxiliaryCostPerProfitBase,
    AuxiliaryCostPerProfitAlt,
    RequiredBase,
    SaleProceedsBase,
    SaleProceedsAlt,
    ConversionFee,
    AuxiliaryCostPerProfitAltWithFee,
}

impl RecordField {
    pub const ALL: [RecordField; 19] = [
        RecordField::Name,
        RecordField::BuyPrice,
        RecordField::SellPriceBase,
        RecordField::SellPriceAlt,
        RecordField::ProfitBaseToBase,
        RecordField::ProfitBaseToAlt,
        RecordField::AffordableWithBase,
        RecordField::AffordableWithAlt,
        RecordField::AffordableQuantity,
        RecordField::TotalProfitBaseToBase,
        RecordField::TotalProfitBaseToAlt,
        RecordField::AuxiliaryCost,
        RecordField::AuxiliaryCostPerProfitBase,
        RecordField::AuxiliaryCostPerProfitAlt,
        RecordField::RequiredBase,
        RecordField::SaleProceedsBase,
        RecordField::SaleProceedsAlt,
        RecordField::ConversionFee,
        RecordField::AuxiliaryCostPerProfitAltWithFee,
    ];

    /// The key this field is stored under in the ledger document.
    pub fn key(self) -> &'static str {
        match self {
            RecordField::Name => "item_name",
            RecordField::BuyPrice => "receive_price",
            RecordField::SellPriceBase => "sell_price",
            RecordField::SellPriceAlt => "divine_sell_price",
            RecordField::ProfitBaseToBase => "profit_c_to_c",
            RecordField::ProfitBaseToAlt => "profit_c_to_d",
            RecordField::AffordableWithBase => "purchasable_with_chaos",
            RecordField::AffordableWithAlt => "purchasable_with_divine",
            RecordField::AffordableQuantity => "affordable_quantity",
            RecordField::TotalProfitBaseToBase => "total_profit_c_to_c",
            RecordField::TotalProfitBaseToAlt => "total_profit_c_to_d",
            RecordField::AuxiliaryCost => "receive_coin",
            RecordField::AuxiliaryCostPerProfitBase => "avg_coin_c",
            RecordField::AuxiliaryCostPerProfitAlt => "avg_coin_d",
            RecordField::RequiredBase => "required_chaos",
            RecordField::SaleProceedsBase => "sell_coin",
            RecordField::SaleProceedsAlt => "sell_div_coin",
            RecordField::ConversionFee => "extra_coin",
            RecordField::AuxiliaryCostPerProfitAltWithFee => "avg_coin_d_extra",
        }
    }

    fn camel_name(self) -> &'static str {
        match self {
            RecordField::Name => "name",
            RecordField::BuyPrice => "buyPrice",
            RecordField::SellPriceBase => "sellPriceBase",
            RecordField::SellPriceAlt => "sellPriceAlt",
            RecordField::ProfitBaseToBase => "profitBaseToBase",
            RecordField::ProfitBaseToAlt => "profitBaseToAlt",
            RecordField::AffordableWithBase => "affordableWithBase",
            RecordField::AffordableWithAlt => "affordableWithAlt",
            RecordField::AffordableQuantity => "affordableQuantity",
            RecordField::TotalProfitBaseToBase => "totalProfitBaseToBase",
            RecordField::TotalProfitBaseToAlt => "totalProfitBaseToAlt",
            RecordField::AuxiliaryCost => "auxiliaryCost",
            RecordField::AuxiliaryCostPerProfitBase => "auxiliaryCostPerProfitBase",
            RecordField::AuxiliaryCostPerProfitAlt => "auxiliaryCostPerProfitAlt",
            RecordField::RequiredBase => "requiredBase",
            RecordField::SaleProceedsBase => "saleProceedsBase",
            RecordField::SaleProceedsAlt => "saleProceedsAlt",
            RecordField::ConversionFee => "conversionFee",
            RecordField::AuxiliaryCostPerProfitAltWithFee => "auxiliaryCostPerProfitAltWithFee",
        }
    }

    pub fn is_derived(self) -> bool {
        !matches!(
            self,
            RecordField::Name
                | RecordField::BuyPrice
                | RecordField::SellPriceBase
                | RecordField::SellPriceAlt
        )
    }

    /// Only the three price inputs can be edited in place.
    pub fn is_editable(self) -> bool {
        matches!(
            self,
            RecordField::BuyPrice | RecordField::SellPriceBase | RecordField::SellPriceAlt
        )
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            RecordField::AffordableWithBase
                | RecordField::AffordableWithAlt
                | RecordField::AffordableQuantity
        )
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for RecordField {
    type Err = LedgerError;

    /// Accepts both the document key (`receive_price`) and the camel-case
    /// name (`buyPrice`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        RecordField::ALL
            .iter()
            .copied()
            .find(|f| f.key() == trimmed || f.camel_name() == trimmed)
            .ok_or_else(|| LedgerError::input("field", format!("unknown field '{}'", trimmed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_has_zero_derived() {
        let rec = TradeRecord::new("Widget", 10.0, 20.0, 25.0);
        assert_eq!(rec.name, "Widget");
        assert_eq!(rec.derived, Derived::default());
        assert!(rec.extra.is_empty());
    }

    #[test]
    fn parses_document_keys_and_camel_names() {
        assert_eq!("receive_price".parse::<RecordField>().unwrap(), RecordField::BuyPrice);
        assert_eq!("buyPrice".parse::<RecordField>().unwrap(), RecordField::BuyPrice);
        assert_eq!(
            "profitBaseToBase".parse::<RecordField>().unwrap(),
            RecordField::ProfitBaseToBase
        );
        assert_eq!(
            " total_profit_c_to_d ".parse::<RecordField>().unwrap(),
            RecordField::TotalProfitBaseToAlt
        );
    }

    #[test]
    fn unknown_field_is_input_error() {
        let err = "colour".parse::<RecordField>().unwrap_err();
        assert!(matches!(err, LedgerError::Input { .. }));
    }

    #[test]
    fn only_prices_are_editable() {
        let editable: Vec<_> = RecordField::ALL.iter().filter(|f| f.is_editable()).collect();
        assert_eq!(editable.len(), 3);
        assert!(!RecordField::Name.is_editable());
        assert!(!RecordField::Name.is_derived());
        assert!(RecordField::AffordableQuantity.is_derived());
    }

    #[test]
    fn keys_are_unique() {
        let mut keys: Vec<_> = RecordField::ALL.iter().map(|f| f.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), RecordField::ALL.len());
    }

    #[test]
    fn numeric_reports_none_for_name_and_missing_ratio() {
        let rec = TradeRecord::new("Widget", 10.0, 20.0, 25.0);
        assert_eq!(rec.numeric(RecordField::Name), None);
        assert_eq!(rec.numeric(RecordField::BuyPrice), Some(10.0));
        assert_eq!(rec.numeric(RecordField::AuxiliaryCostPerProfitAlt), None);
    }

    #[test]
    fn fee_columns_use_legacy_keys() {
        assert_eq!(RecordField::AuxiliaryCost.key(), "receive_coin");
        assert_eq!(RecordField::ConversionFee.key(), "extra_coin");
        assert_eq!(
            "avg_coin_d_extra".parse::<RecordField>().unwrap(),
            RecordField::AuxiliaryCostPerProfitAltWithFee
        );
        assert!(RecordField::RequiredBase.is_derived());
        assert!(!RecordField::SaleProceedsAlt.is_editable());
    }
}
