//! Derived-field formulas.
//!
//! Everything here is a pure function of a record's prices and the ledger's
//! [`Resources`]. Amounts keep full precision; rounding is a display concern.

use crate::domain::record::{Derived, TradeRecord};

/// Ledger-wide inputs that every record's derived fields depend on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resources {
    /// On-hand quantity of the base currency.
    pub on_hand_base: f64,
    /// On-hand quantity of the alternate currency.
    pub on_hand_alt: f64,
    /// Alternate to base conversion factor.
    pub exchange_ratio: f64,
    /// Flat side cost per unit traded.
    pub auxiliary_unit_cost: f64,
    /// Flat fee per unit for converting alt proceeds back to base.
    pub conversion_fee_per_unit: f64,
}

impl Default for Resources {
    fn default() -> Self {
        Resources {
            on_hand_base: 0.0,
            on_hand_alt: 0.0,
            exchange_ratio: 1.0,
            auxiliary_unit_cost: 0.0,
            conversion_fee_per_unit: 0.0,
        }
    }
}

/// Units of `buy_price` that `budget` covers, or 0 when the price is not positive.
pub fn affordable(budget: f64, buy_price: f64) -> u64 {
    if buy_price > 0.0 && budget > 0.0 {
        (budget / buy_price).floor() as u64
    } else {
        0
    }
}

/// `numerator / denominator`, or `None` when the denominator is zero or negative.
pub fn per_unit_of(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 {
        Some(numerator / denominator)
    } else {
        None
    }
}

pub fn derive(buy_price: f64, sell_price_base: f64, sell_price_alt: f64, res: &Resources) -> Derived {
    let profit_base_to_base = sell_price_base - buy_price;
    let alt_value_in_base = sell_price_alt * res.exchange_ratio;
    let profit_base_to_alt = alt_value_in_base - buy_price;

    let affordable_with_base = affordable(res.on_hand_base, buy_price);
    let affordable_with_alt = affordable(res.on_hand_alt * res.exchange_ratio, buy_price);
    let affordable_quantity = affordable_with_base.max(affordable_with_alt);
    let quantity = affordable_quantity as f64;

    let total_profit_base_to_base = profit_base_to_base * quantity;
    let total_profit_base_to_alt = profit_base_to_alt * quantity;

    let auxiliary_cost = res.auxiliary_unit_cost * quantity;
    let conversion_fee = res.conversion_fee_per_unit * quantity;

    Derived {
        profit_base_to_base,
        profit_base_to_alt,
        affordable_with_base,
        affordable_with_alt,
        affordable_quantity,
        total_profit_base_to_base,
        total_profit_base_to_alt,
        auxiliary_cost,
        auxiliary_cost_per_profit_base: per_unit_of(auxiliary_cost, total_profit_base_to_base),
        auxiliary_cost_per_profit_alt: per_unit_of(auxiliary_cost, total_profit_base_to_alt),
        required_base: buy_price * quantity,
        sale_proceeds_base: sell_price_base * quantity,
        sale_proceeds_alt: alt_value_in_base * quantity,
        conversion_fee,
        auxiliary_cost_per_profit_alt_with_fee: per_unit_of(
            auxiliary_cost + conversion_fee,
            total_profit_base_to_alt,
        ),
    }
}

/// Recompute a record's derived fields in place.
pub fn recompute(record: &mut TradeRecord, res: &Resources) {
    record.derived = derive(
        record.buy_price,
        record.sell_price_base,
        record.sell_price_alt,
        res,
    );
}

/// Row highlighting bucket based on the better of the two total profits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfitTier {
    Normal,
    Elevated,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierThresholds {
    pub elevated: f64,
    pub high: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        TierThresholds {
            elevated: 1000.0,
            high: 2000.0,
        }
    }
}

impl TierThresholds {
    pub fn classify(&self, derived: &Derived) -> ProfitTier {
        let best = derived
            .total_profit_base_to_base
            .max(derived.total_profit_base_to_alt);
        if best > self.high {
            ProfitTier::High
        } else if best > self.elevated {
            ProfitTier::Elevated
        } else {
            ProfitTier::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn resources(base: f64, alt: f64, ratio: f64) -> Resources {
        Resources {
            on_hand_base: base,
            on_hand_alt: alt,
            exchange_ratio: ratio,
            auxiliary_unit_cost: 0.0,
            conversion_fee_per_unit: 0.0,
        }
    }

    #[test]
    fn widget_scenario() {
        let d = derive(10.0, 20.0, 25.0, &resources(100.0, 0.0, 1.0));
        assert_relative_eq!(d.profit_base_to_base, 10.0);
        assert_relative_eq!(d.profit_base_to_alt, 15.0);
        assert_eq!(d.affordable_with_base, 10);
        assert_eq!(d.affordable_with_alt, 0);
        assert_eq!(d.affordable_quantity, 10);
        assert_relative_eq!(d.total_profit_base_to_base, 100.0);
        assert_relative_eq!(d.total_profit_base_to_alt, 150.0);
    }

    #[test]
    fn ratio_scales_alt_profit() {
        let d = derive(10.0, 20.0, 25.0, &resources(100.0, 0.0, 2.0));
        assert_relative_eq!(d.profit_base_to_alt, 40.0);
    }

    #[test]
    fn alt_holdings_convert_through_ratio() {
        let d = derive(30.0, 35.0, 0.2, &resources(50.0, 3.0, 150.0));
        assert_eq!(d.affordable_with_base, 1);
        assert_eq!(d.affordable_with_alt, 15);
        assert_eq!(d.affordable_quantity, 15);
    }

    #[test]
    fn zero_buy_price_affords_nothing() {
        let d = derive(0.0, 5.0, 1.0, &resources(1000.0, 10.0, 100.0));
        assert_eq!(d.affordable_quantity, 0);
        assert_relative_eq!(d.total_profit_base_to_base, 0.0);
    }

    #[test]
    fn affordable_floors() {
        assert_eq!(affordable(99.9, 10.0), 9);
        assert_eq!(affordable(100.0, 10.0), 10);
        assert_eq!(affordable(5.0, 0.0), 0);
        assert_eq!(affordable(-5.0, 1.0), 0);
    }

    #[test]
    fn auxiliary_cost_amortizes_over_profit() {
        let res = Resources {
            auxiliary_unit_cost: 25.0,
            ..resources(100.0, 0.0, 1.0)
        };
        let d = derive(10.0, 20.0, 25.0, &res);
        assert_relative_eq!(d.auxiliary_cost, 250.0);
        assert_relative_eq!(d.auxiliary_cost_per_profit_base.unwrap(), 2.5);
        assert_relative_eq!(d.auxiliary_cost_per_profit_alt.unwrap(), 250.0 / 150.0);
        assert_relative_eq!(d.conversion_fee, 0.0);
    }

    #[test]
    fn conversion_fee_is_separate_from_auxiliary_cost() {
        let res = Resources {
            auxiliary_unit_cost: 5.0,
            conversion_fee_per_unit: 25.0,
            ..resources(100.0, 0.0, 1.0)
        };
        let d = derive(10.0, 20.0, 25.0, &res);
        assert_relative_eq!(d.auxiliary_cost, 50.0);
        assert_relative_eq!(d.conversion_fee, 250.0);
        assert_relative_eq!(d.required_base, 100.0);
        assert_relative_eq!(d.sale_proceeds_base, 200.0);
        assert_relative_eq!(d.sale_proceeds_alt, 250.0);
        assert_relative_eq!(d.auxiliary_cost_per_profit_alt.unwrap(), 50.0 / 150.0);
        assert_relative_eq!(d.auxiliary_cost_per_profit_alt_with_fee.unwrap(), 300.0 / 150.0);
    }

    #[test]
    fn loss_making_flip_has_no_cost_ratio() {
        let res = Resources {
            auxiliary_unit_cost: 25.0,
            ..resources(100.0, 0.0, 1.0)
        };
        let d = derive(10.0, 8.0, 10.0, &res);
        assert!(d.total_profit_base_to_base < 0.0);
        assert_eq!(d.auxiliary_cost_per_profit_base, None);
        assert_eq!(d.auxiliary_cost_per_profit_alt, None);
        assert_eq!(d.auxiliary_cost_per_profit_alt_with_fee, None);
    }

    #[test]
    fn per_unit_of_rejects_non_positive() {
        assert_eq!(per_unit_of(10.0, 0.0), None);
        assert_eq!(per_unit_of(10.0, -1.0), None);
        assert_eq!(per_unit_of(10.0, 4.0), Some(2.5));
    }

    #[test]
    fn tier_thresholds() {
        let t = TierThresholds::default();
        let mut d = Derived::default();
        assert_eq!(t.classify(&d), ProfitTier::Normal);
        d.total_profit_base_to_alt = 1500.0;
        assert_eq!(t.classify(&d), ProfitTier::Elevated);
        d.total_profit_base_to_base = 2000.01;
        assert_eq!(t.classify(&d), ProfitTier::High);
        d.total_profit_base_to_base = 1000.0;
        d.total_profit_base_to_alt = 1000.0;
        assert_eq!(t.classify(&d), ProfitTier::Normal);
    }
}
