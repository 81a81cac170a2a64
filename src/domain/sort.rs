//! Display ordering for ledger rows.
//!
//! Sorting never touches the canonical record order; it only produces a view
//! whose rows still carry their canonical index.

use std::cmp::Ordering;

use crate::domain::record::{RecordField, TradeRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub field: Option<RecordField>,
    pub descending: bool,
}

impl SortState {
    /// Sorting the same field again flips direction; a new field starts ascending.
    pub fn toggle(&mut self, field: RecordField) {
        self.descending = if self.field == Some(field) {
            !self.descending
        } else {
            false
        };
        self.field = Some(field);
    }
}

/// A record as shown to the user, paired with its canonical index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowView<'a> {
    pub index: usize,
    pub record: &'a TradeRecord,
}

fn compare(a: &TradeRecord, b: &TradeRecord, field: RecordField) -> Ordering {
    if field == RecordField::Name {
        return a.name.cmp(&b.name);
    }
    // Not-computable values sort after every number.
    match (a.numeric(field), b.numeric(field)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort of `records` by `state`; ties keep canonical order in both directions.
pub fn view<'a>(records: &'a [TradeRecord], state: SortState) -> Vec<RowView<'a>> {
    let mut rows: Vec<RowView<'a>> = records
        .iter()
        .enumerate()
        .map(|(index, record)| RowView { index, record })
        .collect();

    if let Some(field) = state.field {
        if state.descending {
            rows.sort_by(|a, b| compare(b.record, a.record, field));
        } else {
            rows.sort_by(|a, b| compare(a.record, b.record, field));
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, buy: f64) -> TradeRecord {
        TradeRecord::new(name, buy, 0.0, 0.0)
    }

    fn names(rows: &[RowView<'_>]) -> Vec<String> {
        rows.iter().map(|r| r.record.name.clone()).collect()
    }

    #[test]
    fn toggle_same_field_flips() {
        let mut s = SortState::default();
        s.toggle(RecordField::BuyPrice);
        assert!(!s.descending);
        s.toggle(RecordField::BuyPrice);
        assert!(s.descending);
        s.toggle(RecordField::BuyPrice);
        assert!(!s.descending);
    }

    #[test]
    fn toggle_new_field_resets_to_ascending() {
        let mut s = SortState::default();
        s.toggle(RecordField::BuyPrice);
        s.toggle(RecordField::BuyPrice);
        assert!(s.descending);
        s.toggle(RecordField::Name);
        assert_eq!(s.field, Some(RecordField::Name));
        assert!(!s.descending);
    }

    #[test]
    fn unsorted_view_is_canonical_order() {
        let records = vec![rec("b", 2.0), rec("a", 1.0)];
        let rows = view(&records, SortState::default());
        assert_eq!(names(&rows), vec!["b", "a"]);
        assert_eq!(rows[0].index, 0);
    }

    #[test]
    fn ascending_and_descending_are_stable() {
        let records = vec![rec("first", 5.0), rec("low", 1.0), rec("second", 5.0)];
        let asc = view(
            &records,
            SortState {
                field: Some(RecordField::BuyPrice),
                descending: false,
            },
        );
        assert_eq!(names(&asc), vec!["low", "first", "second"]);

        let desc = view(
            &records,
            SortState {
                field: Some(RecordField::BuyPrice),
                descending: true,
            },
        );
        assert_eq!(names(&desc), vec!["first", "second", "low"]);
        assert_eq!(desc[2].index, 1);
    }

    #[test]
    fn sorts_by_name() {
        let records = vec![rec("Scarab", 1.0), rec("Divine", 1.0), rec("Chaos", 1.0)];
        let rows = view(
            &records,
            SortState {
                field: Some(RecordField::Name),
                descending: false,
            },
        );
        assert_eq!(names(&rows), vec!["Chaos", "Divine", "Scarab"]);
    }

    #[test]
    fn not_computable_sorts_last() {
        let mut with_ratio = rec("ratio", 1.0);
        with_ratio.derived.auxiliary_cost_per_profit_base = Some(3.0);
        let without = rec("none", 1.0);
        let records = vec![without, with_ratio];
        let rows = view(
            &records,
            SortState {
                field: Some(RecordField::AuxiliaryCostPerProfitBase),
                descending: false,
            },
        );
        assert_eq!(names(&rows), vec!["ratio", "none"]);
    }
}
