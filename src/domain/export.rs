//! Flattened record rows for file export.

use crate::domain::record::{RecordField, TradeRecord};

/// Column order of every exported row.
pub const EXPORT_COLUMNS: [RecordField; 19] = RecordField::ALL;

/// Text shown for a ratio that cannot be computed.
pub const NOT_COMPUTABLE: &str = "n/a";

pub fn header() -> Vec<&'static str> {
    EXPORT_COLUMNS.iter().map(|f| f.key()).collect()
}

/// Render one cell: name verbatim, counts as integers, amounts to 2 decimals.
pub fn format_cell(record: &TradeRecord, field: RecordField) -> String {
    if field == RecordField::Name {
        return record.name.clone();
    }
    match record.numeric(field) {
        Some(v) if field.is_integer() => format!("{}", v as u64),
        Some(v) => format!("{:.2}", v),
        None => NOT_COMPUTABLE.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub cells: Vec<String>,
}

impl ExportRow {
    pub fn from_record(record: &TradeRecord) -> Self {
        ExportRow {
            cells: EXPORT_COLUMNS
                .iter()
                .map(|&f| format_cell(record, f))
                .collect(),
        }
    }
}

/// Lazy row iterator over a record slice. Clone it to restart.
#[derive(Debug, Clone)]
pub struct ExportRows<'a> {
    records: &'a [TradeRecord],
    pos: usize,
}

impl<'a> ExportRows<'a> {
    pub fn new(records: &'a [TradeRecord]) -> Self {
        Self { records, pos: 0 }
    }
}

impl Iterator for ExportRows<'_> {
    type Item = ExportRow;

    fn next(&mut self) -> Option<ExportRow> {
        let record = self.records.get(self.pos)?;
        self.pos += 1;
        Some(ExportRow::from_record(record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.records.len() - self.pos;
        (left, Some(left))
    }
}

impl ExactSizeIterator for ExportRows<'_> {}
