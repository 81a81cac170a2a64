//! CSV export of ledger rows.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::error::LedgerError;
use crate::domain::export::{header, ExportRow};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write a header and one line per row. Returns the number of rows written.
pub fn write_rows<W, I>(mut out: W, rows: I, bom: bool) -> Result<usize, csv::Error>
where
    W: Write,
    I: IntoIterator<Item = ExportRow>,
{
    if bom {
        out.write_all(UTF8_BOM)?;
    }
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(header())?;

    let mut count = 0;
    for row in rows {
        wtr.write_record(&row.cells)?;
        count += 1;
    }
    wtr.flush()?;
    Ok(count)
}

/// Export to `path`. Any failure is reported as `Persistence` naming the file.
pub fn export_to_file<I>(path: &Path, rows: I, bom: bool) -> Result<usize, LedgerError>
where
    I: IntoIterator<Item = ExportRow>,
{
    let failed = |reason: String| LedgerError::Persistence {
        path: path.display().to_string(),
        reason,
    };
    let file = File::create(path).map_err(|e| failed(e.to_string()))?;
    write_rows(BufWriter::new(file), rows, bom).map_err(|e| failed(e.to_string()))
}
