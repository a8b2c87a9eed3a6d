//! Finds the header row of a loosely structured export.
//!
//! Exports from both systems often carry a title block (report name, run date, filters) above the
//! real column headers, so the header row cannot be assumed to be the first row.

use crate::model::sheet::{Cell, RawSheet};
use tracing::trace;

/// Only this many rows, counted from the top of the sheet, are considered as header candidates.
pub const HEADER_SCAN_ROWS: usize = 10;

/// A row needs at least this many keyword hits to be accepted as the header row.
pub const HEADER_MIN_HITS: usize = 3;

const HEADER_KEYWORDS: &[&str] = &["name", "id", "hours", "employee", "date", "task", "project"];

/// Returns the index of the first row, among the first `HEADER_SCAN_ROWS`, that has at least
/// `HEADER_MIN_HITS` cells containing a header keyword. Falls back to row `0`, which is also the
/// answer for an empty sheet.
pub fn locate_header_row(sheet: &RawSheet) -> usize {
    let found = sheet
        .rows()
        .iter()
        .take(HEADER_SCAN_ROWS)
        .position(|row| keyword_hits(row) >= HEADER_MIN_HITS);
    match found {
        Some(ix) => {
            trace!("Header row of '{}' found at index {ix}", sheet.name());
            ix
        }
        None => {
            trace!("No header row found in '{}', using row 0", sheet.name());
            0
        }
    }
}

fn keyword_hits(row: &[Cell]) -> usize {
    row.iter()
        .filter(|cell| !cell.is_blank())
        .filter(|cell| {
            let text = cell.to_text().to_lowercase();
            HEADER_KEYWORDS.iter().any(|keyword| text.contains(keyword))
        })
        .count()
}
