//! Spreadsheet workbooks (xlsx, xlsm, xlsb, xls, ods) decoded with `calamine`.

use crate::error::ReconcileError;
use crate::model::{Cell, RawSheet, SourceKind};
use crate::source::Source;
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::{Path, PathBuf};
use tracing::trace;

pub struct WorkbookSource {
    kind: SourceKind,
    path: PathBuf,
}

impl WorkbookSource {
    pub fn new(kind: SourceKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

#[async_trait::async_trait]
impl Source for WorkbookSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn first_sheet(&mut self) -> Result<RawSheet, ReconcileError> {
        let kind = self.kind;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_first_sheet(kind, &path))
            .await
            .map_err(|e| ReconcileError::decode(kind, e))?
    }
}

fn read_first_sheet(kind: SourceKind, path: &Path) -> Result<RawSheet, ReconcileError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ReconcileError::decode(kind, format!("{}: {e}", path.display())))?;
    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ReconcileError::decode(kind, "the workbook contains no sheets"))?;
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| ReconcileError::decode(kind, format!("sheet '{name}': {e}")))?;
    trace!("Read sheet '{name}' of {}", path.display());
    Ok(RawSheet::new(name, to_rows(&range)))
}

/// Converts a calamine range into rows addressed from cell A1. A range that starts further down
/// or to the right is padded with empty rows and cells.
fn to_rows(range: &Range<Data>) -> Vec<Vec<Cell>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };
    let mut rows: Vec<Vec<Cell>> = (0..start_row).map(|_| Vec::new()).collect();
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col as usize];
        cells.extend(row.iter().map(to_cell));
        rows.push(cells);
    }
    rows
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::from(*n),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) => Cell::from(s.as_str()),
        Data::DurationIso(s) => Cell::from(s.as_str()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}
