//! Comma or tab separated text exports, read with `csv`. Every field is kept as text.

use crate::error::ReconcileError;
use crate::model::{Cell, RawSheet, SourceKind};
use crate::source::Source;
use std::io::Cursor;
use std::path::PathBuf;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub struct DelimitedSource {
    kind: SourceKind,
    path: PathBuf,
    delimiter: u8,
}

impl DelimitedSource {
    pub fn new(kind: SourceKind, path: impl Into<PathBuf>, delimiter: u8) -> Self {
        Self {
            kind,
            path: path.into(),
            delimiter,
        }
    }

    fn sheet_name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Source for DelimitedSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn first_sheet(&mut self) -> Result<RawSheet, ReconcileError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            ReconcileError::decode(self.kind, format!("{}: {e}", self.path.display()))
        })?;
        let rows = parse_delimited(&bytes, self.delimiter)
            .map_err(|e| ReconcileError::decode(self.kind, e))?;
        Ok(RawSheet::new(self.sheet_name(), rows))
    }
}

/// Parses delimited text into rows of text cells. There is no header handling: the header row is
/// found later like any other row. Rows may have different lengths.
fn parse_delimited(bytes: &[u8], delimiter: u8) -> Result<Vec<Vec<Cell>>, csv::Error> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(Cursor::new(bytes));

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(Cell::from).collect());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils;
    use tempfile::TempDir;

    #[test]
    fn test_ragged_rows_and_quotes() {
        let data = "Team Activity Details\n\nEmployee ID,Name,Hours\nE1,\"Smith, Anna\",\"7,5\"\n";
        let rows = parse_delimited(data.as_bytes(), b',').unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[2][1], Cell::from("Smith, Anna"));
        assert_eq!(rows[2][2], Cell::from("7,5"));
    }

    #[test]
    fn test_bom_is_ignored() {
        let mut data = UTF8_BOM.to_vec();
        data.extend_from_slice(b"Name\tHours\n");
        let rows = parse_delimited(&data, b'\t').unwrap();
        assert_eq!(rows[0][0], Cell::from("Name"));
    }

    #[tokio::test]
    async fn test_sheet_is_named_after_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("march.csv");
        utils::write(&path, "a,b,\n").await.unwrap();
        let sheet = DelimitedSource::new(SourceKind::TimeLabor, &path, b',')
            .first_sheet()
            .await
            .unwrap();
        assert_eq!(sheet.name(), "march");
        assert_eq!(sheet.row(0).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = DelimitedSource::new(SourceKind::Tempo, dir.path().join("nope.csv"), b',')
            .first_sheet()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("nope.csv"));
    }
}
