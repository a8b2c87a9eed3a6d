//! Turns input files into `RawSheet`s. Only the first sheet of a workbook is ever read.
//!
//! Decoding is the only IO the engine depends on, so it sits behind the `Source` trait. The two
//! files of a comparison are decoded concurrently and joined before the engine runs.

mod delimited;
mod memory;
mod workbook;

pub use delimited::DelimitedSource;
pub use memory::MemorySource;
pub use workbook::WorkbookSource;

use crate::error::ReconcileError;
use crate::model::{RawSheet, SourceKind};
use std::path::Path;
use tracing::debug;

/// Something that can produce the first sheet of a Tempo or Time & Labor export.
#[async_trait::async_trait]
pub trait Source: Send {
    /// Which export this source holds.
    fn kind(&self) -> SourceKind;

    /// Decodes and returns the first sheet.
    async fn first_sheet(&mut self) -> Result<RawSheet, ReconcileError>;
}

/// Chooses a decoder for `path` by its extension.
pub fn open(kind: SourceKind, path: impl AsRef<Path>) -> Result<Box<dyn Source>, ReconcileError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "csv" | "txt" => Ok(Box::new(DelimitedSource::new(kind, path, b','))),
        "tsv" => Ok(Box::new(DelimitedSource::new(kind, path, b'\t'))),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Box::new(WorkbookSource::new(kind, path))),
        other => Err(ReconcileError::decode(
            kind,
            format!(
                "unsupported file type '{other}' for {}, expected xlsx, xls, ods or csv",
                path.display()
            ),
        )),
    }
}

/// Decodes the Tempo and Time & Labor sources concurrently. Fails with the first error.
pub async fn load_pair(
    tempo: &mut dyn Source,
    time_labor: &mut dyn Source,
) -> Result<(RawSheet, RawSheet), ReconcileError> {
    let (tempo, time_labor) = tokio::try_join!(tempo.first_sheet(), time_labor.first_sheet())?;
    debug!(
        "Decoded '{}' ({} rows) and '{}' ({} rows)",
        tempo.name(),
        tempo.len(),
        time_labor.name(),
        time_labor.len()
    );
    Ok((tempo, time_labor))
}

/// Opens and decodes both files.
pub async fn load_files(
    tempo: impl AsRef<Path>,
    time_labor: impl AsRef<Path>,
) -> Result<(RawSheet, RawSheet), ReconcileError> {
    let mut tempo = open(SourceKind::Tempo, tempo)?;
    let mut time_labor = open(SourceKind::TimeLabor, time_labor)?;
    load_pair(tempo.as_mut(), time_labor.as_mut()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils;
    use tempfile::TempDir;

    #[test]
    fn test_open_rejects_unknown_extension() {
        let err = open(SourceKind::Tempo, "report.pdf").err().unwrap();
        assert!(matches!(
            err,
            ReconcileError::Decode {
                kind: SourceKind::Tempo,
                ..
            }
        ));
        assert!(open(SourceKind::Tempo, "report.XLSX").is_ok());
        assert!(open(SourceKind::TimeLabor, "report.csv").is_ok());
    }

    #[tokio::test]
    async fn test_load_files() {
        let dir = TempDir::new().unwrap();
        let tempo = dir.path().join("tempo.csv");
        let time_labor = dir.path().join("tl.tsv");
        utils::write(&tempo, "Employee ID,Name,Hours\nE1,Alice,\"7,5\"\n")
            .await
            .unwrap();
        utils::write(&time_labor, "Employee Name\tEmpl ID\tHours\nAlice\tE1\t7.5\n")
            .await
            .unwrap();

        let (tempo, time_labor) = load_files(&tempo, &time_labor).await.unwrap();
        assert_eq!(tempo.len(), 2);
        assert_eq!(time_labor.row(1).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_load_pair_reports_failing_side() {
        let dir = TempDir::new().unwrap();
        let tempo = dir.path().join("tempo.csv");
        utils::write(&tempo, "a,b\n").await.unwrap();
        let err = load_files(&tempo, dir.path().join("missing.xlsx"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::Decode {
                kind: SourceKind::TimeLabor,
                ..
            }
        ));
    }
}
