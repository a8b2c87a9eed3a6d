//! Row-level rules shared by both normalizers.

use crate::error::ReconcileError;
use crate::model::columns::{HeaderMap, Role};
use crate::model::sheet::{Cell, RawSheet};
use crate::model::SourceKind;
use tracing::trace;

/// Rows whose name reads like this (ignoring case) are report totals, not employees.
pub const TOTAL_ROW: &str = "TOTAL";

/// The rows below `header_row` that have at least one cell, with their sheet row index. Copies of
/// the header row, which multi-page exports repeat at every page break, are skipped.
pub(crate) fn data_rows(
    sheet: &RawSheet,
    header_row: usize,
) -> impl Iterator<Item = (usize, &[Cell])> + '_ {
    let header = sheet.row(header_row).unwrap_or_default();
    sheet
        .rows()
        .iter()
        .enumerate()
        .skip(header_row + 1)
        .filter(|(_, row)| !row.is_empty())
        .filter(move |(ix, row)| {
            let repeated = same_text(row, header);
            if repeated {
                trace!("Row {ix}: skipped, repeated header");
            }
            !repeated
        })
        .map(|(ix, row)| (ix, row.as_slice()))
}

/// True when both rows hold the same trimmed text, ignoring case.
fn same_text(a: &[Cell], b: &[Cell]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| {
            x.to_text().trim().to_lowercase() == y.to_text().trim().to_lowercase()
        })
}

/// Fails with `EmptySheet` when there is nothing below the header row.
pub(crate) fn ensure_data_rows(
    kind: SourceKind,
    sheet: &RawSheet,
    header_row: usize,
) -> Result<(), ReconcileError> {
    match data_rows(sheet, header_row).next() {
        Some(_) => Ok(()),
        None => Err(ReconcileError::EmptySheet { kind }),
    }
}

/// The trimmed text of a cell, or an empty string when there is no cell.
pub(crate) fn text(cell: Option<&Cell>) -> String {
    cell.map(|c| c.to_text().trim().to_string())
        .unwrap_or_default()
}

/// The id and name of the employee a row belongs to.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct Identity {
    pub(crate) id: String,
    pub(crate) name: String,
}

impl Identity {
    /// Returns `None` for rows that do not belong to an employee: rows with a blank id and total
    /// rows.
    pub(crate) fn of(row: &[Cell], columns: &HeaderMap) -> Option<Self> {
        let id = text(columns.cell(Role::Id, row));
        if id.is_empty() {
            return None;
        }
        let name = text(columns.cell(Role::Name, row));
        if name.to_uppercase() == TOTAL_ROW {
            return None;
        }
        Some(Self { id, name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::columns::resolve_columns;

    fn sheet() -> RawSheet {
        RawSheet::new(
            "s",
            vec![
                vec!["Employee ID", "Name", "Hours"],
                vec!["E1", "Alice", "1"],
                vec![],
                vec!["", "Nobody", "2"],
                vec!["   ", "Blank", "2"],
                vec!["E9", "Total", "3"],
                vec!["E2", " Bob ", "4"],
            ],
        )
    }

    #[test]
    fn test_data_rows_skip_header_and_empty_rows() {
        let s = sheet();
        let indexes: Vec<usize> = data_rows(&s, 0).map(|(ix, _)| ix).collect();
        assert_eq!(indexes, vec![1, 3, 4, 5, 6]);
    }

    #[test]
    fn test_identity_exclusions() {
        let s = sheet();
        let columns = resolve_columns(SourceKind::Tempo, &s, 0).unwrap();
        let ids: Vec<Identity> = data_rows(&s, 0)
            .filter_map(|(_, row)| Identity::of(row, &columns))
            .collect();
        assert_eq!(
            ids,
            vec![
                Identity {
                    id: "E1".into(),
                    name: "Alice".into()
                },
                Identity {
                    id: "E2".into(),
                    name: "Bob".into()
                },
            ]
        );
    }

    #[test]
    fn test_repeated_header_rows_are_skipped() {
        let s = RawSheet::new(
            "s",
            vec![
                vec!["Employee ID", "Name", "Hours"],
                vec!["E1", "Alice", "1"],
                vec!["Employee ID", "Name", "Hours"],
                vec!["employee id ", "NAME", "hours"],
                vec!["E2", "Bob", "2"],
            ],
        );
        let indexes: Vec<usize> = data_rows(&s, 0).map(|(ix, _)| ix).collect();
        assert_eq!(indexes, vec![1, 4]);

        let only_headers = RawSheet::new(
            "s",
            vec![vec!["Employee ID", "Name", "Hours"], vec!["Employee ID", "Name", "Hours"]],
        );
        assert!(ensure_data_rows(SourceKind::Tempo, &only_headers, 0).is_err());
    }

    #[test]
    fn test_header_only_sheet_is_empty() {
        let s = RawSheet::new("s", vec![vec!["Employee ID", "Name", "Hours"], vec![]]);
        let err = ensure_data_rows(SourceKind::Tempo, &s, 0).unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::EmptySheet {
                kind: SourceKind::Tempo
            }
        ));
        assert!(ensure_data_rows(SourceKind::Tempo, &sheet(), 0).is_ok());
    }
}
