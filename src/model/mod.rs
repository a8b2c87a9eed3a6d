//! The reconciliation engine: header detection, column resolution, row normalization, the outer
//! join and report assembly. Everything here is synchronous and operates on already decoded sheets.
mod columns;
mod filter;
mod header;
mod hours;
mod reconcile;
mod report;
mod rows;
mod sheet;
mod tempo;
mod time_labor;

pub use columns::{resolve_columns, resolve_headers, HeaderMap, Role, REQUIRED_ROLES};
pub use filter::{CategoryCatalog, CategoryFilter};
pub use header::{locate_header_row, HEADER_MIN_HITS, HEADER_SCAN_ROWS};
pub use hours::parse_hours;
pub use reconcile::{reconcile, ReconciledEmployee, Status, HOURS_TOLERANCE, NOT_APPLICABLE};
pub use report::{assemble_report, Report};
pub(crate) use rows::ensure_data_rows;
pub use rows::TOTAL_ROW;
pub use sheet::{Cell, RawSheet};
pub use tempo::{normalize_tempo, EmployeeAggregate, TempoData, ADM_FREE_DAYS};
pub use time_labor::{
    discover_categories, normalize_time_labor, EmployeeRecord, TimeLaborData, NOT_AVAILABLE,
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Which of the two exports a sheet came from.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Tempo,
    TimeLabor,
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Tempo => f.write_str("Tempo"),
            SourceKind::TimeLabor => f.write_str("Time & Labor"),
        }
    }
}
