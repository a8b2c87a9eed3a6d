//! Orders the reconciled employees and summarizes them.

use crate::model::reconcile::ReconciledEmployee;
use feruca::Collator;
use schemars::JsonSchema;
use serde::Serialize;
use std::cmp::Ordering;

/// The finished result of one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct Report {
    /// Discrepancies first (by status rank), then OK rows; names ascending within each status.
    pub employees: Vec<ReconciledEmployee>,
    /// The number of employees whose status is not OK.
    pub discrepancy_count: usize,
    /// The number of Tempo rows dropped as ADM Free Days entries.
    pub excluded_entry_count: usize,
}

impl Report {
    pub fn discrepancies(&self) -> impl Iterator<Item = &ReconciledEmployee> {
        self.employees.iter().filter(|e| e.status.is_discrepancy())
    }
}

pub fn assemble_report(mut employees: Vec<ReconciledEmployee>, excluded_entries: usize) -> Report {
    let mut collator = Collator::default();
    employees.sort_by(|a, b| {
        a.status
            .rank()
            .cmp(&b.status.rank())
            .then_with(|| compare_names(&mut collator, &a.name, &b.name))
    });
    let discrepancy_count = employees
        .iter()
        .filter(|e| e.status.is_discrepancy())
        .count();
    Report {
        employees,
        discrepancy_count,
        excluded_entry_count: excluded_entries,
    }
}

/// Unicode collation order (CLDR root), so accented initials sort with their base letter. When
/// two names differ only by case the lower-case one comes first.
fn compare_names(collator: &mut Collator, a: &str, b: &str) -> Ordering {
    collator.collate(a, b).then_with(|| b.cmp(a))
}
