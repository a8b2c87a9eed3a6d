//! Normalizes the Tempo activity log into one aggregate per employee.

use crate::model::columns::{HeaderMap, Role};
use crate::model::hours::parse_hours;
use crate::model::rows::{data_rows, text, Identity};
use crate::model::sheet::RawSheet;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Tempo task text (lower-cased) that marks non-working administrative days. These rows are
/// dropped and counted.
pub const ADM_FREE_DAYS: &str = "adm free days";

/// Total Tempo hours of one employee.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeAggregate {
    pub id: String,
    /// The first non-blank name seen for this id. Blank when no row of the id had a name.
    pub name: String,
    pub total_hours: f64,
}

/// The outcome of one Tempo normalization pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TempoData {
    employees: Vec<EmployeeAggregate>,
    index: HashMap<String, usize>,
    excluded_entries: usize,
}

impl TempoData {
    /// Aggregates in the order their id was first seen.
    pub fn employees(&self) -> &[EmployeeAggregate] {
        &self.employees
    }

    pub fn get(&self, id: &str) -> Option<&EmployeeAggregate> {
        self.index.get(id).map(|&ix| &self.employees[ix])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// The number of rows dropped because they were ADM Free Days entries.
    pub fn excluded_entries(&self) -> usize {
        self.excluded_entries
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    fn add(&mut self, identity: Identity, hours: f64) {
        match self.index.get(&identity.id) {
            Some(&ix) => {
                let employee = &mut self.employees[ix];
                employee.total_hours += hours;
                if employee.name.is_empty() {
                    employee.name = identity.name;
                }
            }
            None => {
                self.index.insert(identity.id.clone(), self.employees.len());
                self.employees.push(EmployeeAggregate {
                    id: identity.id,
                    name: identity.name,
                    total_hours: hours,
                });
            }
        }
    }
}

/// Builds the Tempo aggregates from the rows below `header_row`.
///
/// The ADM Free Days check runs first, so such a row is counted as excluded even when it would
/// also have been dropped for a blank id or a total name.
pub fn normalize_tempo(sheet: &RawSheet, header_row: usize, columns: &HeaderMap) -> TempoData {
    let mut data = TempoData::default();
    let checks_category = columns.is_resolved(Role::Category);

    for (ix, row) in data_rows(sheet, header_row) {
        if checks_category {
            let task = text(columns.cell(Role::Category, row)).to_lowercase();
            if task.contains(ADM_FREE_DAYS) {
                trace!("Tempo row {ix}: excluded ADM Free Days entry");
                data.excluded_entries += 1;
                continue;
            }
        }
        let Some(identity) = Identity::of(row, columns) else {
            trace!("Tempo row {ix}: skipped, no employee");
            continue;
        };
        let hours = parse_hours(columns.cell(Role::Hours, row));
        data.add(identity, hours);
    }

    debug!(
        "Tempo: {} employees, {} ADM Free Days entries excluded",
        data.len(),
        data.excluded_entries
    );
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::columns::resolve_columns;
    use crate::model::SourceKind;

    fn normalize(rows: Vec<Vec<&str>>) -> TempoData {
        let sheet = RawSheet::new("Tempo", rows);
        let columns = resolve_columns(SourceKind::Tempo, &sheet, 0).unwrap();
        normalize_tempo(&sheet, 0, &columns)
    }

    #[test]
    fn test_aggregates_by_id() {
        let data = normalize(vec![
            vec!["Employee ID", "Name", "Hours", "Task"],
            vec!["E1", "Alice", "7,5", "Dev"],
            vec!["E2", "Bob", "8", "Dev"],
            vec!["E1", "Alice Smith", "2.5", "Review"],
        ]);
        assert_eq!(data.len(), 2);
        let alice = data.get("E1").unwrap();
        assert_eq!(alice.total_hours, 10.0);
        assert_eq!(alice.name, "Alice");
        assert_eq!(data.employees()[1].id, "E2");
        assert_eq!(data.excluded_entries(), 0);
    }

    #[test]
    fn test_adm_free_days_are_counted_and_dropped() {
        let data = normalize(vec![
            vec!["Employee ID", "Name", "Hours", "Task"],
            vec!["E1", "Alice", "8", "ADM Free Days - Holiday"],
            vec!["E1", "Alice", "4", "Dev"],
            vec!["", "", "8", "adm free days"],
            vec!["E9", "Total", "8", "Adm Free Days"],
        ]);
        assert_eq!(data.excluded_entries(), 3);
        assert_eq!(data.get("E1").unwrap().total_hours, 4.0);
        assert!(!data.contains("E9"));
    }

    #[test]
    fn test_no_task_column_means_no_exclusions() {
        let data = normalize(vec![
            vec!["Employee ID", "Name", "Hours"],
            vec!["E1", "Alice", "8", "adm free days"],
        ]);
        assert_eq!(data.excluded_entries(), 0);
        assert_eq!(data.get("E1").unwrap().total_hours, 8.0);
    }

    #[test]
    fn test_first_non_blank_name_wins() {
        let data = normalize(vec![
            vec!["Employee ID", "Name", "Hours"],
            vec!["E1", "", "1"],
            vec!["E1", "Alice", "2"],
            vec!["E1", "Alice Smith", "3"],
        ]);
        let alice = data.get("E1").unwrap();
        assert_eq!(alice.name, "Alice");
        assert_eq!(alice.total_hours, 6.0);
    }

    #[test]
    fn test_malformed_hours_count_as_zero() {
        let data = normalize(vec![
            vec!["Employee ID", "Name", "Hours"],
            vec!["E1", "Alice", "eight"],
            vec!["E1", "Alice", "1"],
        ]);
        assert_eq!(data.get("E1").unwrap().total_hours, 1.0);
    }
}
