//! Normalizes the Time & Labor export into one record per employee, with hours split by TRC
//! category.
//!
//! Category discovery and record building are separate functions over the same rows: the catalog
//! has to exist before the selection can be initialized, and the selection decides which hours
//! are effective.

use crate::model::columns::{HeaderMap, Role};
use crate::model::filter::{CategoryCatalog, CategoryFilter};
use crate::model::hours::parse_hours;
use crate::model::rows::{data_rows, text, Identity};
use crate::model::sheet::RawSheet;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace, warn};

/// Placeholder for validator fields the export does not provide.
pub const NOT_AVAILABLE: &str = "Not Available";

/// Time & Labor hours of one employee.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeRecord {
    pub id: String,
    pub name: String,
    /// The sum of `category_hours` over the selected categories.
    pub effective_hours: f64,
    /// Hours per category code, selected or not. Rows without a category are not a code and
    /// appear nowhere here.
    pub category_hours: BTreeMap<String, f64>,
    pub validator: String,
    pub validation_time: String,
}

/// The outcome of one Time & Labor normalization pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeLaborData {
    records: Vec<EmployeeRecord>,
    index: HashMap<String, usize>,
}

impl TimeLaborData {
    /// Records in the order their id was first seen.
    pub fn records(&self) -> &[EmployeeRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&EmployeeRecord> {
        self.index.get(id).map(|&ix| &self.records[ix])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn entry(&mut self, identity: Identity) -> &mut EmployeeRecord {
        let ix = match self.index.get(&identity.id) {
            Some(&ix) => ix,
            None => {
                let ix = self.records.len();
                self.index.insert(identity.id.clone(), ix);
                self.records.push(EmployeeRecord {
                    id: identity.id,
                    name: identity.name,
                    effective_hours: 0.0,
                    category_hours: BTreeMap::new(),
                    validator: String::new(),
                    validation_time: NOT_AVAILABLE.to_string(),
                });
                ix
            }
        };
        &mut self.records[ix]
    }
}

/// Collects every non-blank category value below `header_row`, whether or not the row belongs to
/// an employee.
pub fn discover_categories(
    sheet: &RawSheet,
    header_row: usize,
    columns: &HeaderMap,
) -> CategoryCatalog {
    let mut catalog = CategoryCatalog::default();
    if !columns.is_resolved(Role::Category) {
        return catalog;
    }
    for (_, row) in data_rows(sheet, header_row) {
        let code = text(columns.cell(Role::Category, row));
        if !code.is_empty() {
            catalog.insert(code);
        }
    }
    debug!("Time & Labor: {} categories", catalog.len());
    catalog
}

/// Builds the Time & Labor records from the rows below `header_row`. Only hours whose category is
/// selected in `filter` count toward `effective_hours`.
pub fn normalize_time_labor(
    sheet: &RawSheet,
    header_row: usize,
    columns: &HeaderMap,
    filter: &CategoryFilter,
) -> TimeLaborData {
    if !columns.is_resolved(Role::Category) {
        warn!("No TRC description column found in the Time & Labor file, no hours will count");
    }

    let mut data = TimeLaborData::default();
    for (ix, row) in data_rows(sheet, header_row) {
        let Some(identity) = Identity::of(row, columns) else {
            trace!("Time & Labor row {ix}: skipped, no employee");
            continue;
        };
        let hours = parse_hours(columns.cell(Role::Hours, row));
        let category = text(columns.cell(Role::Category, row));
        let status = text(columns.cell(Role::Status, row));

        let record = data.entry(identity);
        if !category.is_empty() {
            if filter.is_selected(&category) {
                record.effective_hours += hours;
            }
            *record.category_hours.entry(category).or_insert(0.0) += hours;
        }
        if record.validator.is_empty() && !status.is_empty() {
            record.validator = status;
        }
    }

    for record in data.records.iter_mut() {
        if record.validator.is_empty() {
            record.validator = NOT_AVAILABLE.to_string();
        }
    }

    debug!("Time & Labor: {} employees", data.len());
    data
}
