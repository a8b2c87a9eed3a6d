//! Full outer join of the Tempo aggregates and the Time & Labor records on employee id.

use crate::model::tempo::{EmployeeAggregate, TempoData};
use crate::model::time_labor::{EmployeeRecord, TimeLaborData};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt::{Display, Formatter};
use tracing::{debug, warn};

/// Two totals that differ by more than this are a mismatch. A difference of exactly this much is
/// still OK.
pub const HOURS_TOLERANCE: f64 = 0.01;

/// Differences are rounded to this many decimal places before they are compared or reported, so
/// float noise such as `1.01 - 1.0 = 0.010000000000000009` does not cross the tolerance.
const DIFFERENCE_DECIMALS: i32 = 6;

/// Validator placeholder for employees that have no Time & Labor record at all.
pub const NOT_APPLICABLE: &str = "N/A";

/// The reconciliation outcome of one employee.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    HoursMismatch,
    MissingInTimeLabor,
    MissingInTempo,
}

impl Status {
    /// Sort priority: discrepancies first, the most actionable kind first.
    pub fn rank(self) -> u8 {
        match self {
            Status::HoursMismatch => 1,
            Status::MissingInTimeLabor => 2,
            Status::MissingInTempo => 3,
            Status::Ok => 4,
        }
    }

    pub fn is_discrepancy(self) -> bool {
        self != Status::Ok
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::HoursMismatch => "Hours Mismatch",
            Status::MissingInTimeLabor => "Missing in Time & Labor",
            Status::MissingInTempo => "Missing in Tempo",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the reconciliation result.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ReconciledEmployee {
    pub id: String,
    pub name: String,
    pub tempo_hours: f64,
    pub time_labor_hours: f64,
    /// `tempo_hours - time_labor_hours`. Positive means more hours in Tempo.
    pub difference: f64,
    pub category_hours: BTreeMap<String, f64>,
    pub status: Status,
    pub validator: String,
    pub validation_time: String,
}

impl ReconciledEmployee {
    fn matched(tempo: &EmployeeAggregate, record: &EmployeeRecord) -> Self {
        let difference = round_difference(tempo.total_hours - record.effective_hours);
        let status = if difference.abs() > HOURS_TOLERANCE {
            Status::HoursMismatch
        } else {
            Status::Ok
        };
        let name = if tempo.name.is_empty() {
            &record.name
        } else {
            &tempo.name
        };
        Self {
            id: tempo.id.clone(),
            name: name.clone(),
            tempo_hours: tempo.total_hours,
            time_labor_hours: record.effective_hours,
            difference,
            category_hours: record.category_hours.clone(),
            status,
            validator: record.validator.clone(),
            validation_time: record.validation_time.clone(),
        }
    }

    fn tempo_only(tempo: &EmployeeAggregate) -> Self {
        let name = if tempo.name.is_empty() {
            &tempo.id
        } else {
            &tempo.name
        };
        Self {
            id: tempo.id.clone(),
            name: name.clone(),
            tempo_hours: tempo.total_hours,
            time_labor_hours: 0.0,
            difference: tempo.total_hours,
            category_hours: BTreeMap::new(),
            status: Status::MissingInTimeLabor,
            validator: NOT_APPLICABLE.to_string(),
            validation_time: NOT_APPLICABLE.to_string(),
        }
    }

    fn time_labor_only(record: &EmployeeRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            tempo_hours: 0.0,
            time_labor_hours: record.effective_hours,
            difference: -record.effective_hours,
            category_hours: record.category_hours.clone(),
            status: Status::MissingInTempo,
            validator: record.validator.clone(),
            validation_time: record.validation_time.clone(),
        }
    }
}

fn round_difference(value: f64) -> f64 {
    let scale = 10f64.powi(DIFFERENCE_DECIMALS);
    (value * scale).round() / scale
}

/// Joins both sides on id. Every id of either side appears exactly once in the result: Tempo ids
/// first, in first-seen order, then the ids only Time & Labor knows about.
///
/// A Tempo aggregate without a name takes the Time & Labor name of its id, or the id itself when
/// Time & Labor does not know it.
pub fn reconcile(tempo: &TempoData, time_labor: &TimeLaborData) -> Vec<ReconciledEmployee> {
    let mut joined = Vec::with_capacity(tempo.len() + time_labor.len());

    let mut tempo_ids = HashSet::new();
    for employee in tempo.employees() {
        if employee.name.is_empty() {
            warn!("Tempo employee {} has no name", employee.id);
        }
        tempo_ids.insert(employee.id.as_str());
        joined.push(match time_labor.get(&employee.id) {
            Some(record) => ReconciledEmployee::matched(employee, record),
            None => ReconciledEmployee::tempo_only(employee),
        });
    }

    for record in time_labor.records() {
        if !tempo_ids.contains(record.id.as_str()) {
            joined.push(ReconciledEmployee::time_labor_only(record));
        }
    }

    debug!("Reconciled {} employees", joined.len());
    joined
}
