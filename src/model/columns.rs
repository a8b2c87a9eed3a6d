//! Maps header text to the semantic columns the engine needs.
//!
//! Resolution runs an ordered chain of strategies. Each strategy only fills roles that are still
//! unresolved, so an earlier strategy always wins:
//!
//! 1. `KeywordStrategy` matches lower-cased header text against per-source keyword rules.
//! 2. `PositionalStrategy` falls back to the fixed column layout of each export, but only when one
//!    of the required roles (`name`, `id`, `hours`) is still missing.

use crate::error::ReconcileError;
use crate::model::sheet::{Cell, RawSheet};
use crate::model::SourceKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// The semantic role of a column.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Id,
    Name,
    Hours,
    /// The Tempo task column or the Time & Labor TRC description column.
    Category,
    /// The Time & Labor status column, reported as the validator.
    Status,
}

serde_plain::derive_display_from_serialize!(Role);
serde_plain::derive_fromstr_from_deserialize!(Role);

/// The roles without which a sheet cannot be processed.
pub const REQUIRED_ROLES: [Role; 3] = [Role::Name, Role::Id, Role::Hours];

/// Role to zero-based column index. A role that is absent is unresolved.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct HeaderMap {
    columns: BTreeMap<Role, usize>,
}

impl HeaderMap {
    pub fn get(&self, role: Role) -> Option<usize> {
        self.columns.get(&role).copied()
    }

    pub fn is_resolved(&self, role: Role) -> bool {
        self.columns.contains_key(&role)
    }

    /// The roles from `roles` that are unresolved, in the order given.
    pub fn missing(&self, roles: &[Role]) -> Vec<Role> {
        roles
            .iter()
            .copied()
            .filter(|role| !self.is_resolved(*role))
            .collect()
    }

    /// The cell of `row` that holds `role`, if the role is resolved and the row reaches that far.
    pub fn cell<'a>(&self, role: Role, row: &'a [Cell]) -> Option<&'a Cell> {
        self.get(role).and_then(|ix| row.get(ix))
    }

    fn fill(&mut self, role: Role, ix: usize) -> bool {
        if self.is_resolved(role) {
            return false;
        }
        self.columns.insert(role, ix);
        true
    }
}

/// Resolves the columns of `sheet` using the row at `header_row` as the header.
pub fn resolve_columns(
    kind: SourceKind,
    sheet: &RawSheet,
    header_row: usize,
) -> Result<HeaderMap, ReconcileError> {
    let headers: Vec<String> = sheet
        .row(header_row)
        .unwrap_or_default()
        .iter()
        .map(|cell| cell.to_text().to_lowercase())
        .collect();
    resolve_headers(kind, &headers, sheet.width())
}

/// Resolves columns from lower-cased header texts. `width` is the number of columns the sheet
/// actually has; positional defaults beyond it are not applied.
pub fn resolve_headers(
    kind: SourceKind,
    headers: &[String],
    width: usize,
) -> Result<HeaderMap, ReconcileError> {
    let mut map = HeaderMap::default();
    for strategy in STRATEGIES {
        strategy.apply(kind, headers, width, &mut map);
    }

    let missing = map.missing(&REQUIRED_ROLES);
    if !missing.is_empty() {
        return Err(ReconcileError::ColumnResolution { kind, missing });
    }
    debug!("Resolved {kind} columns: {:?}", map.columns);
    Ok(map)
}

trait Strategy {
    fn name(&self) -> &'static str;
    fn apply(&self, kind: SourceKind, headers: &[String], width: usize, map: &mut HeaderMap);
}

const STRATEGIES: &[&dyn Strategy] = &[&KeywordStrategy, &PositionalStrategy];

/// A header matches when it contains every word in `all_of` and, if `any_of` is non-empty, at
/// least one word from `any_of`.
struct KeywordRule {
    role: Role,
    all_of: &'static [&'static str],
    any_of: &'static [&'static str],
}

impl KeywordRule {
    fn matches(&self, header: &str) -> bool {
        self.all_of.iter().all(|word| header.contains(word))
            && (self.any_of.is_empty() || self.any_of.iter().any(|word| header.contains(word)))
    }
}

const TEMPO_RULES: &[KeywordRule] = &[
    KeywordRule {
        role: Role::Name,
        all_of: &["name"],
        any_of: &[],
    },
    KeywordRule {
        role: Role::Id,
        all_of: &["id"],
        any_of: &["employee", "empl"],
    },
    KeywordRule {
        role: Role::Hours,
        all_of: &["hours"],
        any_of: &[],
    },
    KeywordRule {
        role: Role::Category,
        all_of: &["task"],
        any_of: &[],
    },
];

const TIME_LABOR_RULES: &[KeywordRule] = &[
    KeywordRule {
        role: Role::Name,
        all_of: &["name"],
        any_of: &["employee", "empl"],
    },
    KeywordRule {
        role: Role::Id,
        all_of: &["id", "empl"],
        any_of: &[],
    },
    KeywordRule {
        role: Role::Hours,
        all_of: &["hours"],
        any_of: &[],
    },
    KeywordRule {
        role: Role::Status,
        all_of: &["status"],
        any_of: &[],
    },
    KeywordRule {
        role: Role::Category,
        all_of: &["trc", "desc"],
        any_of: &[],
    },
];

struct KeywordStrategy;

impl Strategy for KeywordStrategy {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn apply(&self, kind: SourceKind, headers: &[String], _width: usize, map: &mut HeaderMap) {
        let rules = match kind {
            SourceKind::Tempo => TEMPO_RULES,
            SourceKind::TimeLabor => TIME_LABOR_RULES,
        };
        for rule in rules {
            if let Some(ix) = headers.iter().position(|h| rule.matches(h)) {
                if map.fill(rule.role, ix) {
                    trace!("{} strategy: {kind} {} -> column {ix}", self.name(), rule.role);
                }
            }
        }
    }
}

const TEMPO_POSITIONS: &[(Role, usize)] = &[
    (Role::Name, 0),
    (Role::Id, 1),
    (Role::Category, 5),
    (Role::Hours, 6),
];

const TIME_LABOR_POSITIONS: &[(Role, usize)] = &[
    (Role::Name, 0),
    (Role::Id, 1),
    (Role::Hours, 5),
    (Role::Status, 6),
];

struct PositionalStrategy;

impl Strategy for PositionalStrategy {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn apply(&self, kind: SourceKind, _headers: &[String], width: usize, map: &mut HeaderMap) {
        if map.missing(&REQUIRED_ROLES).is_empty() {
            return;
        }
        let positions = match kind {
            SourceKind::Tempo => TEMPO_POSITIONS,
            SourceKind::TimeLabor => TIME_LABOR_POSITIONS,
        };
        for &(role, ix) in positions {
            if ix < width && map.fill(role, ix) {
                trace!("{} strategy: {kind} {role} -> column {ix}", self.name());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_lowercase()).collect()
    }

    #[test]
    fn test_tempo_keywords() {
        let h = headers(&["Employee ID", "Name", "Date", "Hours", "Task", "Project"]);
        let map = resolve_headers(SourceKind::Tempo, &h, h.len()).unwrap();
        assert_eq!(map.get(Role::Id), Some(0));
        assert_eq!(map.get(Role::Name), Some(1));
        assert_eq!(map.get(Role::Hours), Some(3));
        assert_eq!(map.get(Role::Category), Some(4));
        assert_eq!(map.get(Role::Status), None);
    }

    #[test]
    fn test_time_labor_keywords() {
        let h = headers(&[
            "Employee Name",
            "Empl ID",
            "Date",
            "TRC",
            "TRC Description",
            "Reported Hours",
            "Status",
        ]);
        let map = resolve_headers(SourceKind::TimeLabor, &h, h.len()).unwrap();
        assert_eq!(map.get(Role::Name), Some(0));
        assert_eq!(map.get(Role::Id), Some(1));
        assert_eq!(map.get(Role::Category), Some(4));
        assert_eq!(map.get(Role::Hours), Some(5));
        assert_eq!(map.get(Role::Status), Some(6));
    }

    #[test]
    fn test_time_labor_name_needs_employee_word() {
        // A bare "name" header is not enough on the Time & Labor side, so positional fallback
        // supplies column 0 instead of the keyword match at column 2.
        let h = headers(&["A", "Empl ID", "Name", "x", "y", "Hours", "Status"]);
        let map = resolve_headers(SourceKind::TimeLabor, &h, h.len()).unwrap();
        assert_eq!(map.get(Role::Name), Some(0));
        assert_eq!(map.get(Role::Id), Some(1));
        assert_eq!(map.get(Role::Hours), Some(5));
        assert_eq!(map.get(Role::Status), Some(6));
    }

    #[test]
    fn test_fallback_never_overwrites_keyword_matches() {
        let h = headers(&["Hours", "Name", "c", "d", "e", "f", "g"]);
        let map = resolve_headers(SourceKind::Tempo, &h, h.len()).unwrap();
        assert_eq!(map.get(Role::Hours), Some(0));
        assert_eq!(map.get(Role::Name), Some(1));
        // Only the unresolved roles receive their positional defaults.
        assert_eq!(map.get(Role::Id), Some(1));
        assert_eq!(map.get(Role::Category), Some(5));
    }

    #[test]
    fn test_no_fallback_when_required_roles_resolve() {
        let h = headers(&["Name", "Employee ID", "c", "d", "e", "f", "Hours"]);
        let map = resolve_headers(SourceKind::Tempo, &h, h.len()).unwrap();
        assert_eq!(map.get(Role::Category), None);
    }

    #[test]
    fn test_fallback_on_headerless_sheet() {
        let h = headers(&["Smith, Anna", "1001", "", "", "", "Dev", "8"]);
        let map = resolve_headers(SourceKind::Tempo, &h, h.len()).unwrap();
        assert_eq!(map.get(Role::Name), Some(0));
        assert_eq!(map.get(Role::Id), Some(1));
        assert_eq!(map.get(Role::Category), Some(5));
        assert_eq!(map.get(Role::Hours), Some(6));
    }

    #[test]
    fn test_narrow_sheet_fails() {
        let h = headers(&["foo", "bar", "baz"]);
        let err = resolve_headers(SourceKind::TimeLabor, &h, 3).unwrap_err();
        match err {
            ReconcileError::ColumnResolution { kind, missing } => {
                assert_eq!(kind, SourceKind::TimeLabor);
                assert_eq!(missing, vec![Role::Hours]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_resolve_from_sheet_row() {
        let sheet = RawSheet::new(
            "s",
            vec![
                vec!["Report"],
                vec!["Employee ID", "Name", "Date", "Hours", "Task", "Project"],
            ],
        );
        let map = resolve_columns(SourceKind::Tempo, &sheet, 1).unwrap();
        assert_eq!(map.get(Role::Hours), Some(3));
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Category.to_string(), "category");
        assert_eq!("hours".parse::<Role>().unwrap(), Role::Hours);
    }
}
