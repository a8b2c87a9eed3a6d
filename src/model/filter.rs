//! The TRC category catalog of a pass and the user's category selection.

use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// The distinct category codes seen in the Time & Labor sheet during one pass.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, JsonSchema)]
pub struct CategoryCatalog {
    codes: BTreeSet<String>,
}

impl CategoryCatalog {
    pub fn new<S: Into<String>>(codes: impl IntoIterator<Item = S>) -> Self {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub(crate) fn insert(&mut self, code: String) {
        self.codes.insert(code);
    }
}

/// The set of category codes whose hours count toward the Time & Labor total.
///
/// The selection outlives individual passes. Until it is first initialized it is absent, and the
/// first pass selects the whole catalog. Codes that are not in the current catalog are kept and
/// simply never match.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct CategoryFilter {
    selected: Option<BTreeSet<String>>,
}

impl CategoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A filter that starts out with `codes` selected instead of the whole catalog.
    pub fn with_selection<S: Into<String>>(codes: impl IntoIterator<Item = S>) -> Self {
        Self {
            selected: Some(codes.into_iter().map(Into::into).collect()),
        }
    }

    /// Selects every code of `catalog` if nothing has been selected yet. An existing selection,
    /// even an empty one, is left alone.
    pub fn initialize(&mut self, catalog: &CategoryCatalog) {
        if self.selected.is_none() {
            debug!("Selecting all {} categories", catalog.len());
            self.selected = Some(catalog.codes.clone());
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.selected.is_some()
    }

    pub fn is_selected(&self, code: &str) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|selected| selected.contains(code))
    }

    pub fn select(&mut self, code: impl Into<String>) {
        self.selected
            .get_or_insert_with(BTreeSet::new)
            .insert(code.into());
    }

    pub fn deselect(&mut self, code: &str) {
        if let Some(selected) = self.selected.as_mut() {
            selected.remove(code);
        }
    }

    /// Adds every code of `catalog` to the selection.
    pub fn select_all(&mut self, catalog: &CategoryCatalog) {
        self.selected
            .get_or_insert_with(BTreeSet::new)
            .extend(catalog.codes.iter().cloned());
    }

    pub fn deselect_all(&mut self) {
        self.selected = Some(BTreeSet::new());
    }

    /// The selected codes, including any that the current catalog does not contain.
    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().flatten().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CategoryCatalog {
        CategoryCatalog::new(["REG", "OT", "VAC"])
    }

    #[test]
    fn test_initialize_selects_catalog_once() {
        let mut filter = CategoryFilter::new();
        assert!(!filter.is_selected("REG"));
        filter.initialize(&catalog());
        assert!(filter.is_selected("REG"));
        assert!(filter.is_selected("VAC"));

        filter.deselect("VAC");
        filter.initialize(&catalog());
        assert!(!filter.is_selected("VAC"));
    }

    #[test]
    fn test_deselect_all_is_not_reinitialized() {
        let mut filter = CategoryFilter::new();
        filter.initialize(&catalog());
        filter.deselect_all();
        filter.initialize(&catalog());
        assert_eq!(filter.selected().count(), 0);
        assert!(filter.is_initialized());
    }

    #[test]
    fn test_select_all_keeps_stale_codes() {
        let mut filter = CategoryFilter::with_selection(["OLD"]);
        filter.initialize(&catalog());
        assert!(!filter.is_selected("REG"));
        filter.select_all(&catalog());
        let selected: Vec<&str> = filter.selected().collect();
        assert_eq!(selected, vec!["OLD", "OT", "REG", "VAC"]);
    }

    #[test]
    fn test_select_before_initialize() {
        let mut filter = CategoryFilter::new();
        filter.select("OT");
        filter.initialize(&catalog());
        assert!(filter.is_selected("OT"));
        assert!(!filter.is_selected("REG"));
    }
}
