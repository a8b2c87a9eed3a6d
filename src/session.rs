//! The reconciliation session: the two decoded sheets, the category catalog of the last pass and
//! the category selection, which survives between passes.

use crate::error::ReconcileError;
use crate::model::{
    assemble_report, discover_categories, ensure_data_rows, locate_header_row, normalize_tempo,
    normalize_time_labor, reconcile, resolve_columns, CategoryCatalog, CategoryFilter, RawSheet,
    Report, SourceKind,
};
use tracing::debug;

/// Holds everything a recompute needs. Nothing is persisted beyond the lifetime of the value.
#[derive(Debug, Clone, Default)]
pub struct Session {
    sheets: Option<(RawSheet, RawSheet)>,
    catalog: CategoryCatalog,
    filter: CategoryFilter,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session whose selection starts from `filter` instead of the whole catalog.
    pub fn with_filter(filter: CategoryFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Runs a full pass over a new pair of sheets. The sheets replace the previous ones only when
    /// the pass succeeds; on failure the session keeps its previous sheets and catalog.
    pub fn process(
        &mut self,
        tempo: RawSheet,
        time_labor: RawSheet,
    ) -> Result<Report, ReconcileError> {
        let mut filter = self.filter.clone();
        let (report, catalog) = run_pass(&tempo, &time_labor, &mut filter)?;
        self.sheets = Some((tempo, time_labor));
        self.catalog = catalog;
        self.filter = filter;
        Ok(report)
    }

    /// Re-runs the pass over the sheets already held, picking up any change to the selection.
    pub fn recompute(&mut self) -> Result<Report, ReconcileError> {
        let (tempo, time_labor) = self.sheets.as_ref().ok_or(ReconcileError::NotLoaded)?;
        let (report, catalog) = run_pass(tempo, time_labor, &mut self.filter)?;
        self.catalog = catalog;
        Ok(report)
    }

    /// The categories found by the last successful pass.
    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    pub fn select_category(&mut self, code: impl Into<String>) {
        self.filter.select(code);
    }

    pub fn deselect_category(&mut self, code: &str) {
        self.filter.deselect(code);
    }

    pub fn select_all_categories(&mut self) {
        self.filter.select_all(&self.catalog);
    }

    pub fn deselect_all_categories(&mut self) {
        self.filter.deselect_all();
    }
}

fn run_pass(
    tempo: &RawSheet,
    time_labor: &RawSheet,
    filter: &mut CategoryFilter,
) -> Result<(Report, CategoryCatalog), ReconcileError> {
    let tempo_header = locate_header_row(tempo);
    let time_labor_header = locate_header_row(time_labor);
    ensure_data_rows(SourceKind::Tempo, tempo, tempo_header)?;
    ensure_data_rows(SourceKind::TimeLabor, time_labor, time_labor_header)?;

    let tempo_columns = resolve_columns(SourceKind::Tempo, tempo, tempo_header)?;
    let time_labor_columns = resolve_columns(SourceKind::TimeLabor, time_labor, time_labor_header)?;

    let tempo_data = normalize_tempo(tempo, tempo_header, &tempo_columns);
    let catalog = discover_categories(time_labor, time_labor_header, &time_labor_columns);
    filter.initialize(&catalog);
    let time_labor_data =
        normalize_time_labor(time_labor, time_labor_header, &time_labor_columns, filter);

    let joined = reconcile(&tempo_data, &time_labor_data);
    let report = assemble_report(joined, tempo_data.excluded_entries());
    debug!(
        "Pass complete: {} employees, {} discrepancies",
        report.employees.len(),
        report.discrepancy_count
    );
    Ok((report, catalog))
}
