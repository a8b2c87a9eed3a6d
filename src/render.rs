//! Turns a finished `Report` into text: a Markdown table, CSV or JSON.
//!
//! The engine's report carries no presentation data. `ReportView` adds the category catalog with
//! the current selection and per-category totals, which is what a reviewer toggles against.

use crate::model::{CategoryCatalog, CategoryFilter, ReconciledEmployee, Report};
use crate::Result;
use anyhow::Context;
use format_num::format_num;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;

const LEGEND: &str = "Legend: a positive difference means more hours in Tempo than in Time & Labor, \
a negative difference means more hours in Time & Labor than in Tempo.";

const EMPLOYEE_HEADERS: [&str; 8] = [
    "Employee ID",
    "Name",
    "Tempo Hours",
    "Time & Labor Hours",
    "Difference",
    "Status",
    "Validator",
    "Validation Time",
];

const CATEGORY_HEADERS: [&str; 3] = ["TRC", "Selected", "Hours"];

/// Output format for reports and category listings.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Markdown tables.
    #[default]
    Table,
    Csv,
    Json,
}

serde_plain::derive_display_from_serialize!(Format);
serde_plain::derive_fromstr_from_deserialize!(Format);

impl Format {
    /// The file extension used when exporting in this format.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Table => "md",
            Format::Csv => "csv",
            Format::Json => "json",
        }
    }
}

/// One category code with its selection state and the hours recorded against it.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CategoryView {
    pub code: String,
    pub selected: bool,
    /// Total Time & Labor hours recorded under this code, selected or not.
    pub hours: f64,
}

/// A report together with the category state it was computed under.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ReportView {
    #[serde(flatten)]
    pub report: Report,
    pub categories: Vec<CategoryView>,
}

impl ReportView {
    /// Builds the view. With `discrepancies_only`, OK employees are left out of the employee list;
    /// the counts and category totals still cover everyone.
    pub fn new(
        report: &Report,
        catalog: &CategoryCatalog,
        filter: &CategoryFilter,
        discrepancies_only: bool,
    ) -> Self {
        let hours = report.employees.iter().map(|e| &e.category_hours);
        let categories = category_views(hours, catalog, filter);
        let employees = if discrepancies_only {
            report.discrepancies().cloned().collect()
        } else {
            report.employees.clone()
        };
        let report = Report {
            employees,
            discrepancy_count: report.discrepancy_count,
            excluded_entry_count: report.excluded_entry_count,
        };
        Self { report, categories }
    }

    pub fn render(&self, format: Format) -> Result<String> {
        match format {
            Format::Table => Ok(self.to_markdown()),
            Format::Csv => employees_csv(&self.report.employees),
            Format::Json => {
                serde_json::to_string_pretty(self).context("Unable to serialize the report")
            }
        }
    }

    fn to_markdown(&self) -> String {
        let report = &self.report;
        let mut out = String::from("## Employee Discrepancies\n\n");
        let _ = writeln!(
            out,
            "Found {} employees with discrepancies between Tempo and Time & Labor.",
            report.discrepancy_count
        );
        if report.excluded_entry_count > 0 {
            let _ = writeln!(
                out,
                "{} ADM Free Days entries were excluded from Tempo.",
                report.excluded_entry_count
            );
        }
        out.push('\n');

        if report.employees.is_empty() {
            out.push_str("No employees to show.\n");
        } else {
            let rows: Vec<Vec<String>> = report.employees.iter().map(table_row).collect();
            markdown_table(&mut out, &EMPLOYEE_HEADERS, &[2, 3, 4], &rows);
            out.push('\n');
            out.push_str(LEGEND);
            out.push('\n');
        }

        if !self.categories.is_empty() {
            out.push_str("\n## Categories\n\n");
            markdown_categories(&mut out, &self.categories);
        }
        out
    }
}

/// Renders a category listing on its own.
pub fn render_categories(categories: &[CategoryView], format: Format) -> Result<String> {
    match format {
        Format::Table => {
            let mut out = String::new();
            markdown_categories(&mut out, categories);
            Ok(out)
        }
        Format::Csv => {
            let mut wtr = csv::Writer::from_writer(Vec::new());
            wtr.write_record(CATEGORY_HEADERS)?;
            for c in categories {
                wtr.write_record([c.code.clone(), yes_no(c.selected), hours(c.hours)])?;
            }
            finish_csv(wtr)
        }
        Format::Json => serde_json::to_string_pretty(categories)
            .context("Unable to serialize the category list"),
    }
}

/// Sums per-employee category hours and pairs each catalog code with its selection state.
pub fn category_views<'a>(
    category_hours: impl IntoIterator<Item = &'a BTreeMap<String, f64>>,
    catalog: &CategoryCatalog,
    filter: &CategoryFilter,
) -> Vec<CategoryView> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for employee in category_hours {
        for (code, hours) in employee {
            *totals.entry(code.as_str()).or_insert(0.0) += hours;
        }
    }
    catalog
        .codes()
        .map(|code| CategoryView {
            code: code.to_string(),
            selected: filter.is_selected(code),
            hours: totals.get(code).copied().unwrap_or_default(),
        })
        .collect()
}

fn table_row(e: &ReconciledEmployee) -> Vec<String> {
    vec![
        e.id.clone(),
        e.name.clone(),
        grouped(e.tempo_hours),
        grouped(e.time_labor_hours),
        grouped(e.difference),
        e.status.to_string(),
        e.validator.clone(),
        e.validation_time.clone(),
    ]
}

fn employees_csv(employees: &[ReconciledEmployee]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(EMPLOYEE_HEADERS)?;
    for e in employees {
        wtr.write_record([
            e.id.as_str(),
            e.name.as_str(),
            hours(e.tempo_hours).as_str(),
            hours(e.time_labor_hours).as_str(),
            hours(e.difference).as_str(),
            e.status.label(),
            e.validator.as_str(),
            e.validation_time.as_str(),
        ])?;
    }
    finish_csv(wtr)
}

fn finish_csv(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to flush CSV output: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

fn markdown_categories(out: &mut String, categories: &[CategoryView]) {
    if categories.is_empty() {
        out.push_str("No categories found.\n");
        return;
    }
    let rows: Vec<Vec<String>> = categories
        .iter()
        .map(|c| vec![c.code.clone(), yes_no(c.selected), grouped(c.hours)])
        .collect();
    markdown_table(out, &CATEGORY_HEADERS, &[2], &rows);
}

/// Writes a Markdown table. Columns listed in `right` are right-aligned.
fn markdown_table(out: &mut String, headers: &[&str], right: &[usize], rows: &[Vec<String>]) {
    let _ = writeln!(out, "| {} |", headers.join(" | "));
    let rule: Vec<&str> = (0..headers.len())
        .map(|ix| if right.contains(&ix) { "---:" } else { "---" })
        .collect();
    let _ = writeln!(out, "| {} |", rule.join(" | "));
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| c.replace('|', "\\|")).collect();
        let _ = writeln!(out, "| {} |", cells.join(" | "));
    }
}

fn hours(value: f64) -> String {
    format!("{value:.2}")
}

/// Two decimals with thousands separators, e.g. `-1,234.50`.
fn grouped(value: f64) -> String {
    let digits = format_num!(",.2", value.abs());
    if value < 0.0 && digits != "0.00" {
        format!("-{digits}")
    } else {
        digits
    }
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}
