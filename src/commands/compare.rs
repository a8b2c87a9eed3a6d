use crate::args::CompareArgs;
use crate::commands::Out;
use crate::export::REPORT;
use crate::model::{CategoryFilter, Report};
use crate::render::{category_views, CategoryView, ReportView};
use crate::session::Session;
use crate::{source, Config, Result};
use dialoguer::MultiSelect;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, info};

/// The outcome of `tsrecon compare`.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    /// The last report computed, after any interactive changes.
    pub report: Report,
    /// The selected categories the last report was computed with.
    pub selected: Vec<String>,
    /// Where the report was exported, if it was.
    pub export: Option<PathBuf>,
}

/// Decodes both files, reconciles them and prints the report to stdout. In interactive mode the
/// user then picks categories and the report is recomputed and printed again until the selection
/// stays the same.
pub async fn compare(config: Config, args: CompareArgs) -> Result<Out<Comparison>> {
    let mut session = Session::with_filter(initial_filter(&config, &args));
    let (tempo, time_labor) = source::load_files(args.tempo(), args.time_labor()).await?;
    let mut report = session.process(tempo, time_labor)?;
    print_report(&session, &report, &args)?;

    if args.interactive() {
        while let Some(chosen) = prompt_categories(&session, &report)? {
            if !apply_selection(&mut session, &chosen) {
                debug!("Selection unchanged");
                break;
            }
            report = session.recompute()?;
            print_report(&session, &report, &args)?;
        }
    }

    let export = if args.export() {
        let format = config.export_format();
        let view = ReportView::new(&report, session.catalog(), session.filter(), false);
        let path = config
            .exporter()
            .save(REPORT, format, &view.render(format)?)
            .await?;
        info!("Exported the report to {}", path.display());
        Some(path)
    } else {
        None
    };

    let message = format!(
        "Compared {} employees: {} with discrepancies, {} ADM Free Days entries excluded",
        report.employees.len(),
        report.discrepancy_count,
        report.excluded_entry_count
    );
    let comparison = Comparison {
        selected: session.filter().selected().map(str::to_string).collect(),
        report,
        export,
    };
    Ok(Out::new(message, comparison))
}

/// Command line codes win over the config file. Without either, the whole catalog is selected on
/// the first pass.
fn initial_filter(config: &Config, args: &CompareArgs) -> CategoryFilter {
    if args.no_categories() {
        CategoryFilter::with_selection(Vec::<String>::new())
    } else if !args.categories().is_empty() {
        CategoryFilter::with_selection(args.categories().iter().cloned())
    } else if let Some(codes) = config.default_categories() {
        CategoryFilter::with_selection(codes.iter().cloned())
    } else {
        CategoryFilter::new()
    }
}

fn print_report(session: &Session, report: &Report, args: &CompareArgs) -> Result<()> {
    let view = ReportView::new(
        report,
        session.catalog(),
        session.filter(),
        args.discrepancies_only(),
    );
    println!("{}", view.render(args.format())?);
    Ok(())
}

/// Makes the session's selection equal to `chosen` (within the current catalog) using the
/// session's filter operations. Returns false when nothing had to change.
///
/// Selected codes that are not in the catalog are left alone, they never match anything.
pub fn apply_selection(session: &mut Session, chosen: &BTreeSet<String>) -> bool {
    let catalog: Vec<String> = session.catalog().codes().map(str::to_string).collect();
    let unchanged = catalog
        .iter()
        .all(|code| session.filter().is_selected(code) == chosen.contains(code));
    if unchanged {
        return false;
    }

    if catalog.iter().all(|code| chosen.contains(code)) {
        session.select_all_categories();
    } else if chosen.is_empty() {
        session.deselect_all_categories();
    } else {
        for code in &catalog {
            if chosen.contains(code) {
                session.select_category(code.clone());
            } else {
                session.deselect_category(code);
            }
        }
    }
    true
}

/// Shows the catalog as a checklist. Returns `None` when the user cancels.
fn prompt_categories(session: &Session, report: &Report) -> Result<Option<BTreeSet<String>>> {
    let hours = report.employees.iter().map(|e| &e.category_hours);
    let views = category_views(hours, session.catalog(), session.filter());
    if views.is_empty() {
        info!("The Time & Labor file has no categories to choose from");
        return Ok(None);
    }
    let items: Vec<String> = views.iter().map(label).collect();
    let defaults: Vec<bool> = views.iter().map(|v| v.selected).collect();

    let picked = tokio::task::block_in_place(|| {
        MultiSelect::new()
            .with_prompt("Categories to count (space toggles, enter recomputes, esc quits)")
            .items(&items)
            .defaults(&defaults)
            .interact_opt()
    })?;

    Ok(picked.map(|indexes| {
        indexes
            .into_iter()
            .filter_map(|ix| views.get(ix).map(|v| v.code.clone()))
            .collect()
    }))
}

fn label(view: &CategoryView) -> String {
    format!("{} ({:.2} h)", view.code, view.hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use crate::render::Format;
    use crate::test::{tempo_sheet, time_labor_sheet, TestEnv};

    fn set(codes: &[&str]) -> BTreeSet<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_apply_selection() {
        let mut session = Session::new();
        session.process(tempo_sheet(), time_labor_sheet()).unwrap();

        assert!(!apply_selection(&mut session, &set(&["OT", "REG", "VAC"])));

        assert!(apply_selection(&mut session, &set(&["REG", "VAC"])));
        assert!(!session.filter().is_selected("OT"));
        let report = session.recompute().unwrap();
        let carol = report.employees.iter().find(|e| e.id == "E3").unwrap();
        assert_eq!(carol.status, Status::HoursMismatch);

        assert!(apply_selection(&mut session, &set(&[])));
        assert_eq!(session.filter().selected().count(), 0);

        assert!(apply_selection(&mut session, &set(&["OT", "REG", "VAC"])));
        assert_eq!(session.filter().selected().count(), 3);
    }

    #[tokio::test]
    async fn test_compare_with_export() {
        let env = TestEnv::new().await;
        let args = CompareArgs::new(env.tempo(), env.time_labor())
            .with_format(Format::Csv)
            .with_export(true);
        let out = compare(env.config(), args).await.unwrap();
        let comparison = out.structure().unwrap();
        assert_eq!(comparison.report.discrepancy_count, 2);
        assert_eq!(comparison.selected, vec!["OT", "REG", "VAC"]);

        let path = comparison.export.as_ref().unwrap();
        assert!(path.starts_with(env.config().exports()));
        let exported = crate::utils::read(path).await.unwrap();
        assert!(exported.starts_with("Employee ID,Name"));
        assert!(out.message().contains("2 with discrepancies"));
    }

    #[tokio::test]
    async fn test_compare_with_categories() {
        let env = TestEnv::new().await;
        let args = CompareArgs::new(env.tempo(), env.time_labor()).with_categories(["REG"]);
        let out = compare(env.config(), args).await.unwrap();
        let comparison = out.structure().unwrap();
        assert_eq!(comparison.report.discrepancy_count, 3);
        assert!(comparison.export.is_none());
    }

    #[tokio::test]
    async fn test_compare_with_no_categories() {
        let env = TestEnv::new().await;
        let args = CompareArgs::new(env.tempo(), env.time_labor())
            .with_no_categories(true)
            .with_discrepancies_only(true);
        let out = compare(env.config(), args).await.unwrap();
        let report = &out.structure().unwrap().report;
        assert!(report.employees.iter().all(|e| e.time_labor_hours == 0.0));
        assert!(out.structure().unwrap().selected.is_empty());
    }

    #[tokio::test]
    async fn test_compare_missing_file() {
        let env = TestEnv::new().await;
        let args = CompareArgs::new(env.tempo(), "/nonexistent/tl.csv");
        assert!(compare(env.config(), args).await.is_err());
    }
}
