use crate::args::CategoriesArgs;
use crate::commands::Out;
use crate::export::CATEGORIES;
use crate::model::{
    discover_categories, ensure_data_rows, locate_header_row, normalize_time_labor,
    resolve_columns, CategoryFilter, SourceKind,
};
use crate::render::{category_views, render_categories, CategoryView};
use crate::{source, Config, Result};
use tracing::info;

/// Prints the TRC categories of a Time & Labor export, with total hours per code and whether the
/// code is selected by default.
pub async fn categories(config: Config, args: CategoriesArgs) -> Result<Out<Vec<CategoryView>>> {
    let mut source = source::open(SourceKind::TimeLabor, args.time_labor())?;
    let sheet = source.first_sheet().await?;

    let header_row = locate_header_row(&sheet);
    ensure_data_rows(SourceKind::TimeLabor, &sheet, header_row)?;
    let columns = resolve_columns(SourceKind::TimeLabor, &sheet, header_row)?;
    let catalog = discover_categories(&sheet, header_row, &columns);

    let mut filter = match config.default_categories() {
        Some(codes) => CategoryFilter::with_selection(codes.iter().cloned()),
        None => CategoryFilter::new(),
    };
    filter.initialize(&catalog);
    let data = normalize_time_labor(&sheet, header_row, &columns, &filter);

    let hours = data.records().iter().map(|r| &r.category_hours);
    let views = category_views(hours, &catalog, &filter);
    println!("{}", render_categories(&views, args.format())?);

    if args.export() {
        let format = config.export_format();
        let path = config
            .exporter()
            .save(CATEGORIES, format, &render_categories(&views, format)?)
            .await?;
        info!("Exported the category list to {}", path.display());
    }

    Ok(Out::new(
        format!(
            "Found {} categories in '{}'",
            views.len(),
            args.time_labor().display()
        ),
        views,
    ))
}
