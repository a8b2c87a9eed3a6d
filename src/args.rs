//! These structs provide the CLI interface for the tsrecon CLI.

use crate::render::Format;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// tsrecon: reconcile Tempo hours against Time & Labor hours.
///
/// Give it the Tempo activity log export and the Time & Labor attendance export (xlsx, xls, ods
/// or csv). It finds the header row and the relevant columns of each, totals the hours per
/// employee and lists every employee whose hours differ by more than 0.01 or who appears in only
/// one of the two files.
///
/// Time & Labor hours are split by TRC (pay code). Use --category to count only some of them, or
/// --interactive to toggle codes and watch the result change.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory with a default config.json and an exports directory.
    ///
    /// Running tsrecon without a home directory works too, every setting then takes its default.
    Init,
    /// Compare a Tempo export with a Time & Labor export.
    Compare(CompareArgs),
    /// List the TRC categories of a Time & Labor export with their total hours.
    Categories(CategoriesArgs),
    /// Print the JSON schema of the report produced by `compare --format json`.
    Schema,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the configuration and exported reports are kept. Defaults to
    /// ~/.tsrecon
    #[arg(long, env = "TSRECON_HOME", default_value_t = default_recon_home())]
    recon_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, recon_home: PathBuf) -> Self {
        Self {
            log_level,
            recon_home: recon_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn recon_home(&self) -> &DisplayPath {
        &self.recon_home
    }
}

/// Args for the `tsrecon compare` command.
#[derive(Debug, Parser, Clone)]
pub struct CompareArgs {
    /// The Tempo activity log export.
    tempo: PathBuf,

    /// The Time & Labor attendance export.
    time_labor: PathBuf,

    /// Count only hours with this TRC code. Repeat for more codes. By default the codes from
    /// config.json are used, or every code found in the file.
    #[arg(long = "category", value_name = "CODE")]
    categories: Vec<String>,

    /// Count no Time & Labor hours at all.
    #[arg(long, conflicts_with = "categories")]
    no_categories: bool,

    /// How to print the report.
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Leave employees whose hours match out of the printed report.
    #[arg(long)]
    discrepancies_only: bool,

    /// Also write the report to the exports directory, in the format set in config.json.
    #[arg(long)]
    export: bool,

    /// After printing the report, choose categories from a list and recompute until the
    /// selection stops changing.
    #[arg(long)]
    interactive: bool,
}

impl CompareArgs {
    pub fn new(tempo: impl Into<PathBuf>, time_labor: impl Into<PathBuf>) -> Self {
        Self {
            tempo: tempo.into(),
            time_labor: time_labor.into(),
            categories: Vec::new(),
            no_categories: false,
            format: Format::Table,
            discrepancies_only: false,
            export: false,
            interactive: false,
        }
    }

    pub fn with_categories<S: Into<String>>(mut self, codes: impl IntoIterator<Item = S>) -> Self {
        self.categories = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_no_categories(mut self, value: bool) -> Self {
        self.no_categories = value;
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_discrepancies_only(mut self, value: bool) -> Self {
        self.discrepancies_only = value;
        self
    }

    pub fn with_export(mut self, value: bool) -> Self {
        self.export = value;
        self
    }

    pub fn tempo(&self) -> &Path {
        &self.tempo
    }

    pub fn time_labor(&self) -> &Path {
        &self.time_labor
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn no_categories(&self) -> bool {
        self.no_categories
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn discrepancies_only(&self) -> bool {
        self.discrepancies_only
    }

    pub fn export(&self) -> bool {
        self.export
    }

    pub fn interactive(&self) -> bool {
        self.interactive
    }
}

/// Args for the `tsrecon categories` command.
#[derive(Debug, Parser, Clone)]
pub struct CategoriesArgs {
    /// The Time & Labor attendance export.
    time_labor: PathBuf,

    /// How to print the category list.
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Also write the list to the exports directory, in the format set in config.json.
    #[arg(long)]
    export: bool,
}

impl CategoriesArgs {
    pub fn new(time_labor: impl Into<PathBuf>, format: Format) -> Self {
        Self {
            time_labor: time_labor.into(),
            format,
            export: false,
        }
    }

    pub fn with_export(mut self, value: bool) -> Self {
        self.export = value;
        self
    }

    pub fn export(&self) -> bool {
        self.export
    }

    pub fn time_labor(&self) -> &Path {
        &self.time_labor
    }

    pub fn format(&self) -> Format {
        self.format
    }
}

fn default_recon_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join(".tsrecon"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --recon-home or TSRECON_HOME instead of relying on the default \
                home directory.",
            );
            PathBuf::from(".tsrecon")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compare() {
        let args = Args::try_parse_from([
            "tsrecon",
            "--recon-home",
            "/tmp/recon",
            "compare",
            "tempo.xlsx",
            "tl.xlsx",
            "--category",
            "REG",
            "--category",
            "OT",
            "--format",
            "csv",
            "--discrepancies-only",
        ])
        .unwrap();
        assert_eq!(args.common().recon_home().path(), Path::new("/tmp/recon"));
        assert_eq!(args.common().log_level(), LevelFilter::INFO);
        let Command::Compare(compare) = args.command() else {
            panic!("expected compare");
        };
        assert_eq!(compare.tempo(), Path::new("tempo.xlsx"));
        assert_eq!(compare.categories(), &["REG".to_string(), "OT".to_string()]);
        assert_eq!(compare.format(), Format::Csv);
        assert!(compare.discrepancies_only());
        assert!(!compare.interactive());
    }

    #[test]
    fn test_no_categories_conflicts_with_category() {
        let result = Args::try_parse_from([
            "tsrecon",
            "compare",
            "a.csv",
            "b.csv",
            "--category",
            "REG",
            "--no-categories",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_categories() {
        let args =
            Args::try_parse_from(["tsrecon", "--log-level", "debug", "categories", "tl.csv"])
                .unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        assert!(matches!(args.command(), Command::Categories(_)));
    }
}
