//! These structs provide the CLI interface for the cashbook CLI.

use crate::calendar::{RangePreset, WeekStart};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;
use uuid::Uuid;

/// cashbook: A command-line ledger for day-to-day cash expenses.
///
/// Log what you spend, see where it went this week or this month, browse your history by day,
/// and export a date range to CSV. Everything is stored as JSON files in a single directory.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the configuration file and the default categories.
    ///
    /// This is the first command you should run. The settings chosen here can be changed later
    /// with `cashbook config set`.
    Init(InitArgs),
    /// Record an expense.
    Add(AddArgs),
    /// Change the amount, category, note or date of an expense.
    Edit(EditArgs),
    /// Delete one or more expenses by id. Deleted expenses are kept on disk but no longer counted.
    Delete(DeleteArgs),
    /// Show the total, average per day, highest day and category breakdown for a range.
    Summary(RangeArgs),
    /// Write the expenses of a range as CSV.
    Export(ExportArgs),
    /// List expenses grouped by day, newest first.
    History(HistoryArgs),
    /// List and manage the categories. Lists them when no subcommand is given.
    Categories(CategoriesArgs),
    /// Show or change the settings.
    Config(ConfigArgs),
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

    /// The directory where cashbook data and configuration is held. Defaults to ~/cashbook
    #[arg(long, env = "CASHBOOK_HOME", default_value_t = default_cashbook_home())]
    cashbook_home: DisplayPath,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn cashbook_home(&self) -> &DisplayPath {
        &self.cashbook_home
    }
}

/// Args for the `cashbook init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The three-letter reporting currency code, e.g. USD or EUR.
    #[arg(long, default_value = "USD")]
    currency: String,

    /// The IANA time zone that decides where days, weeks and months begin, e.g. Europe/Berlin.
    #[arg(long, default_value = "UTC")]
    time_zone: String,

    /// The first day of the week.
    #[arg(long, value_enum, default_value_t = WeekStart::Monday)]
    week_start: WeekStart,
}

impl InitArgs {
    pub fn new(
        currency: impl Into<String>,
        time_zone: impl Into<String>,
        week_start: WeekStart,
    ) -> Self {
        Self {
            currency: currency.into(),
            time_zone: time_zone.into(),
            week_start,
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn time_zone(&self) -> &str {
        &self.time_zone
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }
}

/// Args for the `cashbook add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The amount spent, e.g. 12.50 or 12,50.
    #[arg(allow_hyphen_values = true)]
    amount: String,

    /// The category name. Falls back to the configured default category when omitted or unknown.
    #[arg(long)]
    category: Option<String>,

    /// A free-text note.
    #[arg(long)]
    note: Option<String>,

    /// When the money was spent, as YYYY-MM-DD or an RFC 3339 timestamp. Defaults to now.
    #[arg(long)]
    date: Option<String>,
}

impl AddArgs {
    pub fn new(
        amount: impl Into<String>,
        category: Option<String>,
        note: Option<String>,
        date: Option<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            category,
            note,
            date,
        }
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }
}

/// Args for the `cashbook edit` command. Only the given fields change.
#[derive(Debug, Parser, Clone)]
pub struct EditArgs {
    /// The id of the expense to edit.
    id: Uuid,

    /// The new amount, e.g. 12.50 or 12,50.
    #[arg(long, allow_hyphen_values = true)]
    amount: Option<String>,

    /// The new category name. Archived categories cannot be chosen.
    #[arg(long)]
    category: Option<String>,

    /// The new note. An empty note removes it.
    #[arg(long)]
    note: Option<String>,

    /// When the money was spent, as YYYY-MM-DD or an RFC 3339 timestamp.
    #[arg(long)]
    date: Option<String>,
}

impl EditArgs {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            amount: None,
            category: None,
            note: None,
            date: None,
        }
    }

    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn amount(&self) -> Option<&str> {
        self.amount.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }
}

/// Args for the `cashbook delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The ids of the expenses to delete.
    #[arg(required = true)]
    ids: Vec<Uuid>,
}

impl DeleteArgs {
    pub fn new(ids: Vec<Uuid>) -> Self {
        Self { ids }
    }

    pub fn ids(&self) -> &[Uuid] {
        &self.ids
    }
}

/// Selects the date range for `summary`, `export` and `history`.
#[derive(Debug, Parser, Clone, Default)]
pub struct RangeArgs {
    /// The range to report on.
    #[arg(long, value_enum, default_value_t = RangePreset::ThisMonth)]
    range: RangePreset,

    /// The start of a custom range, as YYYY-MM-DD or an RFC 3339 timestamp.
    #[arg(long)]
    start: Option<String>,

    /// The end of a custom range (exclusive), as YYYY-MM-DD or an RFC 3339 timestamp.
    #[arg(long)]
    end: Option<String>,
}

impl RangeArgs {
    pub fn new(range: RangePreset) -> Self {
        Self {
            range,
            start: None,
            end: None,
        }
    }

    pub fn custom(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            range: RangePreset::Custom,
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }

    pub fn range(&self) -> RangePreset {
        self.range
    }

    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    pub fn end(&self) -> Option<&str> {
        self.end.as_deref()
    }
}

/// Args for the `cashbook export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    #[clap(flatten)]
    range: RangeArgs,

    /// Write the CSV to this file instead of standard output.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(range: RangeArgs, output: Option<PathBuf>) -> Self {
        Self { range, output }
    }

    pub fn range(&self) -> &RangeArgs {
        &self.range
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

/// Args for the `cashbook history` command.
#[derive(Debug, Parser, Clone)]
pub struct HistoryArgs {
    #[clap(flatten)]
    range: RangeArgs,

    /// Only show these categories, by name. May be repeated.
    #[arg(long)]
    category: Vec<String>,

    /// Only show expenses whose note or category name contains this text.
    #[arg(long)]
    search: Option<String>,
}

impl HistoryArgs {
    pub fn new(range: RangeArgs, category: Vec<String>, search: Option<String>) -> Self {
        Self {
            range,
            category,
            search,
        }
    }

    pub fn range(&self) -> &RangeArgs {
        &self.range
    }

    pub fn categories(&self) -> &[String] {
        &self.category
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }
}

/// Args for the `cashbook categories` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct CategoriesArgs {
    #[command(subcommand)]
    action: Option<CategoryCommand>,
}

impl CategoriesArgs {
    pub fn new(action: CategoryCommand) -> Self {
        Self {
            action: Some(action),
        }
    }

    /// `None` means list.
    pub fn action(&self) -> Option<&CategoryCommand> {
        self.action.as_ref()
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CategoryCommand {
    /// List the categories in display order.
    List,
    /// Create a category at the end of the list.
    Add {
        /// The display name. Must not match an existing category, ignoring case.
        name: String,

        /// An icon name for the category.
        #[arg(long)]
        icon: Option<String>,
    },
    /// Hide a category from new expenses. Its expenses are kept. "Other" cannot be archived.
    Archive { name: String },
    /// Make an archived category available again.
    Unarchive { name: String },
    /// Move the named categories to the top, in the given order.
    Reorder {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Remove a category. Its expenses are kept and shown as "Unknown". "Other" cannot be deleted.
    Delete { name: String },
}

/// Args for the `cashbook config` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ConfigArgs {
    #[command(subcommand)]
    action: Option<ConfigCommand>,
}

impl ConfigArgs {
    pub fn new(action: ConfigCommand) -> Self {
        Self {
            action: Some(action),
        }
    }

    /// `None` means show.
    pub fn action(&self) -> Option<&ConfigCommand> {
        self.action.as_ref()
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Print the current settings.
    Show,
    /// Change one or more settings.
    Set(ConfigSetArgs),
}

/// Args for `cashbook config set`. At least one setting must be given.
#[derive(Debug, Parser, Clone, Default, PartialEq, Eq)]
pub struct ConfigSetArgs {
    /// The three-letter reporting currency code for new expenses and exports.
    #[arg(long)]
    currency: Option<String>,

    /// The IANA time zone that decides where days, weeks and months begin.
    #[arg(long)]
    time_zone: Option<String>,

    /// The first day of the week.
    #[arg(long, value_enum)]
    week_start: Option<WeekStart>,

    /// The category, by name, that new expenses fall back to.
    #[arg(long)]
    default_category: Option<String>,
}

impl ConfigSetArgs {
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }

    pub fn with_week_start(mut self, week_start: WeekStart) -> Self {
        self.week_start = Some(week_start);
        self
    }

    pub fn with_default_category(mut self, name: impl Into<String>) -> Self {
        self.default_category = Some(name.into());
        self
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn time_zone(&self) -> Option<&str> {
        self.time_zone.as_deref()
    }

    pub fn week_start(&self) -> Option<WeekStart> {
        self.week_start
    }

    pub fn default_category(&self) -> Option<&str> {
        self.default_category.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.currency.is_none()
            && self.time_zone.is_none()
            && self.week_start.is_none()
            && self.default_category.is_none()
    }
}

fn default_cashbook_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("cashbook"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --cashbook-home or CASHBOOK_HOME instead of relying on the \
                default cashbook home directory.",
            );
            PathBuf::from("cashbook")
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
