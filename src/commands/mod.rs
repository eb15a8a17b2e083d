//! Command handlers for the cashbook CLI.
//!
//! This module contains implementations for all CLI subcommands. Handlers that depend on the
//! current time take it as `now` so that ranges resolve the same way in tests.

mod add;
mod categories;
mod delete;
mod edit;
mod export;
mod history;
mod init;
mod settings;
mod summary;

use crate::args::RangeArgs;
use crate::calendar::{parse_boundary, DateRange, RangePreset};
use crate::{Config, Result};
use anyhow::{bail, ensure};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use add::add;
pub use categories::categories;
pub use delete::delete;
pub use edit::edit;
pub use export::{export, ExportReport};
pub use history::history;
pub use init::init;
pub use settings::{settings, Settings};
pub use summary::{summary, SummaryReport};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Turns the range flags into a concrete range in the configured calendar.
fn resolve_range(config: &Config, args: &RangeArgs, now: DateTime<Utc>) -> Result<DateRange> {
    let calendar = config.calendar();
    let custom = match (args.start(), args.end()) {
        (None, None) => None,
        (Some(start), Some(end)) => Some((
            parse_boundary(start, &calendar)?,
            parse_boundary(end, &calendar)?,
        )),
        _ => bail!("--start and --end must be given together"),
    };
    ensure!(
        custom.is_none() || args.range() == RangePreset::Custom,
        "--start and --end can only be used with --range custom"
    );
    args.range().resolve(&calendar, now, custom)
}
