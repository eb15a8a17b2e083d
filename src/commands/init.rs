use crate::args::InitArgs;
use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and:
/// - Creates an initial `config.json` with the reporting currency and calendar settings
/// - Seeds `categories.json` with the default categories and creates an empty `expenses.json`
///
/// # Errors
/// - Returns an error if the directory is already initialized, if the settings are invalid or if
///   any file operation fails.
pub async fn init(cashbook_home: &Path, args: &InitArgs) -> Result<Out<()>> {
    let config = Config::create(
        cashbook_home,
        args.currency(),
        args.time_zone(),
        args.week_start(),
    )
    .await
    .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Created the cashbook at {} (currency {}, time zone {})",
        config.root().display(),
        config.currency_code(),
        config.calendar().time_zone()
    )
    .into())
}
