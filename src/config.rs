//! Configuration file handling for cashbook.
//!
//! The configuration file is stored at `$CASHBOOK_HOME/config.json` and holds the reporting
//! currency, the calendar settings used for day, week and month boundaries, the category new
//! expenses fall back to, and the time of the last export.

use crate::calendar::{parse_time_zone, Calendar, WeekStart};
use crate::model::OTHER_ID;
use crate::money::is_currency_code;
use crate::store::Store;
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

const APP_NAME: &str = "cashbook";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_TIME_ZONE: &str = "UTC";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$CASHBOOK_HOME` and from there it loads `$CASHBOOK_HOME/config.json` and opens the
/// record store that lives next to it.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    calendar: Calendar,
    store: Store,
}

impl Config {
    /// Creates the data directory, writes an initial `config.json` and seeds the record store with
    /// the default categories and no expenses.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory, e.g. `$HOME/cashbook`
    /// - `currency_code` - The three-letter reporting currency, e.g. `USD`
    /// - `time_zone` - An IANA time zone name, e.g. `Europe/Berlin`
    /// - `week_start` - The first day of the week for "this week" ranges
    ///
    /// # Errors
    /// - Returns an error if the directory is already initialized, if the currency code or time
    ///   zone is invalid, or if any file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        currency_code: &str,
        time_zone: &str,
        week_start: WeekStart,
    ) -> Result<Self> {
        let currency_code = currency_code.trim().to_uppercase();
        ensure!(
            is_currency_code(&currency_code),
            "Invalid currency code '{currency_code}', expected three letters such as USD"
        );
        let tz = parse_time_zone(time_zone)?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the cashbook home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() {
            bail!(
                "The cashbook home at '{}' is already initialized",
                root.display()
            )
        }

        let config_file = ConfigFile {
            currency_code,
            time_zone: tz.name().to_string(),
            week_start,
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        let store = Store::init(&root)
            .await
            .context("Unable to create the record store")?;

        debug!("Created cashbook home at {}", root.display());
        Ok(Self {
            root,
            config_path,
            calendar: Calendar::new(tz, week_start),
            config_file,
            store,
        })
    }

    /// This will
    /// - validate that `cashbook_home` and its config file exist
    /// - load and validate the config file
    /// - open the record store
    pub async fn load(cashbook_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = cashbook_home.into();
        if !maybe_relative.is_dir() {
            bail!(
                "The cashbook home '{}' is missing, run 'cashbook init' first",
                maybe_relative.display()
            )
        }
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let tz = parse_time_zone(&config_file.time_zone)
            .with_context(|| format!("Bad time_zone in {}", config_path.display()))?;

        let store = Store::load(&root)
            .await
            .context("Unable to open the record store")?;

        Ok(Self {
            root,
            config_path,
            calendar: Calendar::new(tz, config_file.week_start),
            config_file,
            store,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }

    /// The reporting currency. New expenses are recorded in it and exports label every row with
    /// it.
    pub fn currency_code(&self) -> &str {
        &self.config_file.currency_code
    }

    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// The category used when an expense is added without one, or with a name that is not found.
    pub fn default_category_id(&self) -> Uuid {
        self.config_file.default_category_id
    }

    pub fn last_export_at(&self) -> Option<DateTime<Utc>> {
        self.config_file.last_export_at
    }

    /// Changes the reporting currency. Stored expenses keep the code they were recorded with.
    /// Call `save` to persist.
    pub fn set_currency_code(&mut self, currency_code: &str) -> Result<()> {
        let currency_code = currency_code.trim().to_uppercase();
        ensure!(
            is_currency_code(&currency_code),
            "Invalid currency code '{currency_code}', expected three letters such as USD"
        );
        self.config_file.currency_code = currency_code;
        Ok(())
    }

    /// Changes the calendar's time zone. Call `save` to persist.
    pub fn set_time_zone(&mut self, time_zone: &str) -> Result<()> {
        let tz = parse_time_zone(time_zone)?;
        self.config_file.time_zone = tz.name().to_string();
        self.calendar = Calendar::new(tz, self.calendar.week_start());
        Ok(())
    }

    /// Changes the first day of the week. Call `save` to persist.
    pub fn set_week_start(&mut self, week_start: WeekStart) {
        self.config_file.week_start = week_start;
        self.calendar = Calendar::new(self.calendar.time_zone(), week_start);
    }

    /// Changes the fallback category for new expenses. The caller checks that it exists and is
    /// not archived. Call `save` to persist.
    pub fn set_default_category_id(&mut self, id: Uuid) {
        self.config_file.default_category_id = id;
    }

    /// Writes the current settings to `config.json`.
    pub async fn save(&self) -> Result<()> {
        self.config_file.save(&self.config_path).await
    }

    /// Records the time of the most recent export and saves the config file.
    pub async fn set_last_export_at(&mut self, at: DateTime<Utc>) -> Result<()> {
        self.config_file.last_export_at = Some(at);
        self.config_file.save(&self.config_path).await
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "cashbook",
///   "config_version": 1,
///   "currency_code": "EUR",
///   "time_zone": "Europe/Berlin",
///   "week_start": "monday",
///   "default_category_id": "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa",
///   "last_export_at": "2024-03-31T18:22:05Z"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "cashbook"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// ISO 4217 reporting currency
    #[serde(default = "default_currency")]
    currency_code: String,

    /// IANA time zone name used for calendar boundaries
    #[serde(default = "default_time_zone")]
    time_zone: String,

    #[serde(default)]
    week_start: WeekStart,

    #[serde(default = "default_category")]
    default_category_id: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_export_at: Option<DateTime<Utc>>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

fn default_category() -> Uuid {
    OTHER_ID
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            currency_code: default_currency(),
            time_zone: default_time_zone(),
            week_start: WeekStart::default(),
            default_category_id: default_category(),
            last_export_at: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if `app_name` is wrong.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            is_currency_code(&config.currency_code),
            "Invalid currency_code in config file: '{}'",
            config.currency_code
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        utils::serialize(path.as_ref(), self)
            .await
            .context("Unable to write config file")
    }
}
