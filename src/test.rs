//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::calendar::WeekStart;
use crate::model::Expense;
use crate::Config;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use tempfile::TempDir;
use uuid::Uuid;

/// Test environment that sets up an initialized cashbook home directory.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a USD cashbook on the UTC calendar with Monday weeks.
    pub async fn new() -> Self {
        Self::with_settings("USD", "UTC", WeekStart::Monday).await
    }

    pub async fn with_settings(currency: &str, time_zone: &str, week_start: WeekStart) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("cashbook");
        let config = Config::create(&root, currency, time_zone, week_start)
            .await
            .unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Reloads the Config from disk, e.g. after a command has changed it.
    pub async fn reload(&self) -> Config {
        Config::load(self.config.root()).await.unwrap()
    }

    /// Stores an expense in the configured currency. `date` is an RFC 3339 timestamp and is used
    /// for both `date_spent` and `created_at`.
    pub async fn insert_expense(
        &self,
        amount: &str,
        category_id: Uuid,
        date: &str,
        note: Option<&str>,
    ) -> Expense {
        let date = utc(date);
        let mut expense = Expense::new(
            Decimal::from_str(amount).unwrap(),
            self.config.currency_code(),
            category_id,
            date,
        )
        .with_created_at(date);
        if let Some(note) = note {
            expense = expense.with_note(note);
        }
        self.config
            .store()
            .insert_expense(expense.clone())
            .await
            .unwrap();
        expense
    }

    /// All stored expenses, including deleted ones.
    pub async fn expenses(&self) -> Vec<Expense> {
        self.config.store().expenses().await.unwrap()
    }
}

pub fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}
