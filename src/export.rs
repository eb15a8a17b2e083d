//! CSV export of expenses.
//!
//! The header and column order are a stable contract:
//!
//! ```text
//! dateSpent,amount,currency,category,note,createdAt
//! 2024-03-01T10:00:00Z,12.34,USD,Food,"lunch, quick",2024-03-01T10:05:00Z
//! ```
//!
//! Timestamps are ISO-8601 in UTC with whole seconds. Amounts are the plain decimal value after
//! rounding to currency precision, without trailing fractional zeros. The currency column always
//! carries the reporting currency passed in by the caller; no conversion is performed.

use crate::calendar::DateRange;
use crate::model::{category_name, Category, Expense};
use crate::money::round_currency;
use crate::Result;
use anyhow::{anyhow, Context};
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// The header row of every export.
pub const HEADER: [&str; 6] = [
    "dateSpent",
    "amount",
    "currency",
    "category",
    "note",
    "createdAt",
];

/// Produces CSV text for the active expenses spent within `range`, oldest first.
///
/// Fields containing a comma, double quote or line break are quoted with embedded quotes doubled.
/// Every line, including the header, ends with `\n`, so an export with no matching expenses is
/// exactly the header line.
///
/// # Errors
/// Only if the in-memory CSV writer fails.
pub fn to_csv(
    expenses: &[Expense],
    categories_by_id: &HashMap<Uuid, Category>,
    currency_code: &str,
    range: &DateRange,
) -> Result<String> {
    let mut included: Vec<&Expense> = expenses.iter().filter(|e| e.is_active_in(range)).collect();
    included.sort_by_key(|e| e.date_spent());

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(HEADER)
        .context("Unable to write the CSV header")?;

    for expense in &included {
        writer
            .write_record([
                timestamp(expense.date_spent()),
                amount(expense.amount()),
                currency_code.to_string(),
                category_name(categories_by_id, expense.category_id()).to_string(),
                expense.note().unwrap_or_default().to_string(),
                timestamp(expense.created_at()),
            ])
            .with_context(|| format!("Unable to write CSV row for expense {}", expense.id()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Unable to finish the CSV export: {e}"))?;
    debug!("Exported {} expenses for {range}", included.len());
    String::from_utf8(bytes).context("The CSV export is not valid UTF-8")
}

fn timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn amount(value: Decimal) -> String {
    round_currency(value).normalize().to_string()
}
