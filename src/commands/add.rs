use crate::args::AddArgs;
use crate::calendar::parse_boundary;
use crate::commands::Out;
use crate::model::{category_name, Expense};
use crate::money::{self, parse_decimal, round_currency};
use crate::{Config, Result};
use anyhow::{anyhow, ensure};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Records a new expense in the reporting currency.
///
/// The amount accepts either `.` or `,` as the decimal separator, must be greater than zero and is
/// rounded to currency precision before it is stored. The category is looked up by name ignoring
/// case. If no category is given, or the name is not found or archived, the configured default is
/// used.
pub async fn add(config: Config, args: &AddArgs, now: DateTime<Utc>) -> Result<Out<Expense>> {
    let amount = parse_amount(args.amount())?;

    let calendar = config.calendar();
    let date_spent = match args.date() {
        Some(text) => parse_boundary(text, &calendar)?,
        None => now,
    };

    let store = config.store();
    let categories = store.categories().await?;
    let category_id = match args.category() {
        None => config.default_category_id(),
        Some(name) => match categories.find_active_by_name(name) {
            Some(category) => category.id(),
            None => {
                warn!("No active category named '{name}', using the default category");
                config.default_category_id()
            }
        },
    };

    let mut expense = Expense::new(amount, config.currency_code(), category_id, date_spent)
        .with_created_at(now);
    if let Some(note) = args.note() {
        expense = expense.with_note(note);
    }
    store.insert_expense(expense.clone()).await?;
    debug!("Stored expense {}", expense.id());

    let message = format!(
        "Added {} for {} on {} ({})",
        money::format(expense.amount(), config.currency_code()),
        category_name(&categories.by_id(), category_id),
        calendar.local_date(date_spent).format("%b %-d, %Y"),
        expense.id()
    );
    Ok(Out::new(message, expense))
}

/// Parses a user-entered amount and rounds it to currency precision.
///
/// # Errors
/// Fails for unparseable input and for amounts that are not positive after rounding.
pub(super) fn parse_amount(text: &str) -> Result<Decimal> {
    let amount = parse_decimal(text).ok_or_else(|| anyhow!("'{text}' is not a valid amount"))?;
    ensure!(
        amount > Decimal::ZERO,
        "The amount must be greater than zero, got {amount}"
    );
    let amount = round_currency(amount);
    // An amount that only had sub-cent digits rounds away to nothing.
    ensure!(amount > Decimal::ZERO, "The amount '{text}' rounds to zero");
    Ok(amount)
}
