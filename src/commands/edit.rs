use crate::args::EditArgs;
use crate::calendar::parse_boundary;
use crate::commands::add::parse_amount;
use crate::commands::Out;
use crate::model::{category_name, Expense};
use crate::money;
use crate::{Config, Result};
use anyhow::{anyhow, ensure};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Changes an existing, active expense. Only the fields that are given change, and `updated_at` is
/// set to `now`.
///
/// The edited expense is re-recorded in the current reporting currency. Amounts follow the same
/// rules as `add`. Unlike `add`, an unknown or archived category name is an error rather than a
/// fallback to the default.
pub async fn edit(config: Config, args: &EditArgs, now: DateTime<Utc>) -> Result<Out<Expense>> {
    ensure!(
        args.amount().is_some()
            || args.category().is_some()
            || args.note().is_some()
            || args.date().is_some(),
        "Nothing to change, give at least one of --amount, --category, --note or --date"
    );

    let amount = args.amount().map(parse_amount).transpose()?;
    let calendar = config.calendar();
    let date_spent = args
        .date()
        .map(|text| parse_boundary(text, &calendar))
        .transpose()?;

    let store = config.store();
    let categories = store.categories().await?;
    let category_id = match args.category() {
        Some(name) => Some(
            categories
                .find_active_by_name(name)
                .map(|c| c.id())
                .ok_or_else(|| anyhow!("No active category named '{}'", name.trim()))?,
        ),
        None => None,
    };

    let currency = config.currency_code();
    let expense = store
        .update_expense(args.id(), now, |expense| {
            if let Some(amount) = amount {
                expense.set_amount(amount);
            }
            if let Some(id) = category_id {
                expense.set_category_id(id);
            }
            if let Some(note) = args.note() {
                expense.set_note(note);
            }
            if let Some(date) = date_spent {
                expense.set_date_spent(date);
            }
            expense.set_currency_code(currency);
        })
        .await?;
    debug!("Updated expense {}", expense.id());

    let message = format!(
        "Updated {} for {} on {} ({})",
        money::format(expense.amount(), currency),
        category_name(&categories.by_id(), expense.category_id()),
        calendar.local_date(expense.date_spent()).format("%b %-d, %Y"),
        expense.id()
    );
    Ok(Out::new(message, expense))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{COFFEE_ID, FOOD_ID, RENT_ID};
    use crate::test::{utc, TestEnv};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_edit() {
        let env = TestEnv::new().await;
        let original = env
            .insert_expense("4.50", FOOD_ID, "2024-03-01T08:00:00Z", Some("Lunch"))
            .await;
        let now = utc("2024-03-05T10:00:00Z");

        let args = EditArgs::new(original.id())
            .with_amount("5,255")
            .with_category("coffee")
            .with_date("2024-03-02");
        let out = edit(env.config(), &args, now).await.unwrap();
        assert_eq!(
            out.message(),
            format!("Updated $5.26 for Coffee on Mar 2, 2024 ({})", original.id())
        );

        let stored = env.expenses().await;
        let e = &stored[0];
        assert_eq!(e.amount(), Decimal::from_str("5.26").unwrap());
        assert_eq!(e.category_id(), COFFEE_ID);
        assert_eq!(e.date_spent(), utc("2024-03-02T00:00:00Z"));
        assert_eq!(e.note(), Some("Lunch"));
        assert_eq!(e.created_at(), original.created_at());
        assert_eq!(e.updated_at(), now);
    }

    #[tokio::test]
    async fn test_edit_clears_note() {
        let env = TestEnv::new().await;
        let original = env
            .insert_expense("4.50", FOOD_ID, "2024-03-01T08:00:00Z", Some("Lunch"))
            .await;
        edit(
            env.config(),
            &EditArgs::new(original.id()).with_note(""),
            utc("2024-03-05T10:00:00Z"),
        )
        .await
        .unwrap();
        let stored = env.expenses().await;
        assert_eq!(stored[0].note(), None);
        assert_eq!(stored[0].amount(), original.amount());
    }

    #[tokio::test]
    async fn test_edit_rejects_archived_category() {
        let env = TestEnv::new().await;
        let original = env
            .insert_expense("4.50", FOOD_ID, "2024-03-01T08:00:00Z", None)
            .await;
        let store = env.config().store().clone();
        let mut categories = store.categories().await.unwrap();
        categories.set_archived("Rent", true).unwrap();
        store.save_categories(&categories).await.unwrap();

        let err = edit(
            env.config(),
            &EditArgs::new(original.id()).with_category("Rent"),
            utc("2024-03-05T10:00:00Z"),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("No active category named 'Rent'"));
        assert_ne!(env.expenses().await[0].category_id(), RENT_ID);
    }

    #[tokio::test]
    async fn test_edit_rejects_bad_input() {
        let env = TestEnv::new().await;
        let original = env
            .insert_expense("4.50", FOOD_ID, "2024-03-01T08:00:00Z", None)
            .await;
        let now = utc("2024-03-05T10:00:00Z");

        assert!(edit(env.config(), &EditArgs::new(original.id()), now)
            .await
            .is_err());
        for amount in ["0", "-1", "abc", "0.001"] {
            let args = EditArgs::new(original.id()).with_amount(amount);
            assert!(edit(env.config(), &args, now).await.is_err(), "amount {amount}");
        }
        let args = EditArgs::new(Uuid::new_v4()).with_note("missing");
        assert!(edit(env.config(), &args, now).await.is_err());

        assert_eq!(env.expenses().await[0], original);
    }

    #[tokio::test]
    async fn test_edit_deleted_expense_fails() {
        let env = TestEnv::new().await;
        let original = env
            .insert_expense("4.50", FOOD_ID, "2024-03-01T08:00:00Z", None)
            .await;
        let now = utc("2024-03-05T10:00:00Z");
        env.config()
            .store()
            .delete_expenses(&[original.id()], now)
            .await
            .unwrap();

        let args = EditArgs::new(original.id()).with_note("too late");
        let err = edit(env.config(), &args, now).await.unwrap_err();
        assert!(err.to_string().contains("has been deleted"));
    }
}
