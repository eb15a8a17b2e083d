//! Expense aggregation: totals, daily and per-category breakdowns for a date range.
//!
//! `summarize` is a pure function over a snapshot of expenses. Each expense amount is rounded to
//! currency precision before it is added to anything, and every sum is rounded again, so the
//! total always equals both the sum of the daily totals and the sum of the category totals.
//! Sums saturate at `Decimal::MAX` instead of overflowing.

use crate::calendar::{Calendar, DateRange};
use crate::model::Expense;
use crate::money::{round_currency, sum_currency};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::trace;
use uuid::Uuid;

/// The sum spent on one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayTotal {
    /// The first instant of the local day.
    pub day: DateTime<Utc>,
    pub total: Decimal,
}

/// The sum spent in one category. The id is not resolved to a name here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category_id: Uuid,
    pub total: Decimal,
}

/// The result of aggregating expenses over a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: Decimal,
    pub avg_per_day: Decimal,
    pub highest_day_total: Decimal,
    /// `None` when no expenses fall within the range.
    pub highest_day: Option<DateTime<Utc>>,
    /// Descending by total. The order among equal totals carries no meaning.
    pub category_totals: Vec<CategoryTotal>,
    /// Ascending by day. Days without expenses are omitted.
    pub daily_totals: Vec<DayTotal>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.daily_totals.is_empty()
    }
}

/// Summarizes the active expenses spent within `range`.
///
/// Deleted expenses and expenses outside `[range.start, range.end)` are ignored. Days are
/// bucketed on `calendar`'s local midnights. The average per day divides by the number of whole
/// calendar days in the range, counting at least one day.
pub fn summarize(expenses: &[Expense], range: &DateRange, calendar: &Calendar) -> Summary {
    let included: Vec<&Expense> = expenses.iter().filter(|e| e.is_active_in(range)).collect();
    trace!(
        "Summarizing {} of {} expenses for {range}",
        included.len(),
        expenses.len()
    );

    let total = sum_currency(included.iter().map(|e| e.amount()));

    let mut by_day: BTreeMap<DateTime<Utc>, Decimal> = BTreeMap::new();
    let mut by_category: BTreeMap<Uuid, Decimal> = BTreeMap::new();
    for expense in &included {
        let amount = round_currency(expense.amount());
        let day = by_day
            .entry(calendar.start_of_day(expense.date_spent()))
            .or_insert(Decimal::ZERO);
        *day = day.saturating_add(amount);
        let category = by_category
            .entry(expense.category_id())
            .or_insert(Decimal::ZERO);
        *category = category.saturating_add(amount);
    }

    let daily_totals: Vec<DayTotal> = by_day
        .into_iter()
        .map(|(day, total)| DayTotal {
            day,
            total: round_currency(total),
        })
        .collect();

    let (highest_day, highest_day_total) = match highest(&daily_totals) {
        Some(day) => (Some(day.day), day.total),
        None => (None, Decimal::ZERO),
    };

    let day_count = calendar
        .whole_days_between(
            calendar.start_of_day(range.start()),
            calendar.start_of_day(range.end()),
        )
        .max(1);
    let avg_per_day = round_currency(total / Decimal::from(day_count));

    let mut category_totals: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category_id, total)| CategoryTotal {
            category_id,
            total: round_currency(total),
        })
        .collect();
    // Stable sort, so ties stay in id order.
    category_totals.sort_by(|a, b| b.total.cmp(&a.total));

    Summary {
        total,
        avg_per_day,
        highest_day_total,
        highest_day,
        category_totals,
        daily_totals,
    }
}

/// The first day, in ascending order, whose total is the maximum.
fn highest(daily_totals: &[DayTotal]) -> Option<&DayTotal> {
    let mut best: Option<&DayTotal> = None;
    for day in daily_totals {
        match best {
            Some(b) if day.total <= b.total => {}
            _ => best = Some(day),
        }
    }
    best
}
