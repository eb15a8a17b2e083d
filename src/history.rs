//! The expense history: filtering by range, category and free text, and grouping into days.

use crate::calendar::{Calendar, DateRange};
use crate::model::{category_name, Category, Expense};
use crate::money::{round_currency, sum_currency};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use uuid::Uuid;

/// Which expenses to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryFilter {
    range: DateRange,
    /// Empty means every category.
    category_ids: BTreeSet<Uuid>,
    /// Matched case-insensitively against the note and the category name.
    search: String,
}

impl HistoryFilter {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            category_ids: BTreeSet::new(),
            search: String::new(),
        }
    }

    pub fn with_categories(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.category_ids = ids.into_iter().collect();
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into().trim().to_lowercase();
        self
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    fn matches(&self, expense: &Expense, categories_by_id: &HashMap<Uuid, Category>) -> bool {
        if !expense.is_active_in(&self.range) {
            return false;
        }
        if !self.category_ids.is_empty() && !self.category_ids.contains(&expense.category_id()) {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }
        let note = expense.note().unwrap_or_default().to_lowercase();
        // An unresolved category has no name to search.
        let category = categories_by_id
            .get(&expense.category_id())
            .map(|c| c.name().to_lowercase())
            .unwrap_or_default();
        note.contains(&self.search) || category.contains(&self.search)
    }
}

/// Returns the expenses that pass `filter`, in their original order.
pub fn filter<'a>(
    expenses: &'a [Expense],
    categories_by_id: &HashMap<Uuid, Category>,
    filter: &HistoryFilter,
) -> Vec<&'a Expense> {
    expenses
        .iter()
        .filter(|e| filter.matches(e, categories_by_id))
        .collect()
}

/// One row in a day section, with the category name already resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub date_spent: DateTime<Utc>,
    pub amount: Decimal,
    pub category: String,
    pub note: Option<String>,
}

/// All the expenses of one local day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySection {
    /// The first instant of the local day.
    pub day: DateTime<Utc>,
    pub total: Decimal,
    /// Newest first.
    pub entries: Vec<HistoryEntry>,
}

/// Groups `expenses` by local day, newest day first and newest expense first within each day.
pub fn group_by_day(
    expenses: &[&Expense],
    categories_by_id: &HashMap<Uuid, Category>,
    calendar: &Calendar,
) -> Vec<DaySection> {
    let mut days: BTreeMap<DateTime<Utc>, Vec<&Expense>> = BTreeMap::new();
    for expense in expenses {
        days.entry(calendar.start_of_day(expense.date_spent()))
            .or_default()
            .push(expense);
    }

    days.into_iter()
        .rev()
        .map(|(day, mut items)| {
            items.sort_by(|a, b| b.date_spent().cmp(&a.date_spent()));
            let total = sum_currency(items.iter().map(|e| e.amount()));
            let entries = items
                .into_iter()
                .map(|e| HistoryEntry {
                    id: e.id(),
                    date_spent: e.date_spent(),
                    amount: round_currency(e.amount()),
                    category: category_name(categories_by_id, e.category_id()).to_string(),
                    note: e.note().map(str::to_string),
                })
                .collect();
            DaySection {
                day,
                total,
                entries,
            }
        })
        .collect()
}

/// The heading for a day section: `Today`, `Yesterday` or a short date such as `Mar 1, 2024`.
pub fn section_title(day: DateTime<Utc>, now: DateTime<Utc>, calendar: &Calendar) -> String {
    if calendar.is_today(day, now) {
        return String::from("Today");
    }
    if calendar.is_yesterday(day, now) {
        return String::from("Yesterday");
    }
    calendar.local_date(day).format("%b %-d, %Y").to_string()
}
