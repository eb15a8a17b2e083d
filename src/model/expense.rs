use crate::calendar::DateRange;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single logged expenditure.
///
/// Expenses are never physically removed: deleting one sets `is_deleted`. Every computation in
/// this crate filters soft-deleted expenses out on its own, so it is safe to hand it an unfiltered
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Expense {
    id: Uuid,
    /// Always positive once stored. Validation happens before an `Expense` is created.
    amount: Decimal,
    /// The currency the expense was recorded in. Amounts are never converted.
    currency_code: String,
    /// May refer to a category that no longer exists.
    category_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    /// When the money was spent. Ranges and day buckets are based on this, not `created_at`.
    date_spent: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    is_deleted: bool,
}

impl Expense {
    /// Creates a new, active expense with a random id. `created_at` and `updated_at` are set to
    /// the current time.
    pub fn new(
        amount: Decimal,
        currency_code: impl Into<String>,
        category_id: Uuid,
        date_spent: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            amount,
            currency_code: currency_code.into(),
            category_id,
            note: None,
            date_spent,
            created_at: now,
            updated_at: now,
            is_deleted: false,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Sets the note. Blank notes are stored as `None`.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.note = if note.trim().is_empty() {
            None
        } else {
            Some(note)
        };
        self
    }

    /// Sets both `created_at` and `updated_at`.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = created_at;
        self
    }

    /// Replaces the amount. The caller validates it, as for `new`.
    pub fn set_amount(&mut self, amount: Decimal) {
        self.amount = amount;
    }

    pub fn set_currency_code(&mut self, currency_code: impl Into<String>) {
        self.currency_code = currency_code.into();
    }

    pub fn set_category_id(&mut self, category_id: Uuid) {
        self.category_id = category_id;
    }

    /// Replaces the note. A blank note clears it.
    pub fn set_note(&mut self, note: impl Into<String>) {
        let note = note.into();
        self.note = if note.trim().is_empty() {
            None
        } else {
            Some(note)
        };
    }

    pub fn set_date_spent(&mut self, date_spent: DateTime<Utc>) {
        self.date_spent = date_spent;
    }

    /// Records that the expense was edited at `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Marks the expense as deleted.
    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.is_deleted = true;
        self.updated_at = now;
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    pub fn category_id(&self) -> Uuid {
        self.category_id
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn date_spent(&self) -> DateTime<Utc> {
        self.date_spent
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    /// True if the expense is not deleted and was spent within `range`.
    pub fn is_active_in(&self, range: &DateRange) -> bool {
        !self.is_deleted && range.contains(self.date_spent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_blank_note_is_none() {
        let e = Expense::new(Decimal::ONE, "USD", Uuid::nil(), Utc::now()).with_note("   ");
        assert_eq!(e.note(), None);
        let e = e.with_note("lunch");
        assert_eq!(e.note(), Some("lunch"));
    }

    #[test]
    fn test_edit_fields() {
        let created = utc("2024-03-01T10:00:00Z");
        let mut e = Expense::new(Decimal::ONE, "USD", Uuid::nil(), created)
            .with_created_at(created)
            .with_note("lunch");
        let edited = utc("2024-03-02T09:00:00Z");
        e.set_amount(Decimal::TEN);
        e.set_currency_code("EUR");
        e.set_category_id(Uuid::from_u128(1));
        e.set_date_spent(edited);
        e.set_note("  ");
        e.touch(edited);

        assert_eq!(e.amount(), Decimal::TEN);
        assert_eq!(e.currency_code(), "EUR");
        assert_eq!(e.category_id(), Uuid::from_u128(1));
        assert_eq!(e.date_spent(), edited);
        assert_eq!(e.note(), None);
        assert_eq!(e.created_at(), created);
        assert_eq!(e.updated_at(), edited);
    }

    #[test]
    fn test_mark_deleted() {
        let created = utc("2024-03-01T10:00:00Z");
        let mut e = Expense::new(Decimal::ONE, "USD", Uuid::nil(), created).with_created_at(created);
        assert!(!e.is_deleted());
        let later = utc("2024-03-05T10:00:00Z");
        e.mark_deleted(later);
        assert!(e.is_deleted());
        assert_eq!(e.updated_at(), later);
        assert_eq!(e.created_at(), created);
    }

    #[test]
    fn test_is_active_in() {
        let range = DateRange::new(utc("2024-03-01T00:00:00Z"), utc("2024-03-02T00:00:00Z")).unwrap();
        let at_start = Expense::new(Decimal::ONE, "USD", Uuid::nil(), range.start());
        let at_end = Expense::new(Decimal::ONE, "USD", Uuid::nil(), range.end());
        assert!(at_start.is_active_in(&range));
        assert!(!at_end.is_active_in(&range));

        let mut deleted = at_start.clone();
        deleted.mark_deleted(Utc::now());
        assert!(!deleted.is_active_in(&range));
    }

    #[test]
    fn test_json_shape() {
        let e = Expense::new(
            Decimal::from_str("12.34").unwrap(),
            "EUR",
            Uuid::nil(),
            utc("2024-03-01T10:00:00Z"),
        )
        .with_id(Uuid::nil())
        .with_created_at(utc("2024-03-01T11:00:00Z"));

        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["amount"], "12.34");
        assert_eq!(json["currency_code"], "EUR");
        assert_eq!(json["is_deleted"], false);
        assert!(json.get("note").is_none());

        let parsed: Expense = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, e);
    }
}
