//! The record store: expenses and categories kept as JSON files in the cashbook home.
//!
//! Every operation reads the whole file and writes it back. The aggregation and export code only
//! ever sees the snapshots handed out by `expenses` and `categories`.

use crate::model::{Categories, Expense};
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use uuid::Uuid;

const EXPENSES_JSON: &str = "expenses.json";
const CATEGORIES_JSON: &str = "categories.json";

#[derive(Debug, Clone)]
pub(crate) struct Store {
    expenses_path: PathBuf,
    categories_path: PathBuf,
}

impl Store {
    /// Creates the store files in `root`. Categories are seeded with the defaults. Files that
    /// already exist are left untouched.
    pub(crate) async fn init(root: &Path) -> Result<Self> {
        let store = Self::paths(root);
        if !store.expenses_path.is_file() {
            store.save_expenses(&[]).await?;
        }
        if !store.categories_path.is_file() {
            store.save_categories(&Categories::defaults()).await?;
            debug!("Seeded the default categories");
        }
        Ok(store)
    }

    /// Opens an existing store in `root`.
    pub(crate) async fn load(root: &Path) -> Result<Self> {
        let store = Self::paths(root);
        for path in [&store.expenses_path, &store.categories_path] {
            if !path.is_file() {
                bail!("The data file is missing '{}'", path.display())
            }
        }
        Ok(store)
    }

    fn paths(root: &Path) -> Self {
        Self {
            expenses_path: root.join(EXPENSES_JSON),
            categories_path: root.join(CATEGORIES_JSON),
        }
    }

    /// All stored expenses, including deleted ones.
    pub(crate) async fn expenses(&self) -> Result<Vec<Expense>> {
        let expenses: Vec<Expense> = utils::deserialize(&self.expenses_path)
            .await
            .context("Unable to load expenses")?;
        trace!("Loaded {} expenses", expenses.len());
        Ok(expenses)
    }

    pub(crate) async fn save_expenses(&self, expenses: &[Expense]) -> Result<()> {
        utils::serialize(&self.expenses_path, &expenses)
            .await
            .context("Unable to save expenses")
    }

    pub(crate) async fn categories(&self) -> Result<Categories> {
        utils::deserialize(&self.categories_path)
            .await
            .context("Unable to load categories")
    }

    pub(crate) async fn save_categories(&self, categories: &Categories) -> Result<()> {
        utils::serialize(&self.categories_path, categories)
            .await
            .context("Unable to save categories")
    }

    /// Appends `expense`, failing if its id is already taken.
    pub(crate) async fn insert_expense(&self, expense: Expense) -> Result<()> {
        let mut expenses = self.expenses().await?;
        ensure!(
            expenses.iter().all(|e| e.id() != expense.id()),
            "An expense with id {} already exists",
            expense.id()
        );
        expenses.push(expense);
        self.save_expenses(&expenses).await
    }

    /// Applies `edit` to the active expense with `id`, sets its `updated_at` to `now` and saves.
    /// Returns the edited expense.
    pub(crate) async fn update_expense<F>(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        edit: F,
    ) -> Result<Expense>
    where
        F: FnOnce(&mut Expense),
    {
        let mut expenses = self.expenses().await?;
        let expense = match expenses.iter_mut().find(|e| e.id() == id) {
            Some(e) => e,
            None => bail!("No expense found with id {id}"),
        };
        ensure!(!expense.is_deleted(), "The expense {id} has been deleted");
        edit(expense);
        expense.touch(now);
        let updated = expense.clone();
        self.save_expenses(&expenses).await?;
        Ok(updated)
    }

    /// Soft-deletes the expenses with the given ids and returns the ids that changed. Ids that
    /// are already deleted are skipped. If any id is unknown nothing is changed.
    pub(crate) async fn delete_expenses(
        &self,
        ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> Result<Vec<Uuid>> {
        let mut expenses = self.expenses().await?;
        let known: HashSet<Uuid> = expenses.iter().map(|e| e.id()).collect();
        if let Some(missing) = ids.iter().find(|id| !known.contains(id)) {
            bail!("No expense found with id {missing}")
        }

        let wanted: HashSet<&Uuid> = ids.iter().collect();
        let mut deleted = Vec::new();
        for expense in expenses.iter_mut() {
            if wanted.contains(&expense.id()) && !expense.is_deleted() {
                expense.mark_deleted(now);
                deleted.push(expense.id());
            }
        }
        if !deleted.is_empty() {
            self.save_expenses(&expenses).await?;
        }
        Ok(deleted)
    }
}
