use crate::args::DeleteArgs;
use crate::commands::Out;
use crate::{Config, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Soft-deletes expenses by id. Deleted expenses stay in `expenses.json` but are excluded from
/// summaries, history and exports.
///
/// An id given more than once counts once.
///
/// # Errors
/// Fails without deleting anything if any id does not exist.
pub async fn delete(
    config: Config,
    args: &DeleteArgs,
    now: DateTime<Utc>,
) -> Result<Out<Vec<Uuid>>> {
    let unique: Vec<Uuid> = args
        .ids()
        .iter()
        .copied()
        .collect::<BTreeSet<Uuid>>()
        .into_iter()
        .collect();
    let deleted = config.store().delete_expenses(&unique, now).await?;
    let skipped = unique.len().saturating_sub(deleted.len());
    let message = match (deleted.len(), skipped) {
        (n, 0) => format!("Deleted {n} expense(s)"),
        (n, s) => format!("Deleted {n} expense(s), {s} already deleted"),
    };
    Ok(Out::new(message, deleted))
}
