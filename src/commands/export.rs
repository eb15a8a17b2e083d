use crate::args::ExportArgs;
use crate::calendar::DateRange;
use crate::commands::{resolve_range, Out};
use crate::export::to_csv;
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// The structured output of `cashbook export`.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub range: DateRange,
    pub rows: usize,
    /// `None` when the CSV went to standard output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Writes the expenses of the selected range as CSV, to `--output` or to standard output, and
/// records the export time in the config file.
pub async fn export(
    mut config: Config,
    args: &ExportArgs,
    now: DateTime<Utc>,
) -> Result<Out<ExportReport>> {
    let range = resolve_range(&config, args.range(), now)?;
    let store = config.store();
    let expenses = store.expenses().await?;
    let categories = store.categories().await?.by_id();

    let text = to_csv(&expenses, &categories, config.currency_code(), &range)?;
    let rows = expenses.iter().filter(|e| e.is_active_in(&range)).count();

    match args.output() {
        Some(path) => utils::write(path, &text).await?,
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(text.as_bytes())
                .await
                .context("Unable to write the CSV to stdout")?;
            stdout.flush().await.context("Unable to flush stdout")?;
        }
    }
    config.set_last_export_at(now).await?;

    let path = args.output().map(|p| p.to_path_buf());
    let message = match &path {
        Some(p) => format!("Exported {rows} expense(s) for {range} to {}", p.display()),
        None => format!("Exported {rows} expense(s) for {range}"),
    };
    Ok(Out::new(message, ExportReport { range, rows, path }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::RangeArgs;
    use crate::model::FOOD_ID;
    use crate::test::{utc, TestEnv};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_export_to_file() {
        let env = TestEnv::new().await;
        env.insert_expense("12.345", FOOD_ID, "2024-03-01T10:00:00Z", Some("lunch, quick"))
            .await;
        let deleted = env
            .insert_expense("3.00", FOOD_ID, "2024-03-01T11:00:00Z", None)
            .await;
        env.config()
            .store()
            .delete_expenses(&[deleted.id()], utc("2024-03-01T12:00:00Z"))
            .await
            .unwrap();

        let out_dir = TempDir::new().unwrap();
        let path = out_dir.path().join("march.csv");
        let now = utc("2024-03-15T12:00:00Z");
        let out = export(
            env.config(),
            &ExportArgs::new(RangeArgs::custom("2024-03-01", "2024-03-02"), Some(path.clone())),
            now,
        )
        .await
        .unwrap();

        assert_eq!(out.structure().unwrap().rows, 1);
        assert!(out.message().ends_with("march.csv"));

        let written = utils::read(&path).await.unwrap();
        assert_eq!(
            written,
            "dateSpent,amount,currency,category,note,createdAt\n\
            2024-03-01T10:00:00Z,12.34,USD,Food,\"lunch, quick\",2024-03-01T10:00:00Z\n"
        );

        assert_eq!(env.reload().await.last_export_at(), Some(now));
    }

    #[tokio::test]
    async fn test_export_empty_range() {
        let env = TestEnv::new().await;
        let out_dir = TempDir::new().unwrap();
        let path = out_dir.path().join("empty.csv");
        let out = export(
            env.config(),
            &ExportArgs::new(RangeArgs::default(), Some(path.clone())),
            utc("2024-03-15T12:00:00Z"),
        )
        .await
        .unwrap();
        assert_eq!(out.structure().unwrap().rows, 0);
        assert_eq!(
            utils::read(&path).await.unwrap(),
            "dateSpent,amount,currency,category,note,createdAt\n"
        );
    }
}
