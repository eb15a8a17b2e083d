use crate::args::RangeArgs;
use crate::calendar::DateRange;
use crate::commands::{resolve_range, Out};
use crate::model::category_name;
use crate::money;
use crate::summary::{summarize, Summary};
use crate::{Config, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// The structured output of `cashbook summary`.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub range: DateRange,
    pub currency_code: String,
    pub summary: Summary,
    /// Parallel to `summary.category_totals`.
    pub category_names: Vec<String>,
}

/// Summarizes the expenses in the selected range.
pub async fn summary(
    config: Config,
    args: &RangeArgs,
    now: DateTime<Utc>,
) -> Result<Out<SummaryReport>> {
    let range = resolve_range(&config, args, now)?;
    let calendar = config.calendar();
    let store = config.store();
    let expenses = store.expenses().await?;
    let categories = store.categories().await?.by_id();

    let summary = summarize(&expenses, &range, &calendar);
    let category_names: Vec<String> = summary
        .category_totals
        .iter()
        .map(|c| category_name(&categories, c.category_id).to_string())
        .collect();

    let currency = config.currency_code();
    let fmt = |v| money::format(v, currency);
    let title = format!("{}, {range}", args.range().title());

    let message = if summary.is_empty() {
        format!("No expenses for {title}")
    } else {
        let mut lines = vec![
            title,
            format!("Total: {}", fmt(summary.total)),
            format!("Average per day: {}", fmt(summary.avg_per_day)),
        ];
        if let Some(day) = summary.highest_day {
            lines.push(format!(
                "Highest day: {} ({})",
                calendar.local_date(day).format("%b %-d, %Y"),
                fmt(summary.highest_day_total)
            ));
        }
        lines.push(String::from("By category:"));
        for (total, name) in summary.category_totals.iter().zip(&category_names) {
            lines.push(format!("  {name}: {}", fmt(total.total)));
        }
        lines.join("\n")
    };

    let report = SummaryReport {
        range,
        currency_code: currency.to_string(),
        summary,
        category_names,
    };
    Ok(Out::new(message, report))
}
