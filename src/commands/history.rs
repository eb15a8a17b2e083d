use crate::args::HistoryArgs;
use crate::commands::{resolve_range, Out};
use crate::history::{filter, group_by_day, section_title, DaySection, HistoryFilter};
use crate::money;
use crate::{Config, Result};
use anyhow::anyhow;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Lists the expenses of a range grouped by day, newest first.
///
/// Category filters are given by name and must all exist and not be archived. The search text
/// is matched against notes and category names, ignoring case.
pub async fn history(
    config: Config,
    args: &HistoryArgs,
    now: DateTime<Utc>,
) -> Result<Out<Vec<DaySection>>> {
    let range = resolve_range(&config, args.range(), now)?;
    let calendar = config.calendar();
    let store = config.store();
    let expenses = store.expenses().await?;
    let categories = store.categories().await?;

    let category_ids = args
        .categories()
        .iter()
        .map(|name| {
            categories
                .find_active_by_name(name)
                .map(|c| c.id())
                .ok_or_else(|| anyhow!("Unknown or archived category '{name}'"))
        })
        .collect::<Result<Vec<Uuid>>>()?;

    let mut history_filter = HistoryFilter::new(range).with_categories(category_ids);
    if let Some(search) = args.search() {
        history_filter = history_filter.with_search(search);
    }

    let by_id = categories.by_id();
    let matching = filter(&expenses, &by_id, &history_filter);
    let sections = group_by_day(&matching, &by_id, &calendar);

    let currency = config.currency_code();
    let message = if sections.is_empty() {
        format!("No expenses for {range}")
    } else {
        let mut lines = Vec::new();
        for section in &sections {
            lines.push(format!(
                "{}: {}",
                section_title(section.day, now, &calendar),
                money::format(section.total, currency)
            ));
            for entry in &section.entries {
                let time = entry.date_spent.with_timezone(&calendar.time_zone());
                let mut line = format!(
                    "  {}  {}  {}",
                    time.format("%H:%M"),
                    money::format(entry.amount, currency),
                    entry.category
                );
                if let Some(note) = &entry.note {
                    line.push_str("  ");
                    line.push_str(note);
                }
                line.push_str(&format!("  ({})", entry.id));
                lines.push(line);
            }
        }
        lines.join("\n")
    };
    Ok(Out::new(message, sections))
}
