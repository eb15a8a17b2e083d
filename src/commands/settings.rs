use crate::args::{ConfigArgs, ConfigCommand, ConfigSetArgs};
use crate::calendar::WeekStart;
use crate::commands::Out;
use crate::model::category_name;
use crate::{Config, Result};
use anyhow::{anyhow, ensure};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// The structured output of `cashbook config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub currency_code: String,
    pub time_zone: String,
    pub week_start: WeekStart,
    pub default_category_id: Uuid,
    pub default_category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_export_at: Option<DateTime<Utc>>,
}

/// Shows the settings, or changes them first with `config set`.
///
/// Changing the currency affects new and edited expenses and the currency column of exports.
/// Stored expenses are not converted. The default category must exist and not be archived.
pub async fn settings(mut config: Config, args: &ConfigArgs) -> Result<Out<Settings>> {
    let changed = match args.action() {
        None | Some(ConfigCommand::Show) => false,
        Some(ConfigCommand::Set(set)) => {
            apply(&mut config, set).await?;
            config.save().await?;
            true
        }
    };

    let categories = config.store().categories().await?.by_id();
    let calendar = config.calendar();
    let settings = Settings {
        currency_code: config.currency_code().to_string(),
        time_zone: calendar.time_zone().name().to_string(),
        week_start: calendar.week_start(),
        default_category_id: config.default_category_id(),
        default_category: category_name(&categories, config.default_category_id()).to_string(),
        last_export_at: config.last_export_at(),
    };

    let mut lines = Vec::new();
    if changed {
        lines.push(String::from("Saved settings"));
    }
    lines.push(format!("Currency: {}", settings.currency_code));
    lines.push(format!("Time zone: {}", settings.time_zone));
    lines.push(format!("Week starts on: {}", settings.week_start));
    lines.push(format!("Default category: {}", settings.default_category));
    if let Some(at) = settings.last_export_at {
        lines.push(format!("Last export: {}", at.to_rfc3339()));
    }
    Ok(Out::new(lines.join("\n"), settings))
}

async fn apply(config: &mut Config, set: &ConfigSetArgs) -> Result<()> {
    ensure!(
        !set.is_empty(),
        "Nothing to change, give at least one of --currency, --time-zone, --week-start or \
        --default-category"
    );
    if let Some(currency) = set.currency() {
        config.set_currency_code(currency)?;
    }
    if let Some(time_zone) = set.time_zone() {
        config.set_time_zone(time_zone)?;
    }
    if let Some(week_start) = set.week_start() {
        config.set_week_start(week_start);
    }
    if let Some(name) = set.default_category() {
        let categories = config.store().categories().await?;
        let id = categories
            .find_active_by_name(name)
            .map(|c| c.id())
            .ok_or_else(|| anyhow!("No active category named '{}'", name.trim()))?;
        config.set_default_category_id(id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::AddArgs;
    use crate::commands::add;
    use crate::model::{FOOD_ID, OTHER_ID};
    use crate::test::{utc, TestEnv};
    use chrono_tz::Tz;

    fn set(args: ConfigSetArgs) -> ConfigArgs {
        ConfigArgs::new(ConfigCommand::Set(args))
    }

    #[tokio::test]
    async fn test_show() {
        let env = TestEnv::new().await;
        let out = settings(env.config(), &ConfigArgs::default()).await.unwrap();
        assert_eq!(
            out.message(),
            "Currency: USD\nTime zone: UTC\nWeek starts on: monday\nDefault category: Other"
        );
        let report = out.structure().unwrap();
        assert_eq!(report.default_category_id, OTHER_ID);
        assert!(report.last_export_at.is_none());
    }

    #[tokio::test]
    async fn test_set_everything() {
        let env = TestEnv::new().await;
        let args = ConfigSetArgs::default()
            .with_currency("eur")
            .with_time_zone("Europe/Berlin")
            .with_week_start(WeekStart::Sunday)
            .with_default_category("food");
        let out = settings(env.config(), &set(args)).await.unwrap();
        assert!(out.message().starts_with("Saved settings\nCurrency: EUR"));

        let config = env.reload().await;
        assert_eq!(config.currency_code(), "EUR");
        assert_eq!(config.calendar().time_zone(), Tz::Europe__Berlin);
        assert_eq!(config.calendar().week_start(), WeekStart::Sunday);
        assert_eq!(config.default_category_id(), FOOD_ID);
    }

    #[tokio::test]
    async fn test_new_expenses_use_the_changed_settings() {
        let env = TestEnv::new().await;
        let args = ConfigSetArgs::default()
            .with_currency("GBP")
            .with_default_category("Food");
        settings(env.config(), &set(args)).await.unwrap();

        let out = add(
            env.reload().await,
            &AddArgs::new("3.00", None, None, None),
            utc("2024-03-10T09:30:00Z"),
        )
        .await
        .unwrap();
        let expense = out.structure().unwrap();
        assert_eq!(expense.currency_code(), "GBP");
        assert_eq!(expense.category_id(), FOOD_ID);
        assert!(out.message().starts_with("Added £3.00 for Food"));
    }

    #[tokio::test]
    async fn test_set_rejects_bad_values() {
        let env = TestEnv::new().await;
        for args in [
            ConfigSetArgs::default(),
            ConfigSetArgs::default().with_currency("dollars"),
            ConfigSetArgs::default().with_time_zone("Mars/Olympus"),
            ConfigSetArgs::default().with_default_category("Travel"),
        ] {
            assert!(settings(env.config(), &set(args)).await.is_err());
        }

        let store = env.config().store().clone();
        let mut categories = store.categories().await.unwrap();
        categories.set_archived("Food", true).unwrap();
        store.save_categories(&categories).await.unwrap();
        let args = ConfigSetArgs::default().with_default_category("Food");
        let err = settings(env.config(), &set(args)).await.unwrap_err();
        assert!(err.to_string().contains("No active category named 'Food'"));

        // A failed change leaves the file as it was.
        let config = env.reload().await;
        assert_eq!(config.currency_code(), "USD");
        assert_eq!(config.default_category_id(), OTHER_ID);
    }
}
