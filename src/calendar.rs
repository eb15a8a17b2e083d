//! Calendar boundary math and date ranges.
//!
//! Every boundary is computed on the wall clock of the calendar's time zone, so a "day" is the
//! span between two local midnights regardless of DST transitions. Instants are always carried as
//! `DateTime<Utc>`.

use crate::Result;
use anyhow::{anyhow, bail, ensure};
use chrono::{
    DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The shortest custom range that will be produced by `DateRange::clamped`.
const MIN_CUSTOM_RANGE_SECONDS: i64 = 60;

/// How far past a nonexistent local midnight we search for the first valid instant.
const GAP_SEARCH_STEP_MINUTES: i64 = 15;
const GAP_SEARCH_STEPS: usize = 4 * 24;

/// The first day of the week, used for the "this week" range.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

serde_plain::derive_display_from_serialize!(WeekStart);
serde_plain::derive_fromstr_from_deserialize!(WeekStart);

/// A time zone plus the week-start preference. All day, week and month boundaries are resolved
/// through a `Calendar`, which callers pass explicitly into every computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    time_zone: Tz,
    week_start: WeekStart,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl Calendar {
    pub fn new(time_zone: Tz, week_start: WeekStart) -> Self {
        Self {
            time_zone,
            week_start,
        }
    }

    /// A UTC calendar whose weeks start on Monday.
    pub fn utc() -> Self {
        Self::new(Tz::UTC, WeekStart::Monday)
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// The local calendar date on which `instant` falls.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.time_zone).date_naive()
    }

    /// The first instant of the local day containing `instant`.
    pub fn start_of_day(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        self.start_of_date(self.local_date(instant))
    }

    /// The first instant of the local month containing `instant`.
    pub fn start_of_month(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        self.start_of_date(first_of_month(self.local_date(instant)))
    }

    /// The first instant of the local month after the one containing `instant`.
    pub fn start_of_next_month(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        let first = first_of_month(self.local_date(instant));
        let next = first.checked_add_months(Months::new(1)).unwrap_or(first);
        self.start_of_date(next)
    }

    /// The first instant of the local month before the one containing `instant`.
    pub fn start_of_previous_month(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        let first = first_of_month(self.local_date(instant));
        let previous = first.checked_sub_months(Months::new(1)).unwrap_or(first);
        self.start_of_date(previous)
    }

    /// The first instant of the local week containing `instant`, honoring `week_start`.
    pub fn start_of_week(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        let date = self.local_date(instant);
        let weekday = date.weekday();
        let back = match self.week_start {
            WeekStart::Monday => weekday.num_days_from_monday(),
            WeekStart::Sunday => weekday.num_days_from_sunday(),
        };
        let first = date.checked_sub_days(Days::new(back.into())).unwrap_or(date);
        self.start_of_date(first)
    }

    /// The first instant of the local day that is `days` days after the day containing `instant`.
    pub fn start_of_day_after(&self, instant: DateTime<Utc>, days: u64) -> DateTime<Utc> {
        let date = self.local_date(instant);
        let later = date.checked_add_days(Days::new(days)).unwrap_or(date);
        self.start_of_date(later)
    }

    /// The number of whole calendar days between the local days containing `from` and `to`.
    /// Negative when `to` is on an earlier day.
    pub fn whole_days_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
        self.local_date(to)
            .signed_duration_since(self.local_date(from))
            .num_days()
    }

    pub fn is_today(&self, instant: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.local_date(instant) == self.local_date(now)
    }

    pub fn is_yesterday(&self, instant: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.local_date(now)
            .checked_sub_days(Days::new(1))
            .is_some_and(|yesterday| yesterday == self.local_date(instant))
    }

    /// The first instant of the local `date`. If local midnight does not exist (a DST gap at
    /// midnight) this is the first valid instant after it. If midnight is ambiguous it is the
    /// earlier of the two.
    pub fn start_of_date(&self, date: NaiveDate) -> DateTime<Utc> {
        self.resolve_local(date.and_time(NaiveTime::MIN))
    }

    fn resolve_local(&self, naive: NaiveDateTime) -> DateTime<Utc> {
        let mut candidate = naive;
        for _ in 0..=GAP_SEARCH_STEPS {
            if let Some(local) = self.time_zone.from_local_datetime(&candidate).earliest() {
                return local.with_timezone(&Utc);
            }
            candidate += Duration::minutes(GAP_SEARCH_STEP_MINUTES);
        }
        self.time_zone.from_utc_datetime(&naive).with_timezone(&Utc)
    }
}

/// Parses an IANA time zone name such as `America/New_York`.
pub fn parse_time_zone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| anyhow!("Invalid time zone '{name}': {e}"))
}

/// Parses a range boundary given either as an RFC 3339 timestamp or as a `YYYY-MM-DD` date. A
/// bare date means the start of that day in `calendar`.
pub fn parse_boundary(text: &str, calendar: &Calendar) -> Result<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant.with_timezone(&Utc));
    }
    match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(date) => Ok(calendar.start_of_date(date)),
        Err(_) => bail!("Unable to parse '{text}' as a date (YYYY-MM-DD) or RFC 3339 timestamp"),
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// A half-open interval `[start, end)` of instants. `start` is always strictly before `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Creates a range, failing unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        ensure!(
            start < end,
            "The end of a date range ({end}) must be after its start ({start})"
        );
        Ok(Self { start, end })
    }

    /// Creates a range, moving `end` forward if needed so that the range is at least one minute
    /// long.
    ///
    /// # Errors
    /// Fails when `start` is within a minute of the latest representable instant.
    pub fn clamped(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        let min_end = start
            .checked_add_signed(Duration::seconds(MIN_CUSTOM_RANGE_SECONDS))
            .ok_or_else(|| anyhow!("The range start {start} is too late"))?;
        Ok(Self {
            start,
            end: end.max(min_end),
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// True if `start <= instant < end`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.end.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
        )
    }
}

/// The named ranges offered when viewing summaries, history and exports.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum RangePreset {
    Today,
    ThisWeek,
    #[default]
    ThisMonth,
    LastMonth,
    /// Explicit start and end supplied by the user.
    Custom,
}

serde_plain::derive_display_from_serialize!(RangePreset);
serde_plain::derive_fromstr_from_deserialize!(RangePreset);

impl RangePreset {
    /// Resolves the preset to a concrete range relative to `now`.
    ///
    /// `custom` is required for `RangePreset::Custom` and ignored otherwise. A custom range is
    /// clamped to be at least a minute long rather than rejected.
    pub fn resolve(
        self,
        calendar: &Calendar,
        now: DateTime<Utc>,
        custom: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<DateRange> {
        let (start, end) = match self {
            RangePreset::Today => (
                calendar.start_of_day(now),
                calendar.start_of_day_after(now, 1),
            ),
            RangePreset::ThisWeek => {
                let start = calendar.start_of_week(now);
                (start, calendar.start_of_day_after(start, 7))
            }
            RangePreset::ThisMonth => (
                calendar.start_of_month(now),
                calendar.start_of_next_month(now),
            ),
            RangePreset::LastMonth => (
                calendar.start_of_previous_month(now),
                calendar.start_of_month(now),
            ),
            RangePreset::Custom => match custom {
                Some((start, end)) => return DateRange::clamped(start, end),
                None => bail!("A custom range requires both a start and an end"),
            },
        };
        DateRange::new(start, end)
    }

    pub fn title(&self) -> &'static str {
        match self {
            RangePreset::Today => "Today",
            RangePreset::ThisWeek => "This week",
            RangePreset::ThisMonth => "This month",
            RangePreset::LastMonth => "Last month",
            RangePreset::Custom => "Custom",
        }
    }
}
