use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;

use crate::error::*;

/// Reference timezone used when none is configured.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Los_Angeles;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";
const LONG_LABEL_FORMAT: &str = "%A, %B %-d";
const SHORT_LABEL_FORMAT: &str = "%b %-d";

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const MAX_SHIFT_DAYS: i64 = 3_650_000;

/// `date` moved by `days`, or `None` when that leaves the supported range.
pub fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if !(-MAX_SHIFT_DAYS..=MAX_SHIFT_DAYS).contains(&days) {
        return None;
    }
    date.checked_add_signed(Duration::days(days))
}

/// Canonical identifier of a calendar day, rendered as `YYYY-MM-DD`.
///
/// A key only carries the nominal year, month and day, so it never depends on
/// the UTC offset the date was observed in. Ordering follows the calendar.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Key of the day shown on the wall clock of `datetime`'s own offset.
    pub fn from_datetime<Tz2: TimeZone>(datetime: &DateTime<Tz2>) -> Self {
        DateKey(datetime.date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        DateKey(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = DateKey(NaiveDate::parse_from_str(s, DATE_KEY_FORMAT)?);

        // chrono also takes unpadded fields, which would alias another key
        if key.to_string() != s {
            return Err(Error::new(
                ErrorKind::DateParse,
                &format!("'{}' is not a zero-padded YYYY-MM-DD date key", s),
            ));
        }

        Ok(key)
    }
}

/// Resolves "today" and human readable labels against a fixed reference
/// timezone instead of the machine's local one.
#[derive(Clone, Debug, PartialEq)]
pub struct DateResolver {
    tz: Tz,
}

impl Default for DateResolver {
    fn default() -> Self {
        DateResolver::new(DEFAULT_TIMEZONE)
    }
}

impl DateResolver {
    pub fn new(tz: Tz) -> Self {
        DateResolver { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn current_date(&self) -> NaiveDate {
        self.date_at(&Utc::now())
    }

    pub fn date_at(&self, instant: &DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    pub fn to_key(&self, date: NaiveDate) -> DateKey {
        DateKey::from(date)
    }

    fn midnight(&self, date: NaiveDate) -> Option<DateTime<Tz>> {
        let naive = date.and_hms_opt(0, 0, 0)?;

        // Some zones jump over 00:00 when entering DST
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| {
                self.tz
                    .from_local_datetime(&(naive + Duration::hours(1)))
                    .earliest()
            })
    }

    /// Number of calendar days from `from` to `to`.
    ///
    /// Measured between local midnights of the reference timezone and rounded,
    /// so days that are 23 or 25 hours long still count as one.
    pub fn day_difference(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        match (self.midnight(from), self.midnight(to)) {
            (Some(begin), Some(end)) => {
                let millis = end.signed_duration_since(begin).num_milliseconds();
                (millis as f64 / MILLIS_PER_DAY).round() as i64
            }
            _ => to.signed_duration_since(from).num_days(),
        }
    }

    pub fn relative_label(&self, date: NaiveDate, today: NaiveDate) -> Option<&'static str> {
        match self.day_difference(today, date) {
            0 => Some("Today"),
            1 => Some("Tomorrow"),
            -1 => Some("Yesterday"),
            _ => None,
        }
    }

    pub fn label_relative_to(&self, date: NaiveDate, today: NaiveDate) -> String {
        self.relative_label(date, today)
            .map(str::to_owned)
            .unwrap_or_else(|| date.format(LONG_LABEL_FORMAT).to_string())
    }

    pub fn display_label(&self, date: NaiveDate) -> String {
        self.label_relative_to(date, self.current_date())
    }

    pub fn short_label(&self, date: NaiveDate) -> String {
        date.format(SHORT_LABEL_FORMAT).to_string()
    }
}
