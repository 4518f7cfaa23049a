use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::datekey::DateKey;
use crate::error::*;
use crate::schedule::DefaultSchedule;

/// One of the fixed daily class slots, numbered from 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Period(u8);

impl Period {
    pub const COUNT: u8 = 7;

    pub fn new(number: u8) -> Result<Self> {
        if number < Self::COUNT {
            Ok(Period(number))
        } else {
            Err(Error::new(
                ErrorKind::InvalidPeriod,
                &format!("period {} is not within 0..{}", number, Self::COUNT),
            ))
        }
    }

    pub fn all() -> impl Iterator<Item = Period> {
        (0..Self::COUNT).map(Period)
    }
}

impl TryFrom<u8> for Period {
    type Error = Error;

    fn try_from(number: u8) -> Result<Self> {
        Period::new(number)
    }
}

impl From<Period> for u8 {
    fn from(period: Period) -> u8 {
        period.0
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let number = s.parse::<u8>().map_err(|_| {
            Error::new(
                ErrorKind::InvalidPeriod,
                &format!("'{}' is not a period number", s),
            )
        })?;
        Period::new(number)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Editable text fields of a period.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum Field {
    #[display(fmt = "subject")]
    Subject,
    #[display(fmt = "notes")]
    Notes,
    #[display(fmt = "homework")]
    Homework,
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "subject" => Ok(Field::Subject),
            "notes" => Ok(Field::Notes),
            "homework" => Ok(Field::Homework),
            _ => Err(Error::new(
                ErrorKind::InvalidField,
                &format!("'{}' is not one of subject, notes, homework", s),
            )),
        }
    }
}

/// Edits of a single period on a single day.
///
/// `None` means the field was never touched. For `subject` this differs from
/// `Some("")`: an untouched subject falls back to the default schedule while
/// an emptied one stays blank.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homework: Option<String>,
}

impl PeriodRecord {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Subject => self.subject.as_deref(),
            Field::Notes => self.notes.as_deref(),
            Field::Homework => self.homework.as_deref(),
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Subject => &mut self.subject,
            Field::Notes => &mut self.notes,
            Field::Homework => &mut self.homework,
        };
        *slot = Some(value);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayRecord(BTreeMap<Period, PeriodRecord>);

static EMPTY_DAY: DayRecord = DayRecord(BTreeMap::new());

impl DayRecord {
    pub fn period(&self, period: Period) -> Option<&PeriodRecord> {
        self.0.get(&period)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// All recorded days, keyed by [`DateKey`]. Entries are never purged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgendaStore {
    days: BTreeMap<DateKey, DayRecord>,
}

impl AgendaStore {
    pub fn new() -> Self {
        AgendaStore::default()
    }

    /// Returns the day's record, or an empty one if nothing was recorded.
    pub fn get_day(&self, key: &DateKey) -> &DayRecord {
        self.days.get(key).unwrap_or(&EMPTY_DAY)
    }

    /// Sets exactly one field, creating the day and period entries on demand.
    pub fn set_field(
        &mut self,
        key: DateKey,
        period: Period,
        field: Field,
        value: impl Into<String>,
    ) {
        self.days
            .entry(key)
            .or_default()
            .0
            .entry(period)
            .or_default()
            .set(field, value.into());
    }

    /// Explicit subject of the day if present (even when empty), otherwise
    /// the default for `period`, otherwise an empty string.
    pub fn resolve_subject(
        &self,
        key: &DateKey,
        period: Period,
        defaults: &DefaultSchedule,
    ) -> String {
        self.get_day(key)
            .period(period)
            .and_then(|record| record.subject.as_deref())
            .unwrap_or_else(|| defaults.get_default(period))
            .to_owned()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
