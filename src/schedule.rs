use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::agenda::Period;

/// Subjects that pre-fill any day without an explicit subject.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultSchedule {
    subjects: BTreeMap<Period, String>,
}

impl DefaultSchedule {
    pub fn get_default(&self, period: Period) -> &str {
        self.subjects.get(&period).map_or("", String::as_str)
    }

    /// Overwrites the default for `period`. Days with an explicit subject are
    /// unaffected.
    pub fn set_default(&mut self, period: Period, value: impl Into<String>) {
        self.subjects.insert(period, value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (Period, &str)> {
        Period::all().map(move |p| (p, self.get_default(p)))
    }
}
