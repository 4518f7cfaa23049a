use chrono::NaiveDate;

use crate::datekey::{shift_days, DateKey};
use crate::planner::Planner;
use crate::storage::Storage;

/// The planner plus the day currently selected for viewing and editing.
pub struct Context<S: Storage> {
    planner: Planner<S>,
    cursor: NaiveDate,
}

impl<S: Storage> Context<S> {
    pub fn new(planner: Planner<S>) -> Self {
        let cursor = planner.resolver().current_date();
        Context { planner, cursor }
    }

    pub fn with_cursor(mut self, cursor: NaiveDate) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn planner(&self) -> &Planner<S> {
        &self.planner
    }

    pub fn planner_mut(&mut self) -> &mut Planner<S> {
        &mut self.planner
    }

    pub fn cursor(&self) -> NaiveDate {
        self.cursor
    }

    pub fn selected_key(&self) -> DateKey {
        self.planner.resolver().to_key(self.cursor)
    }

    pub fn change_day(&mut self, days: i64) {
        match shift_days(self.cursor, days) {
            Some(date) => self.cursor = date,
            None => log::warn!("Cannot move {} days from {}", days, self.cursor),
        }
    }

    pub fn next_day(&mut self) {
        self.change_day(1);
    }

    pub fn prev_day(&mut self) {
        self.change_day(-1);
    }

    pub fn jump_to_today(&mut self) {
        self.cursor = self.planner.resolver().current_date();
    }

    pub fn selected_label(&self) -> String {
        self.planner.resolver().display_label(self.cursor)
    }

    /// Whether the selected day is labelled Today, Tomorrow or Yesterday.
    pub fn is_relative_label(&self) -> bool {
        let resolver = self.planner.resolver();
        resolver
            .relative_label(self.cursor, resolver.current_date())
            .is_some()
    }

    /// `"Mar 10"` style label, only when the main label is relative.
    pub fn secondary_label(&self) -> Option<String> {
        if self.is_relative_label() {
            Some(self.planner.resolver().short_label(self.cursor))
        } else {
            None
        }
    }
}
