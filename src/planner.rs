use derive_more::Constructor;

use crate::agenda::{AgendaStore, DayRecord, Field, Period};
use crate::datekey::{DateKey, DateResolver};
use crate::schedule::DefaultSchedule;
use crate::storage::{encode_snapshot, load_snapshot, Namespace, Storage};
use crate::theme::Theme;

/// What a period panel shows for one day.
#[derive(Clone, Debug, PartialEq, Eq, Constructor)]
pub struct PeriodView {
    pub period: Period,
    pub subject: String,
    /// Subject comes from the default schedule rather than the day itself.
    pub subject_is_default: bool,
    pub notes: String,
    pub homework: String,
}

/// Application state: the agenda, the default schedule and the theme, backed
/// by an injected [`Storage`].
///
/// Every mutation writes the full snapshot of the touched namespace right
/// away. Failed writes are logged and otherwise ignored; the in-memory state
/// stays authoritative for the rest of the session.
pub struct Planner<S: Storage> {
    storage: S,
    resolver: DateResolver,
    agenda: AgendaStore,
    defaults: DefaultSchedule,
    theme: Theme,
}

impl<S: Storage> Planner<S> {
    pub fn load(storage: S, resolver: DateResolver) -> Self {
        let agenda: AgendaStore = load_snapshot(&storage, Namespace::Agenda);
        let defaults: DefaultSchedule = load_snapshot(&storage, Namespace::Defaults);
        let theme = Theme::from_snapshot(storage.load(Namespace::Theme).as_deref());

        log::debug!(
            "Loaded {} recorded days, theme {}, reference timezone {}",
            agenda.len(),
            theme,
            resolver.timezone().name()
        );

        Planner {
            storage,
            resolver,
            agenda,
            defaults,
            theme,
        }
    }

    pub fn resolver(&self) -> &DateResolver {
        &self.resolver
    }

    pub fn agenda(&self) -> &AgendaStore {
        &self.agenda
    }

    pub fn defaults(&self) -> &DefaultSchedule {
        &self.defaults
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn day(&self, key: &DateKey) -> &DayRecord {
        self.agenda.get_day(key)
    }

    pub fn resolve_subject(&self, key: &DateKey, period: Period) -> String {
        self.agenda.resolve_subject(key, period, &self.defaults)
    }

    pub fn default_subject(&self, period: Period) -> &str {
        self.defaults.get_default(period)
    }

    pub fn period_view(&self, key: &DateKey, period: Period) -> PeriodView {
        let record = self.day(key).period(period);
        let field = |field: Field| {
            record
                .and_then(|r| r.get(field))
                .unwrap_or_default()
                .to_owned()
        };

        PeriodView::new(
            period,
            self.resolve_subject(key, period),
            record.and_then(|r| r.subject.as_ref()).is_none(),
            field(Field::Notes),
            field(Field::Homework),
        )
    }

    pub fn day_view(&self, key: &DateKey) -> Vec<PeriodView> {
        Period::all().map(|p| self.period_view(key, p)).collect()
    }

    pub fn set_field(
        &mut self,
        key: DateKey,
        period: Period,
        field: Field,
        value: impl Into<String>,
    ) {
        self.agenda.set_field(key, period, field, value);
        self.persist(Namespace::Agenda);
    }

    pub fn set_default(&mut self, period: Period, value: impl Into<String>) {
        self.defaults.set_default(period, value);
        self.persist(Namespace::Defaults);
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.persist(Namespace::Theme);
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.set_theme(self.theme.toggled());
        self.theme
    }

    fn persist(&self, namespace: Namespace) {
        let blob = match namespace {
            Namespace::Agenda => encode_snapshot(&self.agenda),
            Namespace::Defaults => encode_snapshot(&self.defaults),
            Namespace::Theme => Ok(self.theme.to_string()),
        };

        if let Err(err) = blob.and_then(|blob| self.storage.save(namespace, &blob)) {
            log::warn!("Could not save {}: {}", namespace, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    fn period(n: u8) -> Period {
        Period::new(n).unwrap()
    }

    fn planner(storage: &MemoryStorage) -> Planner<&MemoryStorage> {
        Planner::load(storage, DateResolver::default())
    }

    #[test]
    fn starts_empty_without_snapshots() {
        let storage = MemoryStorage::new();
        let planner = planner(&storage);

        assert!(planner.agenda().is_empty());
        assert_eq!(planner.theme(), Theme::Light);
        assert_eq!(planner.default_subject(period(0)), "");
        assert_eq!(storage.save_count(), 0);
    }

    #[test]
    fn hydrates_from_snapshots() {
        let storage = MemoryStorage::new()
            .with_blob(
                Namespace::Agenda,
                r#"{"2024-03-10":{"2":{"subject":"Algebra II","homework":"Ex. 4"}}}"#,
            )
            .with_blob(Namespace::Defaults, r#"{"2":"Geometry","3":"Art"}"#)
            .with_blob(Namespace::Theme, "dark");
        let planner = planner(&storage);

        assert_eq!(planner.resolve_subject(&key("2024-03-10"), period(2)), "Algebra II");
        assert_eq!(planner.resolve_subject(&key("2024-03-10"), period(3)), "Art");
        assert_eq!(planner.resolve_subject(&key("2024-03-11"), period(2)), "Geometry");
        assert!(planner.theme().is_dark());
    }

    #[test]
    fn corrupt_agenda_does_not_spoil_other_namespaces() {
        let storage = MemoryStorage::new()
            .with_blob(Namespace::Agenda, "{\"2024-03-10\": ")
            .with_blob(Namespace::Defaults, r#"{"1":"Band"}"#);
        let planner = planner(&storage);

        assert!(planner.agenda().is_empty());
        assert_eq!(planner.default_subject(period(1)), "Band");
    }

    #[test]
    fn every_edit_writes_a_full_snapshot() {
        let storage = MemoryStorage::new();
        let mut planner = planner(&storage);

        planner.set_field(key("2024-03-10"), period(2), Field::Subject, "Algebra II");
        planner.set_field(key("2024-03-10"), period(2), Field::Notes, "Matrices");

        assert_eq!(storage.save_count(), 2);
        assert_eq!(
            storage.get(Namespace::Agenda).as_deref(),
            Some(r#"{"2024-03-10":{"2":{"subject":"Algebra II","notes":"Matrices"}}}"#)
        );
        assert_eq!(storage.get(Namespace::Defaults), None);
    }

    #[test]
    fn reload_reproduces_state() {
        let storage = MemoryStorage::new();
        {
            let mut planner = planner(&storage);
            planner.set_default(period(2), "Biology");
            planner.set_field(key("2024-03-11"), period(2), Field::Subject, "");
            planner.set_field(key("2024-03-12"), period(4), Field::Homework, "Read ch. 3");
            planner.toggle_theme();
        }

        let reloaded = planner(&storage);
        assert_eq!(reloaded.resolve_subject(&key("2024-03-11"), period(2)), "");
        assert_eq!(reloaded.resolve_subject(&key("2024-03-12"), period(2)), "Biology");
        assert_eq!(
            reloaded
                .day(&key("2024-03-12"))
                .period(period(4))
                .and_then(|r| r.homework.as_deref()),
            Some("Read ch. 3")
        );
        assert!(reloaded.theme().is_dark());
        assert_eq!(storage.get(Namespace::Theme).as_deref(), Some("dark"));
    }

    #[test]
    fn failed_saves_keep_the_session_going() {
        let storage = MemoryStorage::new();
        storage.set_fail_saves(true);
        let mut planner = planner(&storage);

        planner.set_field(key("2024-03-10"), period(0), Field::Notes, "Fire drill");
        planner.set_default(period(0), "Homeroom");

        assert_eq!(
            planner.period_view(&key("2024-03-10"), period(0)).notes,
            "Fire drill"
        );
        assert_eq!(planner.default_subject(period(0)), "Homeroom");
        assert_eq!(storage.get(Namespace::Agenda), None);
    }

    #[test]
    fn default_then_resolve() {
        let storage = MemoryStorage::new();
        let mut planner = planner(&storage);

        planner.set_default(period(2), "Biology");

        assert_eq!(planner.resolve_subject(&key("2024-03-11"), period(2)), "Biology");
    }

    #[test]
    fn period_views_mark_default_subjects() {
        let storage = MemoryStorage::new();
        let mut planner = planner(&storage);
        let day = key("2024-03-11");

        planner.set_default(period(1), "Chemistry");
        planner.set_default(period(2), "Biology");
        planner.set_field(day, period(2), Field::Subject, "Anatomy");
        planner.set_field(day, period(1), Field::Homework, "Worksheet");

        let views = planner.day_view(&day);
        assert_eq!(views.len(), 7);
        assert_eq!(
            views[1],
            PeriodView::new(
                period(1),
                "Chemistry".to_owned(),
                true,
                String::new(),
                "Worksheet".to_owned()
            )
        );
        assert_eq!(views[2].subject, "Anatomy");
        assert!(!views[2].subject_is_default);
        assert_eq!(views[6].subject, "");
    }
}
