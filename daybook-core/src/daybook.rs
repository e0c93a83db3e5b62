//! The `Daybook` entry point: local state, configuration and feeds together.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::aggregate::{MonthIndex, build_month_index, occurrences_for_date};
use crate::config::DaybookConfig;
use crate::error::{DaybookError, DaybookResult};
use crate::feed::{FeedClient, FeedTransport, HttpTransport};
use crate::month::MonthWindow;
use crate::occurrence::{Occurrence, TimeOfDay};
use crate::refresh::RefreshLoop;
use crate::routine::Routine;
use crate::store::JsonStore;
use crate::user_event::UserEvent;

pub struct Daybook<T = HttpTransport> {
    config: DaybookConfig,
    store: JsonStore,
    feeds: Arc<FeedClient<T>>,
}

impl Daybook<HttpTransport> {
    /// Load configuration from disk and open the data directory it names.
    pub fn load() -> DaybookResult<Self> {
        let config = DaybookConfig::load()?;
        let store = JsonStore::new(config.data_path()?);
        let feeds = FeedClient::http(store.clone())?;
        Ok(Daybook::from_parts(config, store, feeds))
    }
}

impl<T: FeedTransport> Daybook<T> {
    pub fn from_parts(config: DaybookConfig, store: JsonStore, feeds: FeedClient<T>) -> Self {
        Daybook {
            config,
            store,
            feeds: Arc::new(feeds),
        }
    }

    pub fn config(&self) -> &DaybookConfig {
        &self.config
    }

    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    pub fn feeds(&self) -> &Arc<FeedClient<T>> {
        &self.feeds
    }

    pub fn user_events(&self) -> Vec<UserEvent> {
        self.store.user_events()
    }

    pub fn routines(&self) -> Vec<Routine> {
        self.store.routines()
    }

    /// Everything in `window`, using whatever feed snapshot is current.
    pub fn month(&self, window: MonthWindow) -> MonthIndex {
        build_month_index(
            window,
            &self.store.user_events(),
            &self.store.routines(),
            &self.feeds.snapshot().occurrences,
        )
    }

    pub fn day(&self, date: NaiveDate) -> Vec<Occurrence> {
        occurrences_for_date(
            date,
            &self.store.user_events(),
            &self.store.routines(),
            &self.feeds.snapshot().occurrences,
        )
    }

    pub fn add_event(
        &self,
        title: &str,
        date: NaiveDate,
        time: Option<TimeOfDay>,
    ) -> DaybookResult<UserEvent> {
        let event = UserEvent::new(title, date, time)?;

        let mut events = self.store.user_events();
        events.push(event.clone());
        self.store.save_user_events(&events)?;

        info!(id = %event.id, "added event");
        Ok(event)
    }

    /// Delete a user event. Routine and feed occurrences are read-only.
    pub fn delete_event(&self, id: &str) -> DaybookResult<UserEvent> {
        let mut events = self.store.user_events();

        let Some(position) = events.iter().position(|e| e.id == id) else {
            if id.starts_with("routine:") || id.starts_with("feed:") {
                return Err(DaybookError::NotUserEvent(id.to_string()));
            }
            return Err(DaybookError::EventNotFound(id.to_string()));
        };

        let removed = events.remove(position);
        self.store.save_user_events(&events)?;

        info!(id, "deleted event");
        Ok(removed)
    }

    pub fn add_routine(
        &self,
        title: &str,
        days_of_week: BTreeSet<u8>,
        time: TimeOfDay,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> DaybookResult<Routine> {
        let mut routine = Routine::weekly(title, days_of_week, time, start_date, end_date)?;
        let mut routines = self.store.routines();

        // Two routines created within the same millisecond
        let base = routine.id.clone();
        let mut n = 1;
        while routines.iter().any(|r| r.id == routine.id) {
            routine.id = format!("{base}-{n}");
            n += 1;
        }

        routines.push(routine.clone());
        self.store.save_routines(&routines)?;

        info!(id = %routine.id, "added routine");
        Ok(routine)
    }

    /// A refresh loop over this daybook's feeds using the configured timing.
    pub fn refresh_loop(&self) -> DaybookResult<RefreshLoop<T>> {
        Ok(RefreshLoop::new(
            Arc::clone(&self.feeds),
            self.config.refresh_interval()?,
            self.config.fetch_timeout()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::fake::FakeTransport;
    use crate::occurrence::Source;
    use std::time::Duration;

    const FEED: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:TEST\r\n\
BEGIN:VEVENT\r\nUID:standup\r\nSUMMARY:Standup\r\nDTSTART:20240108T090000\r\nEND:VEVENT\r\n\
END:VCALENDAR\r\n";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daybook(transport: FakeTransport) -> (tempfile::TempDir, Daybook<FakeTransport>) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let feeds = FeedClient::new(store.clone(), transport);
        (dir, Daybook::from_parts(DaybookConfig::default(), store, feeds))
    }

    #[test]
    fn added_event_persists_and_shows_up() {
        let (dir, daybook) = daybook(FakeTransport::default());

        let event = daybook
            .add_event("Dentist", date(2024, 1, 10), TimeOfDay::new(10, 30))
            .unwrap();

        // A fresh store over the same directory sees it
        let reopened = JsonStore::new(dir.path());
        assert_eq!(reopened.user_events(), vec![event.clone()]);

        let day = daybook.day(date(2024, 1, 10));
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].id, event.id);
        assert_eq!(day[0].source, Source::User);
    }

    #[test]
    fn adding_event_next_to_invalid_record_keeps_existing_events() {
        let (dir, daybook) = daybook(FakeTransport::default());
        std::fs::write(
            dir.path().join("events_user.json"),
            r#"[
  {"id": "user:1-aaaaaaaa", "title": "Keep me", "date": "2024-01-10"},
  {"id": "user:2-bbbbbbbb", "title": "Bad time", "date": "2024-01-10", "time": [25, 0]}
]"#,
        )
        .unwrap();

        daybook.add_event("New", date(2024, 1, 10), None).unwrap();

        let titles: Vec<String> = daybook.user_events().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Keep me", "New"]);

        let raw = std::fs::read_to_string(dir.path().join("events_user.json")).unwrap();
        assert!(raw.contains("Bad time"));
    }

    #[test]
    fn delete_removes_only_that_event() {
        let (_dir, daybook) = daybook(FakeTransport::default());
        let keep = daybook.add_event("Keep", date(2024, 1, 10), None).unwrap();
        let drop = daybook.add_event("Drop", date(2024, 1, 10), None).unwrap();

        let removed = daybook.delete_event(&drop.id).unwrap();

        assert_eq!(removed.title, "Drop");
        assert_eq!(daybook.user_events(), vec![keep]);
    }

    #[test]
    fn delete_rejects_unknown_and_non_user_ids() {
        let (_dir, daybook) = daybook(FakeTransport::default());

        assert!(matches!(
            daybook.delete_event("user:1-deadbeef"),
            Err(DaybookError::EventNotFound(_))
        ));
        assert!(matches!(
            daybook.delete_event("routine:1:2024-01-08"),
            Err(DaybookError::NotUserEvent(_))
        ));
        assert!(matches!(
            daybook.delete_event("feed:0:standup"),
            Err(DaybookError::NotUserEvent(_))
        ));
    }

    #[test]
    fn routines_expand_into_the_month() {
        let (_dir, daybook) = daybook(FakeTransport::default());
        let days = BTreeSet::from([0, 2, 4]);
        let time = TimeOfDay::new(7, 0).unwrap();

        let first = daybook
            .add_routine("Gym", days.clone(), time, date(2024, 1, 1), Some(date(2024, 1, 31)))
            .unwrap();
        let second = daybook
            .add_routine("Swim", days, time, date(2024, 1, 1), None)
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(daybook.routines().len(), 2);

        let index = daybook.month(MonthWindow::new(2024, 1).unwrap());
        // Mon/Wed/Fri in January 2024
        assert_eq!(index.len(), 14);
        assert_eq!(index.get("2024-01-01").unwrap().len(), 2);
        assert!(daybook.month(MonthWindow::new(2024, 2).unwrap()).get("2024-02-02").is_some());
    }

    #[test]
    fn invalid_routine_is_not_saved() {
        let (_dir, daybook) = daybook(FakeTransport::default());

        let result = daybook.add_routine(
            "Gym",
            BTreeSet::new(),
            TimeOfDay::new(7, 0).unwrap(),
            date(2024, 1, 1),
            None,
        );

        assert!(matches!(result, Err(DaybookError::InvalidRoutine(_))));
        assert!(daybook.routines().is_empty());
    }

    #[tokio::test]
    async fn month_includes_latest_feed_snapshot() {
        let transport = FakeTransport::default().with_body("https://a.example/cal.ics", FEED);
        let (_dir, daybook) = daybook(transport);
        daybook.add_event("Dentist", date(2024, 1, 8), None).unwrap();
        daybook.feeds().add_source("https://a.example/cal.ics").unwrap();

        let window = MonthWindow::new(2024, 1).unwrap();
        assert_eq!(daybook.month(window).get("2024-01-08").unwrap().len(), 1);

        daybook.feeds().fetch_all(Duration::from_secs(5)).await;

        let titles: Vec<String> = daybook
            .day(date(2024, 1, 8))
            .into_iter()
            .map(|o| o.title)
            .collect();
        assert_eq!(titles, vec!["Standup", "Dentist"]);
    }

    #[test]
    fn refresh_loop_uses_configured_timing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let config = DaybookConfig {
            refresh_interval: "soon".into(),
            ..DaybookConfig::default()
        };
        let daybook = Daybook::from_parts(config, store.clone(), FeedClient::new(store, FakeTransport::default()));

        assert!(matches!(daybook.refresh_loop(), Err(DaybookError::Config(_))));
    }
}
