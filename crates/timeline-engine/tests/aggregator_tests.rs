//! Tests for timeline aggregation over a storage snapshot.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use timeline_engine::aggregator::{aggregate, day_bounds};
use timeline_engine::fetch::{FetchResult, MemoryStore, TimeWindowFetcher, UserRecord};
use timeline_engine::model::{CategoryRef, EnergyLevel, EventRecord, ItemKind, TaskRecord, TaskStatus};
use timeline_engine::{BuiltinHolidays, TimelineError, DEFAULT_REGION};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn event(id: i64, start: &str, end: &str) -> EventRecord {
    EventRecord {
        id,
        user_id: 1,
        title: format!("event {id}"),
        start_time: start.parse().unwrap(),
        end_time: end.parse().unwrap(),
        category: None,
    }
}

fn task(id: i64, start: Option<&str>, end: Option<&str>) -> TaskRecord {
    TaskRecord {
        id,
        user_id: 1,
        title: format!("task {id}"),
        energy_required: EnergyLevel::Medium,
        deadline: None,
        planned_start: start.map(|s| s.parse().unwrap()),
        planned_end: end.map(|s| s.parse().unwrap()),
        status: TaskStatus::Pending,
        is_completed: false,
    }
}

fn window(y: i32, m: u32, d: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    day_bounds(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn run(store: &MemoryStore, start: DateTime<Utc>, end: DateTime<Utc>, country: &str) -> Vec<timeline_engine::TimelineItem> {
    aggregate(store, &BuiltinHolidays, 1, start, end, country, DEFAULT_REGION, None).unwrap()
}

struct FailingStore;

#[derive(Debug)]
struct Offline;

impl std::fmt::Display for Offline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("database offline")
    }
}

impl std::error::Error for Offline {}

impl TimeWindowFetcher for FailingStore {
    fn fetch_events(&self, _: i64, _: DateTime<Utc>, _: DateTime<Utc>, _: Option<usize>) -> FetchResult<Vec<EventRecord>> {
        Err(Box::new(Offline))
    }

    fn fetch_tasks(&self, _: i64, _: DateTime<Utc>, _: DateTime<Utc>, _: Option<usize>) -> FetchResult<Vec<TaskRecord>> {
        Ok(Vec::new())
    }

    fn fetch_pending_tasks(&self, _: i64) -> FetchResult<Vec<TaskRecord>> {
        Ok(Vec::new())
    }

    fn user_country(&self, _: i64) -> FetchResult<Option<String>> {
        Ok(None)
    }
}

// ── Mixed sources ───────────────────────────────────────────────────────────

#[test]
fn events_tasks_and_holidays_are_merged_in_start_order() {
    let store = MemoryStore {
        users: vec![UserRecord { id: 1, country: Some("US".into()) }],
        events: vec![
            event(1, "2026-07-04T15:00:00Z", "2026-07-04T16:00:00Z"),
            event(2, "2026-07-04T09:00:00+02:00", "2026-07-04T10:00:00+02:00"),
        ],
        tasks: vec![
            task(10, Some("2026-07-04T12:00:00"), Some("2026-07-04T13:00:00")),
            task(11, None, None),
        ],
    };
    let (start, end) = window(2026, 7, 4);
    let items = run(&store, start, end, "US");

    let summary: Vec<(ItemKind, i64)> = items.iter().map(|i| (i.kind, i.id)).collect();
    assert_eq!(
        summary,
        vec![
            (ItemKind::Holiday, -20260704),
            (ItemKind::Event, 2),
            (ItemKind::Task, 10),
            (ItemKind::Event, 1),
        ]
    );
    // The +02:00 event is normalized to 07:00 UTC.
    assert_eq!(items[1].start, Utc.with_ymd_and_hms(2026, 7, 4, 7, 0, 0).unwrap());
    assert_eq!(items[0].title, "🎉 Independence Day");
}

#[test]
fn task_without_planned_end_lasts_thirty_minutes() {
    let store = MemoryStore {
        tasks: vec![task(3, Some("2026-03-16T10:00:00Z"), None)],
        ..MemoryStore::default()
    };
    let (start, end) = window(2026, 3, 16);
    let items = run(&store, start, end, "US");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].end - items[0].start, Duration::minutes(30));
    assert_eq!(items[0].color, "#ff9f43");
}

#[test]
fn completed_flag_only_on_tasks() {
    let mut done = task(4, Some("2026-03-16T10:00:00Z"), None);
    done.is_completed = true;
    done.status = TaskStatus::Completed;
    let mut e = event(5, "2026-03-16T11:00:00Z", "2026-03-16T12:00:00Z");
    e.category = Some(CategoryRef { name: "study".into(), color_hex: "#3366ff".into() });
    let store = MemoryStore {
        events: vec![e],
        tasks: vec![done],
        ..MemoryStore::default()
    };
    let (start, end) = window(2026, 3, 16);
    let items = run(&store, start, end, "US");
    assert!(items[0].completed);
    assert!(!items[1].completed);
    assert_eq!(items[1].color, "#3366ff");
}

// ── Holidays ────────────────────────────────────────────────────────────────

#[test]
fn multi_day_window_yields_one_item_per_holiday_day() {
    let store = MemoryStore::default();
    let start = Utc.with_ymd_and_hms(2026, 12, 24, 18, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 12, 26, 6, 0, 0).unwrap();
    let items = run(&store, start, end, "GB");
    let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![-20261225, -20261226]);
}

#[test]
fn partially_covered_holiday_day_is_included() {
    let store = MemoryStore::default();
    let start = Utc.with_ymd_and_hms(2026, 12, 25, 8, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 12, 25, 20, 0, 0).unwrap();
    let items = run(&store, start, end, "US");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].start, Utc.with_ymd_and_hms(2026, 12, 25, 0, 0, 0).unwrap());
    assert_eq!(items[0].kind, ItemKind::Holiday);
}

#[test]
fn unsupported_country_falls_back_to_default_region() {
    let store = MemoryStore::default();
    let (start, end) = window(2026, 11, 26);
    let items = run(&store, start, end, "ZZ");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "🎉 Thanksgiving");
}

#[test]
fn country_changes_holiday_set() {
    let store = MemoryStore::default();
    let (start, end) = window(2026, 10, 12);
    assert_eq!(run(&store, start, end, "ES")[0].title, "🎉 Fiesta Nacional de España");
    assert_eq!(run(&store, start, end, "US")[0].title, "🎉 Columbus Day");
    assert!(run(&store, start, end, "DE").is_empty());
}

// ── Errors and empty windows ────────────────────────────────────────────────

#[test]
fn fetch_errors_propagate() {
    let (start, end) = window(2026, 3, 16);
    let err = aggregate(&FailingStore, &BuiltinHolidays, 1, start, end, "US", DEFAULT_REGION, None)
        .unwrap_err();
    match err {
        TimelineError::Fetch(source) => assert_eq!(source.to_string(), "database offline"),
        other => panic!("expected fetch error, got {other:?}"),
    }
}

#[test]
fn empty_window_is_not_an_error() {
    let (start, end) = window(2026, 3, 16);
    assert!(run(&MemoryStore::default(), start, end, "US").is_empty());
}

#[test]
fn inverted_window_skips_fetching() {
    let (start, end) = window(2026, 3, 16);
    let items = aggregate(&FailingStore, &BuiltinHolidays, 1, end, start, "US", DEFAULT_REGION, None).unwrap();
    assert!(items.is_empty());
}
