//! Merge events, scheduled tasks and holidays into one ordered timeline.
//!
//! Each source keeps its own identity space: events and tasks carry storage ids
//! (non-negative), holidays carry negative pseudo-ids derived from their date.
//! All timestamps are normalized to UTC while the items are built.
//!
//! Windows are inclusive on both ends. Items are ordered by `start`, then by
//! kind (holiday, event, task), then by id.
//!
//! Holidays are calendar days of a timezone. The plain entry points use UTC;
//! the `_in_zone` variants place holidays on the local days of another zone.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{Result, TimelineError};
use crate::fetch::TimeWindowFetcher;
use crate::holiday::{holiday_id, holidays_in_range, resolve_region, HolidayProvider};
use crate::model::{EventRecord, TaskRecord, TimelineItem};

/// Length in minutes assumed for a scheduled task that has no planned end.
pub const DEFAULT_TASK_MINUTES: i64 = 30;

/// The inclusive UTC bounds of a UTC calendar day: `00:00:00` to
/// `23:59:59.999999`.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    local_day_bounds(&Tz::UTC, date)
}

/// Inclusive UTC bounds of the calendar day `date` in `tz`.
///
/// If local midnight does not exist (a DST gap), the day starts at the first
/// valid instant after it. The last representable day ends at
/// [`DateTime::<Utc>::MAX_UTC`].
pub fn local_day_bounds(tz: &Tz, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_day_start(tz, date);
    let end = date
        .succ_opt()
        .map(|next| local_day_start(tz, next) - Duration::microseconds(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

fn local_day_start(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    let mut local = midnight;
    // Gaps are at most a few hours; step forward until the local time exists.
    for _ in 0..24 * 4 {
        if let Some(dt) = tz.from_local_datetime(&local).earliest() {
            return dt.with_timezone(&Utc);
        }
        match local.checked_add_signed(Duration::minutes(15)) {
            Some(later) => local = later,
            None => break,
        }
    }
    midnight.and_utc()
}

/// Sort items in place by (start, kind, id). The sort is stable.
pub fn sort_timeline(items: &mut [TimelineItem]) {
    items.sort_by(|a, b| (a.start, a.kind, a.id).cmp(&(b.start, b.kind, b.id)));
}

/// One all-day item per holiday on the window's local dates in `tz`, at most
/// `cap` of them, earliest first.
fn synthesize_holidays<H: HolidayProvider + ?Sized>(
    holidays: &H,
    region: &str,
    tz: Tz,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    cap: Option<usize>,
) -> Vec<TimelineItem> {
    let from = window_start.with_timezone(&tz).date_naive();
    let to = window_end.with_timezone(&tz).date_naive();
    holidays_in_range(holidays, region, from, to)
        .filter_map(|(date, name)| {
            let id = holiday_id(date)?;
            let (start, end) = local_day_bounds(&tz, date);
            Some(TimelineItem::holiday(id, &name, start, end))
        })
        .take(cap.unwrap_or(usize::MAX))
        .collect()
}

/// Build the merged timeline from already-fetched records, with holidays on
/// UTC calendar days.
///
/// Records outside the window are dropped, so callers may pass a superset.
/// Holidays are kept for every UTC date the window touches, even when the
/// window starts after that day's midnight. Each source (events, tasks,
/// holidays) is truncated to its first `cap` items by start time before
/// merging, mirroring a capped storage fetch.
pub fn merge_timeline<H: HolidayProvider + ?Sized>(
    events: &[EventRecord],
    tasks: &[TaskRecord],
    holidays: &H,
    region: &str,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    cap: Option<usize>,
) -> Vec<TimelineItem> {
    merge_timeline_in_zone(events, tasks, holidays, region, Tz::UTC, window_start, window_end, cap)
}

/// [`merge_timeline`] with holidays placed on the calendar days of `tz`.
///
/// A holiday's item spans its local day, so a window covering one local day
/// never picks up the neighbouring date's holiday.
#[allow(clippy::too_many_arguments)]
pub fn merge_timeline_in_zone<H: HolidayProvider + ?Sized>(
    events: &[EventRecord],
    tasks: &[TaskRecord],
    holidays: &H,
    region: &str,
    tz: Tz,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    cap: Option<usize>,
) -> Vec<TimelineItem> {
    if window_start > window_end {
        return Vec::new();
    }
    let in_window = |item: &TimelineItem| item.start >= window_start && item.start <= window_end;

    let capped = |mut items: Vec<TimelineItem>| {
        sort_timeline(&mut items);
        if let Some(cap) = cap {
            items.truncate(cap);
        }
        items
    };

    let event_items = capped(events.iter().map(TimelineItem::from_event).filter(in_window).collect());
    let task_items = capped(
        tasks
            .iter()
            .filter_map(|t| TimelineItem::from_task(t, Duration::minutes(DEFAULT_TASK_MINUTES)))
            .filter(in_window)
            .collect(),
    );
    let holiday_items = synthesize_holidays(holidays, region, tz, window_start, window_end, cap);

    debug!(
        events = event_items.len(),
        tasks = task_items.len(),
        holidays = holiday_items.len(),
        "merging timeline sources"
    );

    let mut timeline = Vec::with_capacity(event_items.len() + task_items.len() + holiday_items.len());
    timeline.extend(event_items);
    timeline.extend(task_items);
    timeline.extend(holiday_items);
    sort_timeline(&mut timeline);
    timeline
}

/// Fetch and merge the timeline of `user_id` for `[window_start, window_end]`,
/// with holidays on UTC calendar days.
///
/// # Arguments
/// - `fetcher` -- storage for the user's events, tasks and country
/// - `holidays` -- holiday calendar source
/// - `user_id` -- whose records to fetch
/// - `window_start`, `window_end` -- inclusive window; an inverted window yields
///   an empty timeline without fetching
/// - `country_code` -- requested holiday region, any case
/// - `fallback_region` -- region used when `country_code` is unsupported
/// - `cap` -- per-source row limit, see [`crate::per_source_fetch_cap`]
///
/// # Errors
/// Returns `TimelineError::Fetch`, carrying the fetcher's error unchanged as its
/// source, if either fetch fails.
#[allow(clippy::too_many_arguments)]
pub fn aggregate<F, H>(
    fetcher: &F,
    holidays: &H,
    user_id: i64,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    country_code: &str,
    fallback_region: &str,
    cap: Option<usize>,
) -> Result<Vec<TimelineItem>>
where
    F: TimeWindowFetcher + ?Sized,
    H: HolidayProvider + ?Sized,
{
    aggregate_in_zone(
        fetcher,
        holidays,
        Tz::UTC,
        user_id,
        window_start,
        window_end,
        country_code,
        fallback_region,
        cap,
    )
}

/// [`aggregate`] with holidays placed on the calendar days of `tz`.
///
/// # Errors
/// Same as [`aggregate`].
#[allow(clippy::too_many_arguments)]
pub fn aggregate_in_zone<F, H>(
    fetcher: &F,
    holidays: &H,
    tz: Tz,
    user_id: i64,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    country_code: &str,
    fallback_region: &str,
    cap: Option<usize>,
) -> Result<Vec<TimelineItem>>
where
    F: TimeWindowFetcher + ?Sized,
    H: HolidayProvider + ?Sized,
{
    if window_start > window_end {
        return Ok(Vec::new());
    }

    let events = fetcher
        .fetch_events(user_id, window_start, window_end, cap)
        .map_err(TimelineError::Fetch)?;
    let tasks = fetcher
        .fetch_tasks(user_id, window_start, window_end, cap)
        .map_err(TimelineError::Fetch)?;
    let region = resolve_region(holidays, country_code, fallback_region);

    let timeline = merge_timeline_in_zone(
        &events,
        &tasks,
        holidays,
        &region,
        tz,
        window_start,
        window_end,
        cap,
    );
    debug!(user_id, %region, %tz, items = timeline.len(), "aggregated timeline");
    Ok(timeline)
}
