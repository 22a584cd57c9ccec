//! Core value types: timeline items, energy levels, and the raw records handed
//! over by storage collaborators.
//!
//! Raw records carry [`Timestamp`] values, which may be naive or offset-aware.
//! They are normalized to UTC only when a record is turned into a
//! [`TimelineItem`] or scored; everything past that boundary is `DateTime<Utc>`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, TimelineError};

/// Display color for events without a category.
pub const UNCATEGORIZED_COLOR: &str = "#ccc";
/// Display color for scheduled tasks.
pub const TASK_COLOR: &str = "#ff9f43";
/// Display color for holidays.
pub const HOLIDAY_COLOR: &str = "#e91e63";
/// Decorative prefix prepended to every holiday title.
pub const HOLIDAY_TITLE_PREFIX: &str = "🎉 ";

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// A timestamp as stored upstream: either naive (no offset) or offset-aware.
///
/// Naive values are interpreted as already being UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    Naive(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

impl Timestamp {
    /// Normalize to UTC. A naive value is taken as-is.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            Timestamp::Naive(naive) => naive.and_utc(),
            Timestamp::Zoned(zoned) => zoned.with_timezone(&Utc),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::Zoned(dt.fixed_offset())
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(naive: NaiveDateTime) -> Self {
        Timestamp::Naive(naive)
    }
}

impl FromStr for Timestamp {
    type Err = TimelineError;

    /// Accepts RFC 3339 (`2026-03-16T09:00:00+02:00`, `...Z`) or a naive
    /// ISO-8601 datetime (`2026-03-16T09:00:00`, `2026-03-16 09:00:00.250`).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(zoned) = DateTime::parse_from_rfc3339(s) {
            return Ok(Timestamp::Zoned(zoned));
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(Timestamp::Naive(naive));
            }
        }
        Err(TimelineError::InvalidTimestamp(s.to_string()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Naive(naive) => write!(f, "{}", naive.format("%Y-%m-%dT%H:%M:%S%.f")),
            Timestamp::Zoned(zoned) => write!(f, "{}", zoned.to_rfc3339()),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Energy and status
// ---------------------------------------------------------------------------

/// Coarse self-reported capacity, used both as a task requirement and as the
/// user's momentary state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl EnergyLevel {
    /// Integer level for scoring arithmetic: low=1, medium=2, high=3.
    pub fn value(self) -> i32 {
        match self {
            EnergyLevel::Low => 1,
            EnergyLevel::Medium => 2,
            EnergyLevel::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EnergyLevel::Low => "low",
            EnergyLevel::Medium => "medium",
            EnergyLevel::High => "high",
        }
    }
}

impl FromStr for EnergyLevel {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(EnergyLevel::Low),
            "medium" => Ok(EnergyLevel::Medium),
            "high" => Ok(EnergyLevel::High),
            other => Err(TimelineError::InvalidEnergy(other.to_string())),
        }
    }
}

impl fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Ignored,
}

// ---------------------------------------------------------------------------
// Raw records
// ---------------------------------------------------------------------------

/// Category attached to an event; only the color is used here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    #[serde(default)]
    pub name: String,
    pub color_hex: String,
}

/// A fixed-time event as returned by storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    #[serde(default)]
    pub category: Option<CategoryRef>,
}

/// A task as returned by storage. Treated as an immutable snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    pub title: String,
    #[serde(default)]
    pub energy_required: EnergyLevel,
    #[serde(default)]
    pub deadline: Option<Timestamp>,
    #[serde(default)]
    pub planned_start: Option<Timestamp>,
    #[serde(default)]
    pub planned_end: Option<Timestamp>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub is_completed: bool,
}

// ---------------------------------------------------------------------------
// Timeline items
// ---------------------------------------------------------------------------

/// Discriminant of a [`TimelineItem`].
///
/// The declaration order is the tie-break order used when two items start at
/// the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Holiday,
    Event,
    Task,
}

/// One row of the unified timeline.
///
/// Constructed only through [`TimelineItem::from_event`],
/// [`TimelineItem::from_task`] and [`TimelineItem::holiday`], so each kind
/// always carries the same field set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineItem {
    /// Unique within one response only. Holidays use negative pseudo-ids.
    pub id: i64,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub color: String,
    /// Only ever true for tasks.
    #[serde(rename = "is_completed")]
    pub completed: bool,
}

impl TimelineItem {
    pub fn from_event(event: &EventRecord) -> Self {
        let color = event
            .category
            .as_ref()
            .map(|c| c.color_hex.clone())
            .unwrap_or_else(|| UNCATEGORIZED_COLOR.to_string());
        TimelineItem {
            id: event.id,
            title: event.title.clone(),
            start: event.start_time.to_utc(),
            end: event.end_time.to_utc(),
            kind: ItemKind::Event,
            color,
            completed: false,
        }
    }

    /// Returns `None` for tasks that are not scheduled (no `planned_start`).
    ///
    /// A missing `planned_end` becomes `planned_start + default_duration`,
    /// saturating at the latest representable instant.
    pub fn from_task(task: &TaskRecord, default_duration: chrono::Duration) -> Option<Self> {
        let start = task.planned_start?.to_utc();
        let end = match task.planned_end {
            Some(end) => end.to_utc(),
            None => start
                .checked_add_signed(default_duration)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        Some(TimelineItem {
            id: task.id,
            title: task.title.clone(),
            start,
            end,
            kind: ItemKind::Task,
            color: TASK_COLOR.to_string(),
            completed: task.is_completed,
        })
    }

    pub fn holiday(id: i64, name: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        TimelineItem {
            id,
            title: format!("{HOLIDAY_TITLE_PREFIX}{name}"),
            start,
            end,
            kind: ItemKind::Holiday,
            color: HOLIDAY_COLOR.to_string(),
            completed: false,
        }
    }
}

/// The currently active item and the next upcoming one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowView {
    pub current: Option<TimelineItem>,
    pub next: Option<TimelineItem>,
}
