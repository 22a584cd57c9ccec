//! Storage collaborator boundary.
//!
//! [`TimeWindowFetcher`] is implemented by whatever persistence layer the host
//! uses. Windows are inclusive on both ends. When a `cap` is given, a fetcher
//! must return the *earliest-starting* matching rows, since pagination relies on
//! every source contributing its head (see [`crate::pagination`]).
//!
//! [`MemoryStore`] is a serde-loadable snapshot implementation.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::model::{EventRecord, TaskRecord, TaskStatus};

pub type FetchResult<T> = std::result::Result<T, FetchError>;

pub trait TimeWindowFetcher {
    /// Events of `user_id` whose start lies in `[start, end]`.
    fn fetch_events(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        cap: Option<usize>,
    ) -> FetchResult<Vec<EventRecord>>;

    /// Tasks of `user_id` whose planned start lies in `[start, end]`.
    fn fetch_tasks(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        cap: Option<usize>,
    ) -> FetchResult<Vec<TaskRecord>>;

    /// All tasks of `user_id` with status pending.
    fn fetch_pending_tasks(&self, user_id: i64) -> FetchResult<Vec<TaskRecord>>;

    /// The user's configured holiday country, if any.
    fn user_country(&self, user_id: i64) -> FetchResult<Option<String>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    #[serde(default)]
    pub country: Option<String>,
}

/// In-memory snapshot of users, events and tasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

impl MemoryStore {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load a JSON snapshot from disk.
    ///
    /// # Errors
    /// Returns the I/O or JSON error, boxed as a [`FetchError`](crate::FetchError).
    pub fn load(path: impl AsRef<Path>) -> FetchResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&raw)?)
    }
}

/// Sort by start (then id) and truncate to `cap`.
fn head_by_start<T>(mut rows: Vec<(DateTime<Utc>, i64, T)>, cap: Option<usize>) -> Vec<T> {
    rows.sort_by_key(|(start, id, _)| (*start, *id));
    if let Some(cap) = cap {
        rows.truncate(cap);
    }
    rows.into_iter().map(|(_, _, row)| row).collect()
}

impl TimeWindowFetcher for MemoryStore {
    fn fetch_events(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        cap: Option<usize>,
    ) -> FetchResult<Vec<EventRecord>> {
        let rows = self
            .events
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| (e.start_time.to_utc(), e.id, e))
            .filter(|(s, _, _)| *s >= start && *s <= end)
            .map(|(s, id, e)| (s, id, e.clone()))
            .collect();
        Ok(head_by_start(rows, cap))
    }

    fn fetch_tasks(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        cap: Option<usize>,
    ) -> FetchResult<Vec<TaskRecord>> {
        let rows = self
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id)
            .filter_map(|t| t.planned_start.map(|s| (s.to_utc(), t.id, t)))
            .filter(|(s, _, _)| *s >= start && *s <= end)
            .map(|(s, id, t)| (s, id, t.clone()))
            .collect();
        Ok(head_by_start(rows, cap))
    }

    fn fetch_pending_tasks(&self, user_id: i64) -> FetchResult<Vec<TaskRecord>> {
        Ok(self
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id && t.status == TaskStatus::Pending)
            .cloned()
            .collect())
    }

    fn user_country(&self, user_id: i64) -> FetchResult<Option<String>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.id == user_id)
            .and_then(|u| u.country.clone()))
    }
}
