//! # timeline-engine
//!
//! Deterministic timeline aggregation and energy-aware task ranking for a
//! single user's events, scheduled tasks and public holidays.
//!
//! Everything here is a pure, synchronous transform over a snapshot handed in
//! by collaborators ([`TimeWindowFetcher`], [`HolidayProvider`]). Nothing is
//! cached or persisted, so a [`TimelineService`] can be shared across threads
//! when its collaborators can.
//!
//! ## Modules
//!
//! - [`model`]: `TimelineItem`, `EnergyLevel`, raw records, boundary `Timestamp`
//! - [`holiday`]: `HolidayProvider` seam, built-in national calendars, region fallback
//! - [`fetch`]: `TimeWindowFetcher` seam and the in-memory `MemoryStore`
//! - [`aggregator`]: merge events, tasks and holidays into one sorted timeline
//! - [`pagination`]: offset/limit slicing and the per-source over-fetch cap
//! - [`now`]: resolve the current and next item
//! - [`priority`]: score and rank pending tasks
//! - [`service`]: the exposed read operations wired over config
//! - [`config`]: TOML-loadable `EngineConfig`
//! - [`error`]: Error types

pub mod aggregator;
pub mod config;
pub mod error;
pub mod fetch;
pub mod holiday;
pub mod model;
pub mod now;
pub mod pagination;
pub mod priority;
pub mod service;

pub use aggregator::{aggregate, aggregate_in_zone, merge_timeline, merge_timeline_in_zone, DEFAULT_TASK_MINUTES};
pub use config::EngineConfig;
pub use error::{FetchError, TimelineError};
pub use fetch::{MemoryStore, TimeWindowFetcher};
pub use holiday::{BuiltinHolidays, HolidayProvider, DEFAULT_REGION};
pub use model::{EnergyLevel, EventRecord, ItemKind, NowView, TaskRecord, TaskStatus, TimelineItem, Timestamp};
pub use now::resolve;
pub use pagination::{paginate, per_source_fetch_cap};
pub use priority::{rank, score_task, SUGGESTION_LIMIT};
pub use service::{TimelineQuery, TimelineService};
