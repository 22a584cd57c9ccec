//! The three read operations exposed to the request layer: paginated timeline,
//! now view, and task suggestions.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::aggregator::{aggregate_in_zone, local_day_bounds};
use crate::config::EngineConfig;
use crate::error::{Result, TimelineError};
use crate::fetch::TimeWindowFetcher;
use crate::holiday::HolidayProvider;
use crate::model::{EnergyLevel, NowView, TaskRecord, TimelineItem};
use crate::now::resolve;
use crate::pagination::{clamp_limit, paginate, per_source_fetch_cap};
use crate::priority::rank;

/// Optional timeline parameters; `None` means "use the default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

/// Read operations over a fetcher and a holiday calendar.
///
/// "Today" and holiday days are calendar days of the configured timezone.
pub struct TimelineService<F, H> {
    fetcher: F,
    holidays: H,
    config: EngineConfig,
    tz: Tz,
}

impl<F, H> TimelineService<F, H>
where
    F: TimeWindowFetcher,
    H: HolidayProvider,
{
    /// Build a service.
    ///
    /// # Errors
    /// Returns `TimelineError::InvalidTimezone` if `config.timezone` is not an
    /// IANA identifier, or `TimelineError::Config` if another setting is out
    /// of range.
    pub fn new(fetcher: F, holidays: H, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let tz = config.tz()?;
        Ok(Self {
            fetcher,
            holidays,
            config,
            tz,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// UTC bounds of the configured-timezone day containing `instant`.
    pub fn day_of(&self, instant: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let local_date = instant.with_timezone(&self.tz).date_naive();
        local_day_bounds(&self.tz, local_date)
    }

    fn country(&self, user_id: i64) -> Result<String> {
        let country = self.fetcher.user_country(user_id).map_err(TimelineError::Fetch)?;
        Ok(country.unwrap_or_else(|| self.config.default_region.clone()))
    }

    /// A page of the merged timeline.
    ///
    /// # Arguments
    /// - `user_id` -- whose timeline to build
    /// - `query` -- window and page; `start` defaults to the start of the day
    ///   containing `now`, `end` to the end of `start`'s day, `skip` to 0 and
    ///   `limit` to `default_limit`, clamped to `max_limit`
    /// - `now` -- reference instant for the default window
    ///
    /// # Errors
    /// Returns `TimelineError::Fetch` if the fetcher fails.
    pub fn timeline(
        &self,
        user_id: i64,
        query: &TimelineQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimelineItem>> {
        let start = query.start.unwrap_or_else(|| self.day_of(now).0);
        let end = query.end.unwrap_or_else(|| self.day_of(start).1);
        let skip = query.skip.unwrap_or(0);
        let limit = clamp_limit(query.limit.unwrap_or(self.config.default_limit), self.config.max_limit);
        let cap = per_source_fetch_cap(skip, limit);
        debug!(user_id, %start, %end, skip, limit, cap, "timeline request");

        let country = self.country(user_id)?;
        let merged = aggregate_in_zone(
            &self.fetcher,
            &self.holidays,
            self.tz,
            user_id,
            start,
            end,
            &country,
            &self.config.default_region,
            Some(cap),
        )?;
        Ok(paginate(&merged, skip, limit))
    }

    /// Current and next item for the day containing `now`.
    pub fn now_view(&self, user_id: i64, now: DateTime<Utc>) -> Result<NowView> {
        let (start, end) = self.day_of(now);
        let country = self.country(user_id)?;
        let today = aggregate_in_zone(
            &self.fetcher,
            &self.holidays,
            self.tz,
            user_id,
            start,
            end,
            &country,
            &self.config.default_region,
            None,
        )?;
        Ok(resolve(&today, now))
    }

    /// Up to five pending tasks ranked for `energy`.
    pub fn suggestions(
        &self,
        user_id: i64,
        energy: EnergyLevel,
        now: DateTime<Utc>,
    ) -> Result<Vec<TaskRecord>> {
        let pending = self
            .fetcher
            .fetch_pending_tasks(user_id)
            .map_err(TimelineError::Fetch)?;
        Ok(rank(&pending, energy, now))
    }
}
