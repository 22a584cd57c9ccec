//! Resolve the "now view": the item in progress and the one after it.

use chrono::{DateTime, Utc};

use crate::model::{NowView, TimelineItem};

/// Resolve `current` and `next` from a timeline sorted as the aggregator sorts.
///
/// Items that have already ended (`end <= now`) are ignored. The first
/// remaining item is `current` if it has started, otherwise it is `next`.
/// At most one item is ever `current`, even when several overlap `now`.
pub fn resolve(timeline: &[TimelineItem], now: DateTime<Utc>) -> NowView {
    let mut pending = timeline.iter().filter(|item| item.end > now);

    match pending.next() {
        None => NowView::default(),
        Some(first) if first.start <= now => NowView {
            current: Some(first.clone()),
            next: pending.next().cloned(),
        },
        Some(first) => NowView {
            current: None,
            next: Some(first.clone()),
        },
    }
}
