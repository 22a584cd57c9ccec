//! Offset/limit slicing over a merged timeline.
//!
//! The timeline is merged from independent sources, each fetched with its own
//! cap. Fetching `skip + limit` rows from every source before merging is enough
//! for the requested page to equal the page of the full, uncapped merge: no
//! source can place more than `skip + limit` of its items at or before the end
//! of the page.

use tracing::debug;

/// How many rows each source must return for page `[skip, skip + limit)`.
pub fn per_source_fetch_cap(skip: usize, limit: usize) -> usize {
    skip.saturating_add(limit)
}

/// Clamp a requested limit into `1..=max`.
pub fn clamp_limit(limit: usize, max: usize) -> usize {
    limit.clamp(1, max.max(1))
}

/// Return `items[skip..skip + limit]`, empty when `skip` is past the end.
pub fn paginate<T: Clone>(items: &[T], skip: usize, limit: usize) -> Vec<T> {
    let page: Vec<T> = items.iter().skip(skip).take(limit).cloned().collect();
    debug!(total = items.len(), skip, limit, returned = page.len(), "paginated");
    page
}
