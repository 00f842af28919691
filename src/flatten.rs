//! Flattening of fetched statistics into warehouse rows.
//!
//! A pure projection: one [`IngestionRow`] per input record, in input order,
//! with the capture date stamped into the `date` column. The capture date is
//! passed in by the caller (the entrypoint uses the current wall-clock date)
//! so the transform itself is deterministic.

use chrono::NaiveDate;

use crate::models::{EpisodeStatistics, IngestionRow};

/// Project statistics records into warehouse rows.
///
/// Order-preserving and total: counts are copied as-is, without
/// deduplication or range validation.
pub fn flatten_rows(records: Vec<EpisodeStatistics>, captured_on: NaiveDate) -> Vec<IngestionRow> {
    records
        .into_iter()
        .map(|stats| IngestionRow {
            episode_title: stats.title,
            plays_count: stats.plays_count,
            plays_ondemand_count: stats.plays_ondemand_count,
            plays_live_count: stats.plays_live_count,
            chapters_count: stats.chapters_count,
            messages_count: stats.messages_count,
            likes_count: stats.likes_count,
            downloads_count: stats.downloads_count,
            published_at: stats.published_at,
            date: captured_on,
        })
        .collect()
}
