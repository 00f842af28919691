//! Data models for the Spreaker API payloads and the warehouse row shape.
//!
//! This module defines the core data structures used throughout the loader:
//! - Envelope types ([`ShowEnvelope`], [`EpisodesEnvelope`], [`StatisticsEnvelope`])
//!   mirroring the `{"response": {...}}` wrapper every Spreaker endpoint uses
//! - [`EpisodeStatistics`]: a fully validated per-episode statistics record
//! - [`IngestionRow`]: one warehouse row, the statistics record plus the
//!   capture date
//!
//! Statistics payloads are decoded leniently (every leaf is an `Option`) and
//! then validated with [`RawStatistics::validate`], so an absent field is
//! reported as [`Error::MissingField`] naming the field and the episode
//! instead of an opaque serde failure.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Response wrapper for `GET /shows/{show_id}`.
#[derive(Debug, Deserialize)]
pub struct ShowEnvelope {
    /// The `response` object wrapping the show.
    pub response: ShowResponse,
}

/// Inner `response` object of a show lookup.
#[derive(Debug, Deserialize)]
pub struct ShowResponse {
    /// The show itself.
    pub show: Show,
}

/// The subset of a Spreaker show this loader cares about.
#[derive(Debug, Deserialize)]
pub struct Show {
    /// Upstream-reported timestamp of the most recent episode.
    pub last_episode_at: String,
}

/// Response wrapper for `GET /shows/{show_id}/episodes`.
#[derive(Debug, Deserialize)]
pub struct EpisodesEnvelope {
    /// The `response` object wrapping the episode collection.
    pub response: EpisodesPage,
}

/// Inner `response` object of an episode listing.
#[derive(Debug, Deserialize)]
pub struct EpisodesPage {
    /// Episodes in upstream order.
    pub items: Vec<EpisodeItem>,
}

/// One entry of a show's episode collection.
#[derive(Debug, Deserialize)]
pub struct EpisodeItem {
    /// Internal Spreaker ID for the episode.
    pub episode_id: u64,
    /// Publish timestamp, e.g. `2020-06-01 14:30:00`. The format is
    /// lexically chronological, so cutoff filtering compares raw strings.
    pub published_at: String,
}

/// Response wrapper for `GET /episodes/{episode_id}/statistics`.
#[derive(Debug, Deserialize)]
pub struct StatisticsEnvelope {
    /// The `response` object wrapping the statistics.
    pub response: StatisticsPayload,
}

/// Inner `response` object of a statistics fetch.
#[derive(Debug, Default, Deserialize)]
pub struct StatisticsPayload {
    /// The statistics record; defaults to an empty record when absent so
    /// validation can name the first missing field.
    #[serde(default)]
    pub statistics: RawStatistics,
}

/// A statistics record exactly as received, before validation.
///
/// Every leaf is optional. [`RawStatistics::validate`] turns this into an
/// [`EpisodeStatistics`] or fails on the first absent field, in warehouse
/// column order.
#[derive(Debug, Default, Deserialize)]
pub struct RawStatistics {
    /// Total play count.
    pub plays_count: Option<i64>,
    /// On-demand play count.
    pub plays_ondemand_count: Option<i64>,
    /// Live play count.
    pub plays_live_count: Option<i64>,
    /// Chapter count.
    pub chapters_count: Option<i64>,
    /// Message count.
    pub messages_count: Option<i64>,
    /// Like count.
    pub likes_count: Option<i64>,
    /// Download count.
    pub downloads_count: Option<i64>,
    /// Embedded episode summary carrying the title and publish timestamp.
    #[serde(default)]
    pub episode: RawEpisodeSummary,
}

/// The episode summary embedded in a statistics payload.
#[derive(Debug, Default, Deserialize)]
pub struct RawEpisodeSummary {
    /// Episode title.
    pub title: Option<String>,
    /// Publish timestamp string.
    pub published_at: Option<String>,
}

impl RawStatistics {
    /// Validate a raw statistics payload into an [`EpisodeStatistics`].
    ///
    /// Fields are checked in warehouse column order, so an empty payload
    /// fails on `plays_count` first. The publish timestamp is parsed into a
    /// calendar date here, at the API boundary, so everything downstream
    /// operates on validated types.
    ///
    /// # Errors
    ///
    /// [`Error::MissingField`] for the first absent required field, or
    /// [`Error::MalformedTimestamp`] when `episode.published_at` is present
    /// but not a recognizable timestamp.
    pub fn validate(self, episode_id: u64) -> Result<EpisodeStatistics> {
        let episode = self.episode;
        Ok(EpisodeStatistics {
            episode_id,
            plays_count: require(episode_id, "plays_count", self.plays_count)?,
            plays_ondemand_count: require(
                episode_id,
                "plays_ondemand_count",
                self.plays_ondemand_count,
            )?,
            plays_live_count: require(episode_id, "plays_live_count", self.plays_live_count)?,
            chapters_count: require(episode_id, "chapters_count", self.chapters_count)?,
            messages_count: require(episode_id, "messages_count", self.messages_count)?,
            likes_count: require(episode_id, "likes_count", self.likes_count)?,
            downloads_count: require(episode_id, "downloads_count", self.downloads_count)?,
            title: require(episode_id, "episode.title", episode.title)?,
            published_at: parse_publish_date(
                episode_id,
                require(episode_id, "episode.published_at", episode.published_at)?,
            )?,
        })
    }
}

fn require<T>(episode_id: u64, field: &'static str, value: Option<T>) -> Result<T> {
    value.ok_or(Error::MissingField { episode_id, field })
}

/// Parse an upstream publish timestamp into a calendar date.
///
/// Spreaker reports `YYYY-MM-DD HH:MM:SS`; a bare `YYYY-MM-DD` is tolerated.
fn parse_publish_date(episode_id: u64, raw: String) -> Result<NaiveDate> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }
    if let Ok(d) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(d);
    }
    Err(Error::MalformedTimestamp {
        episode_id,
        field: "episode.published_at",
        value: raw,
    })
}

/// A validated per-episode statistics record.
///
/// Immutable once built; the flatten step copies these fields verbatim into
/// an [`IngestionRow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeStatistics {
    /// Internal Spreaker ID for the episode.
    pub episode_id: u64,
    /// Episode title.
    pub title: String,
    /// Total play count.
    pub plays_count: i64,
    /// On-demand play count.
    pub plays_ondemand_count: i64,
    /// Live play count.
    pub plays_live_count: i64,
    /// Chapter count.
    pub chapters_count: i64,
    /// Message count.
    pub messages_count: i64,
    /// Like count.
    pub likes_count: i64,
    /// Download count.
    pub downloads_count: i64,
    /// Publish date, extracted from the upstream timestamp.
    pub published_at: NaiveDate,
}

/// One warehouse row: an [`EpisodeStatistics`] plus the capture date.
///
/// Field names and serialization forms match the warehouse table columns
/// exactly; dates serialize as `YYYY-MM-DD` strings. The `date` column is
/// the capture date, the only field a row carries beyond a strict copy of
/// its statistics record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionRow {
    /// Episode title (`episode_title:STRING`).
    pub episode_title: String,
    /// Total play count (`plays_count:INT64`).
    pub plays_count: i64,
    /// On-demand play count (`plays_ondemand_count:INT64`).
    pub plays_ondemand_count: i64,
    /// Live play count (`plays_live_count:INT64`).
    pub plays_live_count: i64,
    /// Chapter count (`chapters_count:INT64`).
    pub chapters_count: i64,
    /// Message count (`messages_count:INT64`).
    pub messages_count: i64,
    /// Like count (`likes_count:INT64`).
    pub likes_count: i64,
    /// Download count (`downloads_count:INT64`).
    pub downloads_count: i64,
    /// Publish date (`published_at:DATE`).
    pub published_at: NaiveDate,
    /// Capture date of the run (`date:DATE`).
    pub date: NaiveDate,
}
