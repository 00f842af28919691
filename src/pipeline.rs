//! End-to-end composition of the listing, fetching, and flattening stages.
//!
//! One linear pass: list episodes after the cutoff, fetch statistics for
//! each, flatten into rows. No state survives between invocations and the
//! first error aborts everything; the warehouse load happens afterwards, in
//! the entrypoint, only once this whole function has succeeded. A listing
//! with zero new episodes short-circuits naturally: no statistics requests
//! are made and the result is an empty batch.

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::api::SpreakerClient;
use crate::error::Result;
use crate::flatten::flatten_rows;
use crate::models::IngestionRow;

/// Produce the warehouse rows for one run.
#[instrument(level = "info", skip(client, token))]
pub async fn collect_rows(
    client: &SpreakerClient,
    show_id: u64,
    cutoff_date: &str,
    token: &str,
    captured_on: NaiveDate,
) -> Result<Vec<IngestionRow>> {
    let episode_ids = client.list_new_episodes(show_id, cutoff_date).await?;
    info!(count = episode_ids.len(), "Found new episodes");

    let statistics = client.fetch_all_statistics(&episode_ids, token).await?;
    Ok(flatten_rows(statistics, captured_on))
}
