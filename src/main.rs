//! # Spreaker Stats Loader
//!
//! A batch ETL job that pulls per-episode statistics for one Spreaker
//! podcast show and appends them to a BigQuery table, stamped with the
//! capture date so the table accumulates a registry of metric changes over
//! time.
//!
//! ## Usage
//!
//! ```sh
//! spreaker_stats_loader -s 4040 -d 2020-01-01 \
//!     -p my-project --dataset podcasts -t spreaker_english
//! ```
//!
//! ## Architecture
//!
//! One linear pass per invocation:
//! 1. **Listing**: collect the IDs of episodes published strictly after the
//!    cutoff date
//! 2. **Fetching**: pull the statistics record for each episode (bearer
//!    token, a few requests in flight, listing order preserved)
//! 3. **Flattening**: project each record into a warehouse row stamped with
//!    the capture date
//! 4. **Loading**: append the whole batch to the target table in one call
//!
//! The first error anywhere aborts the run with a nonzero exit; nothing is
//! appended unless every fetch succeeded. A run with zero new episodes
//! skips the load entirely.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod bigquery;
mod cli;
mod config;
mod error;
mod flatten;
mod models;
mod pipeline;

use api::SpreakerClient;
use bigquery::WarehouseTarget;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("stats_upload starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.show, ?args.date, ?args.table, "Parsed CLI arguments");

    // The bearer token is loaded once and passed by value into the fetches.
    let auth = match config::load_auth(&args.auth) {
        Ok(auth) => auth,
        Err(e) => {
            error!(path = %args.auth.display(), error = %e, "Could not load the Spreaker auth file");
            return Err(e.into());
        }
    };

    let target = WarehouseTarget {
        project: args.project.clone(),
        dataset: args.dataset.clone(),
        table: args.table.clone(),
    };
    let client = SpreakerClient::new();

    // Advisory only: surfaces upstream freshness in the logs. The pipeline
    // itself does not depend on this endpoint.
    match client.last_update(args.show).await {
        Ok(last_episode_at) => {
            info!(show = args.show, %last_episode_at, "Show last published")
        }
        Err(e) => warn!(show = args.show, error = %e, "Could not read the show's last update"),
    }

    // ---- List, fetch, flatten ----
    let captured_on = Local::now().date_naive();
    let rows = match pipeline::collect_rows(
        &client,
        args.show,
        &args.date,
        &auth.token,
        captured_on,
    )
    .await
    {
        Ok(rows) => rows,
        Err(e) => {
            error!(error = %e, "Statistics collection failed; nothing will be appended");
            return Err(e.into());
        }
    };

    info!(
        count = rows.len(),
        %captured_on,
        cutoff = %args.date,
        "Collected rows; now uploading"
    );

    // ---- Load ----
    if rows.is_empty() {
        info!("No episodes published after the cutoff; skipping the warehouse load");
    } else {
        let credentials = args
            .credentials
            .to_str()
            .ok_or("credentials path is not valid UTF-8")?;
        let bq = match gcp_bigquery_client::Client::from_service_account_key_file(credentials).await
        {
            Ok(bq) => bq,
            Err(e) => {
                let e = error::Error::from(e);
                error!(path = %args.credentials.display(), error = %e, "Could not construct the BigQuery client");
                return Err(e.into());
            }
        };

        if let Err(e) = bigquery::append_rows(&bq, &target, &rows).await {
            error!(table = %target.table_id(), error = %e, "Warehouse load failed");
            return Err(e.into());
        }
        info!(table = %target.table_id(), count = rows.len(), "Upload finished");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
