//! Error types for the loader.
//!
//! One run either appends every row or appends nothing; there is no local
//! recovery anywhere in the pipeline, so every variant here aborts the run
//! when it reaches `main`. The variants distinguish the three places a run
//! can die: talking to Spreaker, validating what Spreaker returned, and
//! talking to BigQuery.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for loader operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the loader.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure or non-success HTTP status from the Spreaker API.
    ///
    /// The wrapped [`reqwest::Error`] carries the HTTP status when the
    /// upstream answered with one (auth failures, unknown show or episode,
    /// rate limiting).
    #[error("upstream request failed: {0}")]
    UpstreamRequest(#[from] reqwest::Error),

    /// A required field was absent from an upstream statistics payload.
    #[error("episode {episode_id}: statistics payload is missing `{field}`")]
    MissingField {
        /// Episode whose payload was incomplete.
        episode_id: u64,
        /// Dotted path of the absent field, e.g. `episode.title`.
        field: &'static str,
    },

    /// An upstream timestamp could not be parsed into a calendar date.
    #[error("episode {episode_id}: `{field}` value {value:?} is not a recognizable timestamp")]
    MalformedTimestamp {
        /// Episode whose payload carried the bad value.
        episode_id: u64,
        /// Dotted path of the offending field.
        field: &'static str,
        /// The raw value as received.
        value: String,
    },

    /// The Spreaker auth file could not be read or decoded.
    #[error("auth file {}: {source}", path.display())]
    AuthFile {
        /// Path of the file that was rejected.
        path: PathBuf,
        /// What went wrong while reading or decoding it.
        #[source]
        source: AuthFileError,
    },

    /// The BigQuery client reported a failure (missing table or dataset,
    /// credentials, transport).
    #[error("warehouse load failed: {0}")]
    WarehouseLoad(#[from] gcp_bigquery_client::error::BQError),

    /// The live table does not carry a column the fixed schema requires.
    #[error("table {table} is missing expected column `{column}`")]
    SchemaMismatch {
        /// Fully qualified `project.dataset.table` identifier.
        table: String,
        /// The expected column that was not found.
        column: String,
    },

    /// The insert succeeded at the transport level but BigQuery rejected
    /// individual rows (schema coercion failures).
    #[error("table {table} rejected {rejected} row(s) during append")]
    RowsRejected {
        /// Fully qualified `project.dataset.table` identifier.
        table: String,
        /// Number of rows the API reported errors for.
        rejected: usize,
    },
}

/// Failure modes of loading the bearer-token auth file.
#[derive(Debug, Error)]
pub enum AuthFileError {
    /// The file could not be read.
    #[error(transparent)]
    Read(#[from] std::io::Error),

    /// The file was read but is not the expected JSON shape.
    #[error(transparent)]
    Parse(#[from] serde_json::Error),
}
