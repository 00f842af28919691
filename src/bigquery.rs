//! Warehouse append via the BigQuery tabledata API.
//!
//! The loader's responsibility ends at producing schema-conformant rows:
//! the whole batch goes out in one `insertAll` call against an existing
//! table, append-only. Nothing is ever overwritten or deduplicated against
//! rows from earlier runs.
//!
//! Before inserting, the live table is read and checked against the fixed
//! column set in [`TABLE_SCHEMA`]; a missing table or dataset surfaces as a
//! warehouse error, a missing column as a schema mismatch.

use gcp_bigquery_client::Client;
use gcp_bigquery_client::model::table_data_insert_all_request::TableDataInsertAllRequest;
use tracing::{info, instrument, warn};

use crate::error::{Error, Result};
use crate::models::IngestionRow;

/// The fixed warehouse schema, column name and BigQuery type, in order.
pub const TABLE_SCHEMA: [(&str, &str); 10] = [
    ("episode_title", "STRING"),
    ("plays_count", "INT64"),
    ("plays_ondemand_count", "INT64"),
    ("plays_live_count", "INT64"),
    ("chapters_count", "INT64"),
    ("messages_count", "INT64"),
    ("likes_count", "INT64"),
    ("downloads_count", "INT64"),
    ("published_at", "DATE"),
    ("date", "DATE"),
];

/// Fully qualified target table.
#[derive(Debug, Clone)]
pub struct WarehouseTarget {
    /// BigQuery project.
    pub project: String,
    /// Dataset within the project.
    pub dataset: String,
    /// Table within the dataset.
    pub table: String,
}

impl WarehouseTarget {
    /// Render the `project.dataset.table` identifier.
    pub fn table_id(&self) -> String {
        format!("{}.{}.{}", self.project, self.dataset, self.table)
    }
}

/// Append the whole batch of rows to the target table.
///
/// # Errors
///
/// [`Error::WarehouseLoad`] when the table or dataset does not exist or the
/// transport fails, [`Error::SchemaMismatch`] when the live table lacks an
/// expected column, [`Error::RowsRejected`] when BigQuery reports per-row
/// insert errors (schema coercion failures).
#[instrument(level = "info", skip(client, rows), fields(table = %target.table_id(), count = rows.len()))]
pub async fn append_rows(
    client: &Client,
    target: &WarehouseTarget,
    rows: &[IngestionRow],
) -> Result<()> {
    verify_schema(client, target).await?;

    let mut request = TableDataInsertAllRequest::new();
    for row in rows {
        request.add_row(None, row)?;
    }

    let response = client
        .tabledata()
        .insert_all(&target.project, &target.dataset, &target.table, request)
        .await?;

    if let Some(insert_errors) = response.insert_errors {
        if !insert_errors.is_empty() {
            warn!(
                rejected = insert_errors.len(),
                errors = ?insert_errors,
                "BigQuery rejected rows during append"
            );
            return Err(Error::RowsRejected {
                table: target.table_id(),
                rejected: insert_errors.len(),
            });
        }
    }

    info!(count = rows.len(), "Appended rows");
    Ok(())
}

/// Check that the live table carries every column of [`TABLE_SCHEMA`].
///
/// Extra columns on the table are tolerated; an absent one aborts the run
/// before any row is sent.
async fn verify_schema(client: &Client, target: &WarehouseTarget) -> Result<()> {
    let table = client
        .table()
        .get(&target.project, &target.dataset, &target.table, None)
        .await?;

    let live_columns: Vec<String> = table
        .schema
        .fields
        .unwrap_or_default()
        .into_iter()
        .map(|field| field.name)
        .collect();

    for (column, _) in TABLE_SCHEMA {
        if !live_columns.iter().any(|name| name == column) {
            return Err(Error::SchemaMismatch {
                table: target.table_id(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}
