use std::time::Duration;
use tracing::{debug, info};

use super::traits::Session;
use crate::engine::errors::BootstrapError;
use crate::engine::index::ClientSideIndex;
use crate::engine::series::Series;

/// Tables that the benchmark schema designates as holding series data.
pub const BLESSED_TABLES: [&str; 5] = [
    "series_bigint",
    "series_float",
    "series_double",
    "series_boolean",
    "series_blob",
];

pub const BLESSED_KEYSPACE: &str = "measurements";

/// Scans every blessed table for distinct series ids and parses them.
pub async fn fetch_series_collection(session: &dyn Session) -> Result<Vec<Series>, BootstrapError> {
    let mut collection = Vec::new();

    for table in BLESSED_TABLES {
        let statement = format!("SELECT DISTINCT series_id FROM {}", table);
        let mut iter = session.query(&statement, &[]).await;
        let before = collection.len();

        while let Some(row) = iter.scan().await {
            let id = row.scan_text().map_err(|source| BootstrapError::Scan {
                table: table.to_string(),
                source,
            })?;
            collection.push(Series::parse(table, &id)?);
        }
        iter.close().await.map_err(|source| BootstrapError::Scan {
            table: table.to_string(),
            source,
        })?;

        debug!(
            target: "cqlbench::bootstrap",
            table,
            series = collection.len() - before,
            "Scanned blessed table"
        );
    }

    Ok(collection)
}

/// Fetches the series metadata within `startup_timeout` and builds the
/// client-side index held for the rest of the process.
pub async fn build_client_side_index(
    session: &dyn Session,
    startup_timeout: Duration,
) -> Result<ClientSideIndex, BootstrapError> {
    let collection = tokio::time::timeout(startup_timeout, fetch_series_collection(session))
        .await
        .map_err(|_| BootstrapError::Timeout(startup_timeout.as_millis() as u64))??;

    info!(
        target: "cqlbench::bootstrap",
        series = collection.len(),
        "Fetched series collection"
    );

    Ok(ClientSideIndex::new(collection)?)
}
