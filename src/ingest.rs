//! The fetch-then-store loop driven by the resolved season list.

use serde_json::{Value, json};
use std::fmt;
use tracing::{error, info, warn};

use crate::nhl::{NhlApiClient, Position};
use crate::seasons::{ResolveError, SeasonId, SeasonListResolver};
use crate::storage::keys::bios_file_name;
use crate::storage::{BlobStore, JSON_CONTENT_TYPE, bios_key};
use crate::utils::is_truthy;

#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Uploaded { key: String },
    UploadFailed { key: String, error: String },
    NoData { file_name: String },
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemOutcome::Uploaded { key } => write!(f, "Uploaded {key}"),
            ItemOutcome::UploadFailed { key, error } => {
                write!(f, "Failed to upload {key}: {error}")
            }
            ItemOutcome::NoData { file_name } => write!(f, "No data for {file_name}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub seasons: usize,
    pub outcomes: Vec<ItemOutcome>,
}

impl IngestReport {
    #[must_use]
    pub fn uploaded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ItemOutcome::Uploaded { .. }))
            .count()
    }

    #[must_use]
    pub fn details(&self) -> Vec<String> {
        self.outcomes.iter().map(ToString::to_string).collect()
    }
}

/// Resolve the seasons, then fetch and store every bios document.
///
/// # Errors
///
/// Returns the resolver's error when no season list could be produced; in
/// that case nothing is fetched.
pub async fn run(
    resolver: &SeasonListResolver,
    api: &dyn NhlApiClient,
    store: &dyn BlobStore,
    prefix: &str,
    positions: &[Position],
) -> Result<IngestReport, ResolveError> {
    let seasons = resolver.resolve().await?;
    Ok(ingest_bios(&seasons, positions, api, store, prefix).await)
}

/// One fetch and at most one upload per (season, position), in order.
/// Failures are recorded in the report and never stop the loop.
pub async fn ingest_bios(
    seasons: &[SeasonId],
    positions: &[Position],
    api: &dyn NhlApiClient,
    store: &dyn BlobStore,
    prefix: &str,
) -> IngestReport {
    let mut report = IngestReport {
        seasons: seasons.len(),
        outcomes: Vec::with_capacity(seasons.len() * positions.len()),
    };

    for &season in seasons {
        for &position in positions {
            let outcome = ingest_one(season, position, api, store, prefix).await;
            report.outcomes.push(outcome);
        }
    }

    info!(
        seasons = report.seasons,
        uploaded = report.uploaded(),
        attempted = report.outcomes.len(),
        "processing complete"
    );
    report
}

async fn ingest_one(
    season: SeasonId,
    position: Position,
    api: &dyn NhlApiClient,
    store: &dyn BlobStore,
    prefix: &str,
) -> ItemOutcome {
    let key = bios_key(prefix, position, season);
    info!(%key, "attempting to fetch and save");

    let player_data = match api.fetch_player_bios(season, position).await {
        Ok(data) if is_truthy(&data) => data,
        Ok(_) => {
            warn!(%season, %position, "empty bios document, skipping upload");
            return no_data(season, position);
        }
        Err(e) => {
            error!(%season, %position, error = %e, "could not fetch player bios");
            warn!(%season, %position, "no data returned, skipping upload");
            return no_data(season, position);
        }
    };

    let body = match serde_json::to_vec_pretty(&player_data) {
        Ok(body) => body,
        Err(e) => {
            error!(%key, error = %e, "could not serialise player bios");
            return ItemOutcome::UploadFailed {
                key,
                error: e.to_string(),
            };
        }
    };

    match store.put_object(&key, body, JSON_CONTENT_TYPE).await {
        Ok(()) => {
            info!(%key, "uploaded");
            ItemOutcome::Uploaded { key }
        }
        Err(e) => {
            error!(%key, error = %e, "error uploading");
            ItemOutcome::UploadFailed {
                key,
                error: e.to_string(),
            }
        }
    }
}

fn no_data(season: SeasonId, position: Position) -> ItemOutcome {
    ItemOutcome::NoData {
        file_name: bios_file_name(position, season),
    }
}

/// The object the Lambda handler returns: an API-Gateway style envelope
/// whose `body` is itself JSON-encoded.
#[must_use]
pub fn handler_response(result: &Result<IngestReport, ResolveError>) -> Value {
    match result {
        Ok(report) => json!({
            "statusCode": 200,
            "body": json!({
                "message": "Processing complete",
                "details": report.details(),
            })
            .to_string(),
        }),
        Err(e) => json!({
            "statusCode": 500,
            "body": json!({
                "message": "Failed to resolve season list",
                "error": e.to_string(),
            })
            .to_string(),
        }),
    }
}
