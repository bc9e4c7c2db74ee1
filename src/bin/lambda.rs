//! Lambda entry point. The trigger event is ignored; every run loads the
//! bios for all seasons returned by the season-list function.

use lambda_runtime::{Error, LambdaEvent, service_fn};
use nhl_bios_ingest::nhl::NhlStatsClient;
use nhl_bios_ingest::{IngestConfig, SeasonListResolver, ingest, logging};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

struct Services {
    config: IngestConfig,
    resolver: SeasonListResolver,
    api: NhlStatsClient,
    store: nhl_bios_ingest::storage::S3BlobStore,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init_lambda_tracing();

    let config = IngestConfig::from_env()?;
    let resolver = SeasonListResolver::new(
        Arc::new(config.lambda_invoker()),
        config.seasons_function.clone(),
    );
    let services = Arc::new(Services {
        api: NhlStatsClient::new()?,
        store: config.blob_store()?,
        resolver,
        config,
    });
    info!(app = nhl_bios_ingest::APP_NAME, "lambda starting");

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let services = Arc::clone(&services);
        async move { handler(&services, event).await }
    }))
    .await
}

async fn handler(services: &Services, event: LambdaEvent<Value>) -> Result<Value, Error> {
    info!(request_id = %event.context.request_id, "received event");

    let result = ingest::run(
        &services.resolver,
        &services.api,
        &services.store,
        &services.config.prefix,
        &services.config.positions,
    )
    .await;
    if let Err(e) = &result {
        error!(error = %e, "could not resolve season list");
    }

    Ok(ingest::handler_response(&result))
}
