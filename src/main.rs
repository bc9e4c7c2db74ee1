use nhl_bios_ingest::args::{self, Command, IngestArgs, SeasonsArgs};
use nhl_bios_ingest::ingest;
use nhl_bios_ingest::logging;
use nhl_bios_ingest::nhl::{NhlApiClient, NhlStatsClient, Position};
use nhl_bios_ingest::seasons::{DEFAULT_SEASONS_FUNCTION, FunctionInvoker, PreparsedInvoker};
use nhl_bios_ingest::storage::keys::DEFAULT_PREFIX;
use nhl_bios_ingest::storage::{BlobStore, DiscardStore};
use nhl_bios_ingest::{CoreError, IngestConfig, SeasonListResolver};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = args::args_checks();
    logging::init_tracing(args.verbose);

    match args.command {
        Command::Ingest(ingest_args) => run_ingest(ingest_args).await?,
        Command::Seasons(seasons_args) => {
            let config = if seasons_args.envelope_file.is_some() {
                None
            } else {
                Some(IngestConfig::from_env_with(&[(
                    "SEASONS_FUNCTION_NAME",
                    seasons_args.function_name.clone(),
                )])?)
            };
            let resolver = build_resolver(&seasons_args, config.as_ref())?;
            let seasons = resolver.resolve().await?;
            println!("{}", serde_json::to_string(&seasons)?);
        }
        Command::Schedule { date } => {
            let client = NhlStatsClient::new()?;
            let schedule = client.fetch_schedule(date).await?;
            println!("{}", serde_json::to_string_pretty(&schedule)?);
        }
    }

    Ok(())
}

async fn run_ingest(ingest_args: IngestArgs) -> Result<(), Box<dyn std::error::Error>> {
    let offline = ingest_args.dry_run && ingest_args.seasons.envelope_file.is_some();
    let config = if offline {
        None
    } else {
        Some(IngestConfig::from_env_with(&ingest_args.overrides())?)
    };

    let resolver = build_resolver(&ingest_args.seasons, config.as_ref())?;
    let store: Box<dyn BlobStore> = match (&config, ingest_args.dry_run) {
        (Some(config), false) => Box::new(config.blob_store()?),
        _ => Box::new(DiscardStore),
    };
    let prefix = ingest_args
        .prefix
        .clone()
        .or_else(|| config.as_ref().map(|c| c.prefix.clone()))
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string());
    let positions = if ingest_args.positions.is_empty() {
        Position::ALL.to_vec()
    } else {
        ingest_args.positions.clone()
    };

    let api = NhlStatsClient::new()?;
    let result = ingest::run(&resolver, &api, store.as_ref(), &prefix, &positions).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&ingest::handler_response(&result))?
    );
    result?;
    Ok(())
}

fn build_resolver(
    seasons_args: &SeasonsArgs,
    config: Option<&IngestConfig>,
) -> Result<SeasonListResolver, CoreError> {
    let function_name = seasons_args
        .function_name
        .clone()
        .or_else(|| config.map(|c| c.seasons_function.clone()))
        .unwrap_or_else(|| DEFAULT_SEASONS_FUNCTION.to_string());

    let invoker: Arc<dyn FunctionInvoker> = match (&seasons_args.envelope_file, config) {
        (Some(envelope), _) => Arc::new(PreparsedInvoker::new(envelope.clone())),
        (None, Some(config)) => Arc::new(config.lambda_invoker()),
        (None, None) => {
            return Err(CoreError::Config(
                "no envelope file given and no AWS configuration loaded".to_string(),
            ));
        }
    };
    Ok(SeasonListResolver::new(invoker, function_name))
}
