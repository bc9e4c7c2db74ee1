pub mod args;
pub mod aws;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod nhl;
pub mod seasons;
pub mod storage;
pub mod utils;

pub const APP_NAME: &str = "nhl-bios-ingest";

pub use config::IngestConfig;
pub use error::CoreError;
pub use seasons::{SeasonId, SeasonList, SeasonListResolver};
