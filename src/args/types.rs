use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use serde_json::Value;

use crate::nhl::Position;

#[derive(Parser, Debug)]
#[command(author, version, about = "Load NHL player bios for every season into S3", long_about = None)]
pub struct Args {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the seasons, then fetch and upload every bios document.
    Ingest(IngestArgs),
    /// Resolve and print the season list.
    Seasons(SeasonsArgs),
    /// Print the weekly schedule starting at a date.
    Schedule {
        #[arg(long, value_name = "YYYY-MM-DD", value_parser = crate::args::validation::check_date)]
        date: NaiveDate,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct SeasonsArgs {
    /// Name of the season-list function. Falls back to SEASONS_FUNCTION_NAME.
    #[arg(long, value_name = "FUNCTION_NAME")]
    pub function_name: Option<String>,

    /// Read the season-list response envelope from a file instead of invoking the function.
    #[arg(
        long,
        value_name = "ENVELOPE_JSON",
        value_parser = crate::args::validation::check_readable_file_and_json
    )]
    pub envelope_file: Option<Value>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct IngestArgs {
    #[command(flatten)]
    pub seasons: SeasonsArgs,

    /// Destination bucket. Falls back to NHL_BIOS_BUCKET.
    #[arg(short, long, value_name = "BUCKET")]
    pub bucket: Option<String>,

    /// Key prefix inside the bucket. Falls back to NHL_BIOS_PREFIX.
    #[arg(short, long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Positions to load; repeat for several. Defaults to skater and goalie.
    #[arg(long = "position", value_enum, value_name = "POSITION")]
    pub positions: Vec<Position>,

    /// Fetch everything but do not upload.
    #[arg(long)]
    pub dry_run: bool,
}

impl IngestArgs {
    /// Environment overrides taken from the command line.
    #[must_use]
    pub fn overrides(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("NHL_BIOS_BUCKET", self.bucket.clone()),
            ("NHL_BIOS_PREFIX", self.prefix.clone()),
            ("SEASONS_FUNCTION_NAME", self.seasons.function_name.clone()),
        ]
    }
}
