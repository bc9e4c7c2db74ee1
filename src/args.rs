pub mod types;
pub mod validation;

use clap::Parser;

pub use types::{Args, Command, IngestArgs, SeasonsArgs};

pub fn args_checks() -> Args {
    Args::parse()
}
