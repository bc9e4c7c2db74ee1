pub mod client;
pub mod position;

pub use client::{NhlApiClient, NhlStatsClient};
pub use position::Position;
