use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::Position;
use crate::error::CoreError;
use crate::seasons::SeasonId;

pub const STATS_API_BASE: &str = "https://api.nhle.com/stats/rest/en";
pub const WEB_API_BASE: &str = "https://api-web.nhle.com/v1";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait NhlApiClient: Send + Sync {
    /// Bios document for every player at `position` in `season`.
    async fn fetch_player_bios(
        &self,
        season: SeasonId,
        position: Position,
    ) -> Result<Value, CoreError>;

    /// League schedule for the week starting at `date`.
    async fn fetch_schedule(&self, date: NaiveDate) -> Result<Value, CoreError>;
}

pub struct NhlStatsClient {
    client: Client,
    stats_base: String,
    web_base: String,
}

impl NhlStatsClient {
    /// # Errors
    ///
    /// Will return `Err` if the http client cannot be built
    pub fn new() -> Result<Self, CoreError> {
        Self::with_base_urls(STATS_API_BASE, WEB_API_BASE)
    }

    /// # Errors
    ///
    /// Will return `Err` if the http client cannot be built
    pub fn with_base_urls(
        stats_base: impl Into<String>,
        web_base: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            stats_base: stats_base.into(),
            web_base: web_base.into(),
        })
    }

    #[must_use]
    pub fn bios_url(&self, season: SeasonId, position: Position) -> String {
        format!(
            "{}/{}/bios?limit=-1&start=0&cayenneExp=seasonId={}",
            self.stats_base.trim_end_matches('/'),
            position,
            season
        )
    }

    #[must_use]
    pub fn schedule_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/schedule/{}",
            self.web_base.trim_end_matches('/'),
            date.format("%Y-%m-%d")
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value, CoreError> {
        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                CoreError::Network(format!("request to {url} timed out: {e}"))
            } else if e.is_connect() {
                CoreError::Network(format!("connection error to {url}: {e}"))
            } else {
                CoreError::Network(format!("request to {url} failed: {e}"))
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(CoreError::Network(format!(
                "http error from {url} - status code {}: {text}",
                status.as_u16()
            )));
        }

        resp.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                CoreError::Parse(format!("response from {url} is not json: {e}"))
            } else {
                CoreError::from(e)
            }
        })
    }
}

#[async_trait]
impl NhlApiClient for NhlStatsClient {
    async fn fetch_player_bios(
        &self,
        season: SeasonId,
        position: Position,
    ) -> Result<Value, CoreError> {
        self.get_json(&self.bios_url(season, position)).await
    }

    async fn fetch_schedule(&self, date: NaiveDate) -> Result<Value, CoreError> {
        self.get_json(&self.schedule_url(date)).await
    }
}
