use super::model::{BattleSummary, ItemData};
use crate::config::Config;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Read-only view of the game-data API used by the battle monitor and the
/// item name resolver.
#[async_trait]
pub trait GameDataApi: Send + Sync {
    /// Most recent battles of the last day for one guild, newest first.
    /// A 404 is reported as an empty list.
    async fn recent_battles(
        &self,
        guild_id: &str,
        limit: u32,
    ) -> Result<Vec<BattleSummary>, ApiError>;

    /// Raw event log of one battle, in log order. A 404 is reported as an
    /// empty list.
    async fn battle_events(&self, battle_id: i64, limit: u32) -> Result<Vec<Value>, ApiError>;

    /// Catalog entry for an item key, `Ok(None)` when the catalog has no such item.
    async fn item_data(&self, item_key: &str) -> Result<Option<ItemData>, ApiError>;
}

pub struct AlbionClient {
    http: reqwest::Client,
    base_url: String,
}

impl AlbionClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(concat!("linhir/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.albion_api_url.clone(),
        })
    }

    /// GET a JSON document. 404 becomes `Ok(None)`, any other non-200 is an error.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Albion API: GET {}", url);

        let response = self.http.get(&url).send().await.map_err(|e| {
            error!("Albion API: connection error on {}: {}", url, e);
            ApiError::Transport(e)
        })?;

        match response.status() {
            StatusCode::OK => {
                let body = response.bytes().await?;
                Ok(Some(serde_json::from_slice(&body)?))
            }
            StatusCode::NOT_FOUND => {
                warn!("Albion API: not found (404): {}", url);
                Ok(None)
            }
            status => {
                error!("Albion API: status {} on {}", status, url);
                Err(ApiError::Status(status.as_u16()))
            }
        }
    }
}

#[async_trait]
impl GameDataApi for AlbionClient {
    async fn recent_battles(
        &self,
        guild_id: &str,
        limit: u32,
    ) -> Result<Vec<BattleSummary>, ApiError> {
        let path = format!(
            "/battles?range=day&offset=0&limit={}&sort=recent&guildId={}",
            limit, guild_id
        );
        let raw: Vec<Value> = self.get_json(&path).await?.unwrap_or_default();
        Ok(decode_battles(raw))
    }

    async fn battle_events(&self, battle_id: i64, limit: u32) -> Result<Vec<Value>, ApiError> {
        let path = format!("/events/battle/{}?offset=0&limit={}", battle_id, limit);
        Ok(self.get_json(&path).await?.unwrap_or_default())
    }

    async fn item_data(&self, item_key: &str) -> Result<Option<ItemData>, ApiError> {
        self.get_json(&format!("/items/{}/data", item_key)).await
    }
}

/// Keeps API order and drops entries without a usable `id`.
fn decode_battles(raw: Vec<Value>) -> Vec<BattleSummary> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<BattleSummary>(value) {
            Ok(battle) => Some(battle),
            Err(e) => {
                warn!("Albion API: skipping malformed battle entry: {}", e);
                None
            }
        })
        .collect()
}
