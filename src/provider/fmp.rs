use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::models::MarketSnapshot;
use crate::provider::MarketDataProvider;

const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Deserialize)]
struct FmpQuote {
    symbol: String,
    #[serde(default)]
    price: f64,
    #[serde(default, rename = "changesPercentage")]
    changes_percentage: f64,
    #[serde(default)]
    volume: f64,
    #[serde(default, rename = "avgVolume")]
    avg_volume: f64,
}

/// Thin quote fetcher against the FMP REST API. IV and squeeze scores are not
/// part of the quote endpoint; those fields stay at their defaults and are
/// filled by the upstream scanner when available.
pub struct FmpClient {
    client: Client,
    base_url: String,
    api_key: String,
    last_request: Option<Instant>,
}

impl FmpClient {
    pub fn new(cfg: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: cfg.fmp_base_url.clone(),
            api_key: cfg.fmp_api_key.clone(),
            last_request: None,
        }
    }

    async fn rate_limit(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < MIN_REQUEST_INTERVAL {
                tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

#[async_trait]
impl MarketDataProvider for FmpClient {
    async fn fetch_snapshots(&mut self, symbols: &[String]) -> Result<HashMap<String, MarketSnapshot>> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        self.rate_limit().await;

        let url = format!("{}/api/v3/quote/{}", self.base_url, symbols.join(","));
        let resp = self
            .client
            .get(&url)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .context("Failed to fetch quotes")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("FMP API error {}: {}", status, body);
        }

        let quotes: Vec<FmpQuote> = resp.json().await.context("Failed to parse quote response")?;

        Ok(quotes
            .into_iter()
            .map(|q| {
                (
                    q.symbol.clone(),
                    MarketSnapshot {
                        price: q.price,
                        change_percent: q.changes_percentage,
                        implied_volatility: None,
                        volume: q.volume,
                        avg_volume: q.avg_volume,
                        holy_grail: 0.0,
                    },
                )
            })
            .collect())
    }
}
