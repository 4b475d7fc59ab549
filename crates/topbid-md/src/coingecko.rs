//! CoinGecko-backed [`MappingSource`].
//!
//! Two public endpoints are used:
//!
//! - `GET /search?query={symbol}` lists coins whose symbol or name matches.
//!   Coins whose `symbol`, `id` or `name` equals the requested symbol are
//!   kept, in the order CoinGecko ranks them. A renamed asset (VAIOT trades
//!   as `VAI`) is only reachable through its id or name.
//! - `GET /coins/{id}/tickers?exchange_ids={exchange}` lists the tickers of a
//!   coin on one exchange, with the base/target symbols as the exchange uses
//!   them.

use async_trait::async_trait;
use serde::Deserialize;
use topbid_core::TopBidError;
use topbid_core::config::MappingConfig;

use crate::symbol_map::{MappingSource, NativeTicker};

/// Header carrying the demo-plan API key.
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<SearchCoin>,
}

#[derive(Debug, Deserialize)]
struct SearchCoin {
    id: String,
    #[serde(default)]
    name: String,
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct TickersResponse {
    #[serde(default)]
    tickers: Vec<Ticker>,
}

#[derive(Debug, Deserialize)]
struct Ticker {
    base: String,
    target: String,
}

pub struct CoinGeckoSource {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoSource {
    pub fn new(config: &MappingConfig) -> Result<Self, TopBidError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| TopBidError::Mapping(format!("http client init failed: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, TopBidError> {
        let mut req = self.http.get(url);
        if let Some(key) = &self.api_key {
            req = req.header(API_KEY_HEADER, key);
        }
        req.send()
            .await
            .map_err(|e| TopBidError::Mapping(format!("{url}: {e}")))?
            .error_for_status()
            .map_err(|e| TopBidError::Mapping(format!("{url}: {e}")))?
            .json::<T>()
            .await
            .map_err(|e| TopBidError::Mapping(format!("{url}: bad body: {e}")))
    }
}

fn search_url(base_url: &str, symbol: &str) -> String {
    format!("{base_url}/search?query={}", urlencoding::encode(symbol))
}

fn tickers_url(base_url: &str, asset_id: &str, exchange_id: &str) -> String {
    format!(
        "{base_url}/coins/{}/tickers?exchange_ids={}",
        urlencoding::encode(asset_id),
        urlencoding::encode(exchange_id)
    )
}

fn matching_ids(resp: SearchResponse, symbol: &str) -> Vec<String> {
    resp.coins
        .into_iter()
        .filter(|c| {
            c.symbol.eq_ignore_ascii_case(symbol) || c.id.eq_ignore_ascii_case(symbol) || c.name.eq_ignore_ascii_case(symbol)
        })
        .map(|c| c.id)
        .collect()
}

#[async_trait]
impl MappingSource for CoinGeckoSource {
    async fn list_candidate_assets(&self, symbol: &str) -> Result<Vec<String>, TopBidError> {
        let resp: SearchResponse = self.get(&search_url(&self.base_url, symbol)).await?;
        Ok(matching_ids(resp, symbol))
    }

    async fn tickers_for_asset(&self, asset_id: &str, exchange_id: &str) -> Result<Vec<NativeTicker>, TopBidError> {
        let resp: TickersResponse = self.get(&tickers_url(&self.base_url, asset_id, exchange_id)).await?;
        Ok(resp
            .tickers
            .into_iter()
            .map(|t| NativeTicker { base: t.base, target: t.target })
            .collect())
    }
}
