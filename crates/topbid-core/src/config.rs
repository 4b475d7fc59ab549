//! Configuration parsing for the topbid poller.
//!
//! Settings are read from a single JSON config file. The top-level structure
//! contains logging metadata, refresh timing, symbol-mapping settings and the
//! list of pairs to track at startup.
//!
//! # Example config
//!
//! ```json
//! {
//!   "module": { "module_name": "topbid", "log_path": "/tmp/log" },
//!   "refresh": { "interval_ms": 2000, "request_timeout_ms": 1000, "max_tries": 2 },
//!   "mapping": { "enabled": true, "api_key": "CG-..." },
//!   "pairs": [
//!     { "exchange": "kucoin", "pair": "VAIOT/USDT" },
//!     { "exchange": "binance", "pair": "BTC/USDT" }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::error::TopBidError;

/// Top-level application config, deserialized from a JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopBidConfig {
    /// Module metadata (name, log path).
    #[serde(default)]
    pub module: Option<ModuleMeta>,

    /// Refresh cycle timing and transport policy.
    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Symbol-mapping service settings.
    #[serde(default)]
    pub mapping: MappingConfig,

    /// Pairs to track at startup.
    #[serde(default)]
    pub pairs: Vec<PairConfig>,
}

impl TopBidConfig {
    /// Returns the module name, defaulting to `"topbid"`.
    pub fn module_name(&self) -> String {
        self.module
            .as_ref()
            .and_then(|m| m.module_name.clone())
            .unwrap_or_else(|| "topbid".to_string())
    }

    /// Returns the log path.
    pub fn log_path(&self) -> Option<String> {
        self.module.as_ref().and_then(|m| m.log_path.clone())
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), TopBidError> {
        self.refresh.validate()?;
        for p in &self.pairs {
            if p.exchange.trim().is_empty() || p.pair.trim().is_empty() {
                return Err(TopBidError::Config(format!(
                    "pair entry has an empty field: exchange='{}' pair='{}'",
                    p.exchange, p.pair
                )));
            }
        }
        Ok(())
    }
}

/// Module metadata block.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleMeta {
    pub module_name: Option<String>,
    pub log_path: Option<String>,
}

/// One `(exchange, pair)` to track.
#[derive(Debug, Clone, Deserialize)]
pub struct PairConfig {
    pub exchange: String,
    pub pair: String,
}

// ---------------------------------------------------------------------------
// Refresh
// ---------------------------------------------------------------------------

/// Refresh cycle timing and transport policy.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Interval between refresh cycles in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Timeout of a single HTTP attempt in milliseconds. Must be shorter
    /// than `interval_ms`.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Attempts per URL per cycle (1 = no retry).
    #[serde(default = "default_max_tries")]
    pub max_tries: u32,

    /// Upper bound on requests in flight at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Optional `User-Agent` header for exchange requests.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            max_tries: default_max_tries(),
            max_concurrency: default_max_concurrency(),
            user_agent: None,
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), TopBidError> {
        if self.interval_ms == 0 {
            return Err(TopBidError::Config("refresh.interval_ms must be > 0".into()));
        }
        if self.max_tries == 0 {
            return Err(TopBidError::Config("refresh.max_tries must be > 0".into()));
        }
        if self.max_concurrency == 0 {
            return Err(TopBidError::Config("refresh.max_concurrency must be > 0".into()));
        }
        if self.request_timeout_ms == 0 || self.request_timeout_ms >= self.interval_ms {
            return Err(TopBidError::Config(format!(
                "refresh.request_timeout_ms ({}) must be > 0 and shorter than interval_ms ({})",
                self.request_timeout_ms, self.interval_ms
            )));
        }
        Ok(())
    }
}

fn default_interval_ms() -> u64 {
    2_000
}

fn default_request_timeout_ms() -> u64 {
    1_000
}

fn default_max_tries() -> u32 {
    2
}

fn default_max_concurrency() -> usize {
    32
}

// ---------------------------------------------------------------------------
// Symbol mapping
// ---------------------------------------------------------------------------

/// Symbol-mapping service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MappingConfig {
    /// Query the mapping service when a pair is added.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Mapping service REST base URL.
    #[serde(default = "default_mapping_base_url")]
    pub base_url: String,

    /// Optional API key sent with every mapping request.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Timeout of a single mapping request in milliseconds.
    #[serde(default = "default_mapping_timeout_ms")]
    pub timeout_ms: u64,

    /// Fixed overrides keyed `"exchange-BASE/QUOTE"` → native pair.
    #[serde(default, rename = "static")]
    pub static_mappings: HashMap<String, String>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_mapping_base_url(),
            api_key: None,
            timeout_ms: default_mapping_timeout_ms(),
            static_mappings: HashMap::new(),
        }
    }
}

impl MappingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_true() -> bool {
    true
}

fn default_mapping_base_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_mapping_timeout_ms() -> u64 {
    10_000
}

/// Load and parse a JSON config file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<TopBidConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: TopBidConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
