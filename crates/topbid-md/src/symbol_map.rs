//! Canonical → exchange-native pair mapping.
//!
//! The same asset can be listed under different tickers on different venues
//! (e.g. `VAIOT/USDT` is `VAI-USDT` on KuCoin). [`SymbolMapper`] keeps one
//! native pair per tracked key, learned once when the key is added from a
//! [`MappingSource`], plus optional fixed overrides from the config.
//!
//! Lookups are best-effort: whatever goes wrong, [`SymbolMapper::get`] falls
//! back to the canonical pair.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use ahash::AHashMap;
use async_trait::async_trait;
use topbid_core::{Exchange, PairKey, TopBidError, split_pair};
use tracing::{debug, info, warn};

/// One ticker listed by the mapping service for an asset on an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeTicker {
    /// Base symbol as the exchange lists it.
    pub base: String,
    /// Quote symbol as the exchange lists it.
    pub target: String,
}

impl NativeTicker {
    pub fn new(base: &str, target: &str) -> Self {
        Self { base: base.to_string(), target: target.to_string() }
    }

    /// Native pair in canonical `BASE/QUOTE` form.
    pub fn pair(&self) -> String {
        format!("{}/{}", self.base, self.target)
    }
}

/// External symbol-mapping service.
#[async_trait]
pub trait MappingSource: Send + Sync {
    /// Asset identifiers that may be listed under `symbol`, best match first.
    async fn list_candidate_assets(&self, symbol: &str) -> Result<Vec<String>, TopBidError>;

    /// Tickers listed for `asset_id` on the exchange known to the service as `exchange_id`.
    async fn tickers_for_asset(&self, asset_id: &str, exchange_id: &str) -> Result<Vec<NativeTicker>, TopBidError>;
}

/// [`MappingSource`] that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMappingSource;

#[async_trait]
impl MappingSource for NoMappingSource {
    async fn list_candidate_assets(&self, _symbol: &str) -> Result<Vec<String>, TopBidError> {
        Ok(Vec::new())
    }

    async fn tickers_for_asset(&self, _asset_id: &str, _exchange_id: &str) -> Result<Vec<NativeTicker>, TopBidError> {
        Ok(Vec::new())
    }
}

/// Per-key native pair table.
pub struct SymbolMapper {
    source: Box<dyn MappingSource>,
    /// Fixed overrides; never removed.
    overrides: AHashMap<PairKey, String>,
    /// Mappings learned from `source`.
    learned: RwLock<AHashMap<PairKey, String>>,
}

impl SymbolMapper {
    pub fn new(source: Box<dyn MappingSource>) -> Self {
        Self { source, overrides: AHashMap::new(), learned: RwLock::new(AHashMap::new()) }
    }

    /// Add fixed overrides keyed `"exchange-BASE/QUOTE"`.
    ///
    /// Keys without an `exchange-` prefix are skipped with a warning.
    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        for (id, native) in overrides {
            match id.split_once('-') {
                Some((exchange, pair)) if !exchange.is_empty() && !pair.is_empty() => {
                    self.overrides.insert(PairKey::new(exchange, pair), native.clone());
                }
                _ => warn!("[symbols] ignoring static mapping with malformed key '{id}'"),
            }
        }
        self
    }

    /// Native pair for `key`, or the canonical pair if none is known.
    pub fn get(&self, key: &PairKey) -> String {
        if let Some(native) = self.overrides.get(key) {
            return native.clone();
        }
        self.learned
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.pair().to_string())
    }

    /// Returns `true` if an override or learned mapping exists for `key`.
    pub fn contains(&self, key: &PairKey) -> bool {
        self.overrides.contains_key(key)
            || self.learned.read().unwrap_or_else(PoisonError::into_inner).contains_key(key)
    }

    pub fn insert(&self, key: PairKey, native: String) {
        self.learned.write().unwrap_or_else(PoisonError::into_inner).insert(key, native);
    }

    /// Forget the learned mapping for `key` so the next add looks it up again.
    pub fn remove(&self, key: &PairKey) {
        self.learned.write().unwrap_or_else(PoisonError::into_inner).remove(key);
    }

    /// Forget every learned mapping. Overrides are kept.
    pub fn clear(&self) {
        self.learned.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Look up the native pair for `key` and store it.
    ///
    /// Does nothing if a mapping already exists. Failures are logged and
    /// absorbed. Returns `true` if a mapping was stored.
    pub async fn populate(&self, key: &PairKey) -> bool {
        if self.contains(key) {
            return false;
        }
        match self.lookup(key).await {
            Ok(Some(native)) => {
                if native != key.pair() {
                    info!("[symbols] {key} is listed as {native}");
                }
                self.insert(key.clone(), native);
                true
            }
            Ok(None) => {
                debug!("[symbols] no mapping found for {key}");
                false
            }
            Err(e) => {
                warn!("[symbols] mapping lookup for {key} failed: {e}");
                false
            }
        }
    }

    /// Query the mapping source for `key` without storing the result.
    ///
    /// `Ok(None)` means the service had nothing for this pair; `Err` means a
    /// lookup failed before any candidate ticker was found.
    ///
    /// Among all tickers quoting in the canonical quote asset, one whose base
    /// equals the canonical base wins; otherwise the first one found is used.
    pub async fn lookup(&self, key: &PairKey) -> Result<Option<String>, TopBidError> {
        let Ok(exchange) = key.exchange().parse::<Exchange>() else {
            return Ok(None);
        };
        let Some((base, quote)) = split_pair(key.pair()) else {
            return Ok(None);
        };

        let candidates = self.source.list_candidate_assets(base).await?;
        if candidates.is_empty() {
            return Ok(None);
        }

        let mut first: Option<String> = None;
        let mut last_err: Option<TopBidError> = None;

        for asset_id in &candidates {
            let tickers = match self.source.tickers_for_asset(asset_id, exchange.coingecko_id()).await {
                Ok(t) => t,
                Err(e) => {
                    debug!("[symbols] tickers for {asset_id} on {exchange} failed: {e}");
                    last_err = Some(e);
                    continue;
                }
            };
            for ticker in tickers.iter().filter(|t| t.target.eq_ignore_ascii_case(quote)) {
                if ticker.base == base {
                    return Ok(Some(ticker.pair()));
                }
                if first.is_none() {
                    first = Some(ticker.pair());
                }
            }
        }

        match (first, last_err) {
            (Some(native), _) => Ok(Some(native)),
            (None, Some(e)) => Err(e),
            (None, None) => Ok(None),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// In-memory mapping source: symbol → asset ids, (asset, exchange) → tickers.
    #[derive(Default)]
    pub(crate) struct StaticSource {
        pub assets: HashMap<String, Vec<String>>,
        pub tickers: HashMap<(String, String), Vec<NativeTicker>>,
        pub failing_assets: Vec<String>,
    }

    impl StaticSource {
        pub(crate) fn vaiot() -> Self {
            let mut src = Self::default();
            src.assets.insert("VAIOT".into(), vec!["vaiot".into()]);
            src.tickers.insert(("vaiot".into(), "kucoin".into()), vec![NativeTicker::new("VAI", "USDT")]);
            src
        }
    }

    #[async_trait]
    impl MappingSource for StaticSource {
        async fn list_candidate_assets(&self, symbol: &str) -> Result<Vec<String>, TopBidError> {
            Ok(self.assets.get(symbol).cloned().unwrap_or_default())
        }

        async fn tickers_for_asset(&self, asset_id: &str, exchange_id: &str) -> Result<Vec<NativeTicker>, TopBidError> {
            if self.failing_assets.iter().any(|a| a == asset_id) {
                return Err(TopBidError::Mapping(format!("{asset_id}: HTTP 429")));
            }
            Ok(self.tickers.get(&(asset_id.to_string(), exchange_id.to_string())).cloned().unwrap_or_default())
        }
    }

    struct DownSource;

    #[async_trait]
    impl MappingSource for DownSource {
        async fn list_candidate_assets(&self, _symbol: &str) -> Result<Vec<String>, TopBidError> {
            Err(TopBidError::Mapping("connection refused".into()))
        }

        async fn tickers_for_asset(&self, _asset_id: &str, _exchange_id: &str) -> Result<Vec<NativeTicker>, TopBidError> {
            Err(TopBidError::Mapping("connection refused".into()))
        }
    }

    fn key() -> PairKey {
        PairKey::new("kucoin", "VAIOT/USDT")
    }

    #[tokio::test]
    async fn populate_stores_native_pair() {
        let mapper = SymbolMapper::new(Box::new(StaticSource::vaiot()));
        assert_eq!(mapper.get(&key()), "VAIOT/USDT");
        assert!(mapper.populate(&key()).await);
        assert_eq!(mapper.get(&key()), "VAI/USDT");
    }

    #[tokio::test]
    async fn populate_runs_once_per_key() {
        let mapper = SymbolMapper::new(Box::new(StaticSource::vaiot()));
        assert!(mapper.populate(&key()).await);
        assert!(!mapper.populate(&key()).await);
    }

    #[tokio::test]
    async fn identical_base_preferred() {
        let mut src = StaticSource::default();
        src.assets.insert("ABC".into(), vec!["abc-old".into(), "abc".into()]);
        src.tickers.insert(("abc-old".into(), "binance".into()), vec![NativeTicker::new("ABCOLD", "USDT")]);
        src.tickers.insert(("abc".into(), "binance".into()), vec![NativeTicker::new("ABC", "USDT")]);
        let mapper = SymbolMapper::new(Box::new(src));
        let found = mapper.lookup(&PairKey::new("binance", "ABC/USDT")).await.unwrap();
        assert_eq!(found.as_deref(), Some("ABC/USDT"));
    }

    #[tokio::test]
    async fn first_candidate_when_no_identical_base() {
        let mut src = StaticSource::default();
        src.assets.insert("XYZ".into(), vec!["xyz-a".into(), "xyz-b".into()]);
        src.tickers.insert(
            ("xyz-a".into(), "kucoin".into()),
            vec![NativeTicker::new("XYZA", "BTC"), NativeTicker::new("XYZA", "USDT")],
        );
        src.tickers.insert(("xyz-b".into(), "kucoin".into()), vec![NativeTicker::new("XYZB", "USDT")]);
        let mapper = SymbolMapper::new(Box::new(src));
        let found = mapper.lookup(&PairKey::new("kucoin", "XYZ/USDT")).await.unwrap();
        assert_eq!(found.as_deref(), Some("XYZA/USDT"));
    }

    #[tokio::test]
    async fn failed_candidate_does_not_hide_others() {
        let mut src = StaticSource::vaiot();
        src.assets.insert("VAIOT".into(), vec!["broken".into(), "vaiot".into()]);
        src.failing_assets.push("broken".into());
        let mapper = SymbolMapper::new(Box::new(src));
        assert_eq!(mapper.lookup(&key()).await.unwrap().as_deref(), Some("VAI/USDT"));
    }

    #[tokio::test]
    async fn not_found_and_failed_are_distinct() {
        let mapper = SymbolMapper::new(Box::new(NoMappingSource));
        assert_eq!(mapper.lookup(&key()).await, Ok(None));

        let mapper = SymbolMapper::new(Box::new(DownSource));
        assert!(matches!(mapper.lookup(&key()).await, Err(TopBidError::Mapping(_))));
        // ...but populate absorbs the failure and `get` falls back.
        assert!(!mapper.populate(&key()).await);
        assert_eq!(mapper.get(&key()), "VAIOT/USDT");
    }

    #[tokio::test]
    async fn unsupported_exchange_and_bad_pair_skip_lookup() {
        let src = StaticSource::vaiot();
        let mapper = SymbolMapper::new(Box::new(src));
        assert_eq!(mapper.lookup(&PairKey::new("krakken", "VAIOT/USDT")).await, Ok(None));
        assert_eq!(mapper.lookup(&PairKey::new("kucoin", "VAIOTUSDT")).await, Ok(None));
    }

    #[tokio::test]
    async fn overrides_win_and_survive_clear() {
        let mut overrides = HashMap::new();
        overrides.insert("kucoin-VAIOT/USDT".to_string(), "VAI/USDT".to_string());
        overrides.insert("nodash".to_string(), "X/Y".to_string());
        let mapper = SymbolMapper::new(Box::new(NoMappingSource)).with_overrides(&overrides);
        assert_eq!(mapper.get(&key()), "VAI/USDT");
        assert!(!mapper.populate(&key()).await);
        mapper.clear();
        mapper.remove(&key());
        assert_eq!(mapper.get(&key()), "VAI/USDT");
    }

    #[test]
    fn remove_restores_fallback() {
        let mapper = SymbolMapper::new(Box::new(NoMappingSource));
        mapper.insert(key(), "VAI/USDT".into());
        assert_eq!(mapper.get(&key()), "VAI/USDT");
        mapper.remove(&key());
        assert_eq!(mapper.get(&key()), "VAIOT/USDT");
    }
}
