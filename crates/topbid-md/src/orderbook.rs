//! Top-of-book poller facade.
//!
//! [`OrderBook`] ties the pieces together: tracked keys live in an
//! [`OrderbookStore`], native symbols in a [`SymbolMapper`], and a
//! [`RepeatEvery`] loop runs one refresh cycle per interval:
//!
//! 1. snapshot the tracked keys and the store generation,
//! 2. resolve one orderbook URL per key (keys on unknown exchanges are skipped),
//! 3. fetch every URL in parallel through the [`Fetcher`],
//! 4. classify each body and extract its best bid/ask,
//! 5. write the results back, tagged with the generation from step 1.
//!
//! A failed fetch invalidates the key. An exchange error, an empty book or an
//! unknown response shape leaves the previous values in place.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use topbid_core::config::{RefreshConfig, TopBidConfig};
use topbid_core::{Exchange, PairKey, TopBidError, TopLevel};
use tracing::{debug, error, info, warn};

use crate::classifier::{self, Extraction};
use crate::coingecko::CoinGeckoSource;
use crate::fetch::{FetchPolicy, Fetcher, HttpFetcher};
use crate::registry;
use crate::scheduler::RepeatEvery;
use crate::store::{OrderbookStore, RefreshOutcome};
use crate::symbol_map::{MappingSource, NoMappingSource, SymbolMapper};

/// Per-cycle counters, logged after every cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Keys that received a fresh quote.
    pub updated: usize,
    /// Keys reset because their fetch failed.
    pub invalidated: usize,
    /// Responses carrying an exchange error code.
    pub rejected: usize,
    /// Successful responses without any price level.
    pub empty: usize,
    /// Responses matching no known schema.
    pub unrecognized: usize,
    /// Keys whose exchange has no known endpoint.
    pub skipped: usize,
    /// Writes dropped because the key was deleted or the store reset mid-cycle.
    pub discarded: usize,
}

impl std::fmt::Display for CycleReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "updated={} invalidated={} rejected={} empty={} unrecognized={} skipped={} discarded={}",
            self.updated, self.invalidated, self.rejected, self.empty, self.unrecognized, self.skipped, self.discarded
        )
    }
}

struct Inner {
    store: OrderbookStore,
    symbols: SymbolMapper,
    fetcher: Box<dyn Fetcher>,
    refresh: RefreshConfig,
}

impl Inner {
    async fn refresh_cycle(&self, policy: &FetchPolicy) -> anyhow::Result<CycleReport> {
        let mut report = CycleReport::default();
        let (generation, keys) = self.store.keys();

        let mut targets = Vec::with_capacity(keys.len());
        let mut urls = Vec::with_capacity(keys.len());
        for key in keys {
            match registry::orderbook_url(key.exchange(), &self.symbols.get(&key)) {
                Ok(url) => {
                    urls.push(url);
                    targets.push(key);
                }
                Err(e) => {
                    error!("[refresh] skipping {key}: {e}");
                    report.skipped += 1;
                }
            }
        }
        if urls.is_empty() {
            return Ok(report);
        }

        let bodies = match self.fetcher.fetch_all(&urls, policy).await {
            Ok(bodies) if bodies.len() == urls.len() => bodies,
            Ok(bodies) => {
                self.store.reset_all();
                anyhow::bail!("fetcher returned {} results for {} urls, store reset", bodies.len(), urls.len());
            }
            Err(e) => {
                self.store.reset_all();
                return Err(anyhow::Error::new(e).context("orderbook batch fetch failed, store reset"));
            }
        };

        for ((key, url), body) in targets.iter().zip(&urls).zip(bodies) {
            let outcome = match body {
                None => {
                    debug!("[refresh] {key}: no response from {url}, invalidating");
                    report.invalidated += 1;
                    RefreshOutcome::Invalidate
                }
                Some(body) => match classifier::extract(&body, key.exchange().parse::<Exchange>().ok()) {
                    Extraction::Quote(book) => {
                        report.updated += 1;
                        RefreshOutcome::Quote(book)
                    }
                    Extraction::Rejected { schema, reason } => {
                        warn!("[refresh] {key}: {schema} error response ({reason})");
                        report.rejected += 1;
                        continue;
                    }
                    Extraction::Empty { schema } => {
                        debug!("[refresh] {key}: empty {schema} book");
                        report.empty += 1;
                        continue;
                    }
                    Extraction::Unrecognized => {
                        warn!("[refresh] bad response from {url}, not matching any exchange format");
                        report.unrecognized += 1;
                        continue;
                    }
                },
            };
            if !self.store.apply(generation, key, outcome) {
                report.discarded += 1;
            }
        }

        Ok(report)
    }
}

/// Tracks the best bid and ask of a set of `(exchange, pair)` keys.
pub struct OrderBook {
    inner: Arc<Inner>,
    scheduler: Mutex<RepeatEvery>,
}

impl OrderBook {
    /// Build with an injected fetcher and mapping source.
    pub fn new(config: &TopBidConfig, fetcher: Box<dyn Fetcher>, source: Box<dyn MappingSource>) -> Self {
        let symbols = SymbolMapper::new(source).with_overrides(&config.mapping.static_mappings);
        Self {
            inner: Arc::new(Inner {
                store: OrderbookStore::new(),
                symbols,
                fetcher,
                refresh: config.refresh.clone(),
            }),
            scheduler: Mutex::new(RepeatEvery::new()),
        }
    }

    /// Build with the HTTP fetcher and, if enabled, the CoinGecko mapping source.
    pub fn with_defaults(config: &TopBidConfig) -> Result<Self, TopBidError> {
        let fetcher = HttpFetcher::new(config.refresh.user_agent.as_deref())?;
        let source: Box<dyn MappingSource> = if config.mapping.enabled {
            Box::new(CoinGeckoSource::new(&config.mapping)?)
        } else {
            Box::new(NoMappingSource)
        };
        Ok(Self::new(config, Box::new(fetcher), source))
    }

    fn scheduler(&self) -> MutexGuard<'_, RepeatEvery> {
        self.scheduler.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start tracking a pair. Both sides stay empty until the next cycle.
    ///
    /// The native symbol is looked up once here. Returns `false` without
    /// touching anything if the pair is already tracked.
    pub async fn add(&self, exchange: &str, pair: &str) -> bool {
        let key = PairKey::new(exchange, pair);
        if self.inner.store.contains(&key) {
            return false;
        }
        self.inner.symbols.populate(&key).await;
        let added = self.inner.store.add(key.clone());
        if added {
            info!("[orderbook] tracking {key} as {}", self.inner.symbols.get(&key));
        }
        added
    }

    /// Stop tracking a pair and forget its learned symbol.
    pub fn delete(&self, exchange: &str, pair: &str) -> bool {
        let key = PairKey::new(exchange, pair);
        self.inner.symbols.remove(&key);
        let removed = self.inner.store.delete(&key);
        if removed {
            info!("[orderbook] no longer tracking {key}");
        }
        removed
    }

    pub fn top_bid(&self, exchange: &str, pair: &str) -> TopLevel {
        self.inner.store.top_bid(&PairKey::new(exchange, pair))
    }

    pub fn top_ask(&self, exchange: &str, pair: &str) -> TopLevel {
        self.inner.store.top_ask(&PairKey::new(exchange, pair))
    }

    /// Native pair used for requests, or `pair` itself if none was found.
    pub fn exchange_symbol(&self, exchange: &str, pair: &str) -> String {
        self.inner.symbols.get(&PairKey::new(exchange, pair))
    }

    pub fn orderbook_url(&self, exchange: &str, pair: &str) -> Result<String, TopBidError> {
        registry::orderbook_url(exchange, &self.exchange_symbol(exchange, pair))
    }

    pub fn chart_url(&self, exchange: &str, pair: &str) -> Result<String, TopBidError> {
        registry::chart_url(exchange, &self.exchange_symbol(exchange, pair))
    }

    /// Markdown link to the chart page, labelled with the canonical pair.
    pub fn chart_link(&self, exchange: &str, pair: &str) -> Result<String, TopBidError> {
        registry::chart_link(exchange, pair, &self.exchange_symbol(exchange, pair))
    }

    /// Every tracked key with its current bid and ask.
    pub fn snapshot(&self) -> Vec<(PairKey, TopLevel, TopLevel)> {
        self.inner.store.snapshot()
    }

    pub fn len(&self) -> usize {
        self.inner.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.store.is_empty()
    }

    /// Refresh every `interval`, first after one interval.
    ///
    /// Calling this while running restarts the timer with the new interval
    /// and keeps the current data. Must be called inside a tokio runtime.
    pub fn start(&self, interval: Duration) -> Result<(), TopBidError> {
        let policy = FetchPolicy::for_interval(&self.inner.refresh, interval);
        policy.validate()?;

        let inner = Arc::clone(&self.inner);
        self.scheduler().start("refresh", interval, move || {
            let inner = Arc::clone(&inner);
            let policy = policy.clone();
            async move {
                let report = inner.refresh_cycle(&policy).await?;
                debug!("[refresh] {report}");
                Ok(())
            }
        });
        Ok(())
    }

    /// Stop refreshing and clear every tracked key and learned symbol.
    ///
    /// A cycle already in flight finishes, but its results are discarded.
    pub fn stop(&self) -> bool {
        let was_running = self.scheduler().stop();
        self.inner.store.reset_all();
        self.inner.symbols.clear();
        info!("[orderbook] stopped, all pairs cleared");
        was_running
    }

    pub fn is_running(&self) -> bool {
        self.scheduler().is_running()
    }

    /// Run one refresh cycle now, with the configured interval's fetch policy.
    pub async fn refresh_once(&self) -> anyhow::Result<CycleReport> {
        let policy = FetchPolicy::for_interval(&self.inner.refresh, self.inner.refresh.interval());
        self.inner.refresh_cycle(&policy).await
    }
}
