//! In-memory top-of-book tables.
//!
//! [`OrderbookStore`] holds one bid table and one ask table keyed by
//! [`PairKey`]. Both tables always carry the same key set: every mutation
//! touches both under a single write lock.
//!
//! Readers may call from any thread while a refresh cycle writes. Writes from
//! a cycle are tagged with the store generation observed when the cycle
//! started; [`reset_all`](OrderbookStore::reset_all) bumps the generation so
//! results from a cycle that was in flight during a reset are dropped.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ahash::AHashMap;
use topbid_core::{PairKey, TopLevel, TopOfBook};

/// What a refresh cycle decided for one key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RefreshOutcome {
    /// Replace both sides with freshly extracted levels.
    Quote(TopOfBook),
    /// Reset both sides to "no data".
    Invalidate,
}

#[derive(Debug, Default)]
struct Tables {
    bids: AHashMap<PairKey, TopLevel>,
    asks: AHashMap<PairKey, TopLevel>,
    generation: u64,
}

/// Bid and ask tables for all tracked pairs.
#[derive(Debug, Default)]
pub struct OrderbookStore {
    tables: RwLock<Tables>,
}

impl OrderbookStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start tracking `key` with empty bid and ask.
    ///
    /// Returns `false` (and leaves existing prices untouched) if the key is
    /// already tracked.
    pub fn add(&self, key: PairKey) -> bool {
        let mut t = self.write();
        if t.bids.contains_key(&key) {
            return false;
        }
        t.asks.insert(key.clone(), TopLevel::EMPTY);
        t.bids.insert(key, TopLevel::EMPTY);
        true
    }

    /// Stop tracking `key`. Returns `false` if it was not tracked.
    pub fn delete(&self, key: &PairKey) -> bool {
        let mut t = self.write();
        let had_bid = t.bids.remove(key).is_some();
        let had_ask = t.asks.remove(key).is_some();
        had_bid || had_ask
    }

    pub fn contains(&self, key: &PairKey) -> bool {
        self.read().bids.contains_key(key)
    }

    /// Best bid for `key`; empty for unknown keys.
    pub fn top_bid(&self, key: &PairKey) -> TopLevel {
        self.read().bids.get(key).copied().unwrap_or(TopLevel::EMPTY)
    }

    /// Best ask for `key`; empty for unknown keys.
    pub fn top_ask(&self, key: &PairKey) -> TopLevel {
        self.read().asks.get(key).copied().unwrap_or(TopLevel::EMPTY)
    }

    /// Write one refresh result.
    ///
    /// Ignored (returns `false`) when the store was reset since `generation`
    /// was read, or when the key has been deleted in the meantime.
    pub fn apply(&self, generation: u64, key: &PairKey, outcome: RefreshOutcome) -> bool {
        let mut t = self.write();
        if t.generation != generation || !t.bids.contains_key(key) {
            return false;
        }
        let (bid, ask) = match outcome {
            RefreshOutcome::Quote(book) => (book.bid, book.ask),
            RefreshOutcome::Invalidate => (TopLevel::EMPTY, TopLevel::EMPTY),
        };
        t.bids.insert(key.clone(), bid);
        t.asks.insert(key.clone(), ask);
        true
    }

    /// Drop every tracked key and bump the generation.
    pub fn reset_all(&self) {
        let mut t = self.write();
        t.bids.clear();
        t.asks.clear();
        t.generation = t.generation.wrapping_add(1);
    }

    /// Current generation plus a sorted snapshot of the tracked keys.
    pub fn keys(&self) -> (u64, Vec<PairKey>) {
        let t = self.read();
        let mut keys: Vec<PairKey> = t.bids.keys().cloned().collect();
        keys.sort();
        (t.generation, keys)
    }

    /// Every tracked key with its bid and ask, sorted by key.
    pub fn snapshot(&self) -> Vec<(PairKey, TopLevel, TopLevel)> {
        let t = self.read();
        let mut rows: Vec<(PairKey, TopLevel, TopLevel)> = t
            .bids
            .iter()
            .map(|(k, bid)| (k.clone(), *bid, t.asks.get(k).copied().unwrap_or(TopLevel::EMPTY)))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    pub fn len(&self) -> usize {
        self.read().bids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().bids.is_empty()
    }

    #[cfg(test)]
    fn key_sets_match(&self) -> bool {
        let t = self.read();
        t.bids.len() == t.asks.len() && t.bids.keys().all(|k| t.asks.contains_key(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> PairKey {
        PairKey::new("kucoin", "VAI/USDT")
    }

    fn quote() -> RefreshOutcome {
        RefreshOutcome::Quote(TopOfBook::new(TopLevel::new(0.197007, 1300.0), TopLevel::new(0.197607, 1506.5178)))
    }

    #[test]
    fn new_key_is_empty() {
        let store = OrderbookStore::new();
        assert!(store.add(key()));
        assert_eq!(store.top_bid(&key()), TopLevel::EMPTY);
        assert_eq!(store.top_ask(&key()), TopLevel::EMPTY);
        assert!(store.key_sets_match());
    }

    #[test]
    fn add_twice_keeps_prices() {
        let store = OrderbookStore::new();
        store.add(key());
        assert!(store.apply(store.keys().0, &key(), quote()));
        assert!(!store.add(key()));
        assert_eq!(store.top_bid(&key()), TopLevel::new(0.197007, 1300.0));
    }

    #[test]
    fn invalidate_clears_both_sides() {
        let store = OrderbookStore::new();
        store.add(key());
        let generation = store.keys().0;
        store.apply(generation, &key(), quote());
        store.apply(generation, &key(), RefreshOutcome::Invalidate);
        assert_eq!(store.top_bid(&key()), TopLevel::EMPTY);
        assert_eq!(store.top_ask(&key()), TopLevel::EMPTY);
        assert!(store.contains(&key()));
    }

    #[test]
    fn delete_removes_from_both_tables() {
        let store = OrderbookStore::new();
        store.add(key());
        store.apply(store.keys().0, &key(), quote());
        assert!(store.delete(&key()));
        assert!(!store.delete(&key()));
        assert_eq!(store.top_bid(&key()), TopLevel::EMPTY);
        assert!(store.is_empty());
        assert!(store.key_sets_match());
    }

    #[test]
    fn apply_after_delete_does_not_resurrect() {
        let store = OrderbookStore::new();
        store.add(key());
        let generation = store.keys().0;
        store.delete(&key());
        assert!(!store.apply(generation, &key(), quote()));
        assert!(!store.contains(&key()));
        assert!(store.key_sets_match());
    }

    #[test]
    fn stale_generation_is_discarded() {
        let store = OrderbookStore::new();
        store.add(key());
        let (generation, keys) = store.keys();
        assert_eq!(keys, vec![key()]);
        store.reset_all();
        store.add(key());
        assert!(!store.apply(generation, &key(), quote()));
        assert_eq!(store.top_bid(&key()), TopLevel::EMPTY);
    }

    #[test]
    fn snapshot_is_sorted() {
        let store = OrderbookStore::new();
        store.add(PairKey::new("kucoin", "VAI/USDT"));
        store.add(PairKey::new("binance", "BTC/USDT"));
        let rows = store.snapshot();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0.exchange(), "binance");
        assert_eq!(store.len(), 2);
    }
}
