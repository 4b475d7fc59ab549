//! Tracked pair keys and canonical pair helpers.
//!
//! A canonical pair is written `BASE/QUOTE` (e.g. `VAIOT/USDT`). Exchanges use
//! different separators and casing natively; endpoint builders derive those
//! forms with [`join_pair`].

/// Separator between base and quote in a canonical pair.
pub const PAIR_SEPARATOR: char = '/';

/// Identifies one `(exchange, pair)` tracked instrument.
///
/// The exchange is stored lowercase; the pair is kept exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    exchange: String,
    pair: String,
}

impl PairKey {
    pub fn new(exchange: &str, pair: &str) -> Self {
        Self {
            exchange: exchange.to_ascii_lowercase(),
            pair: pair.to_string(),
        }
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn pair(&self) -> &str {
        &self.pair
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.exchange, self.pair)
    }
}

/// Split a canonical pair into `(base, quote)`.
///
/// Returns `None` when the pair has no separator or either side is empty.
pub fn split_pair(pair: &str) -> Option<(&str, &str)> {
    let (base, quote) = pair.split_once(PAIR_SEPARATOR)?;
    if base.is_empty() || quote.is_empty() {
        return None;
    }
    Some((base, quote))
}

/// Replace the canonical separator with `sep` (empty string removes it).
#[inline]
pub fn join_pair(pair: &str, sep: &str) -> String {
    pair.replace(PAIR_SEPARATOR, sep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_lowercases_exchange_only() {
        let key = PairKey::new("KuCoin", "VAI/USDT");
        assert_eq!(key.exchange(), "kucoin");
        assert_eq!(key.pair(), "VAI/USDT");
        assert_eq!(key.to_string(), "kucoin-VAI/USDT");
    }

    #[test]
    fn split_requires_both_sides() {
        assert_eq!(split_pair("BTC/USDT"), Some(("BTC", "USDT")));
        assert_eq!(split_pair("BTCUSDT"), None);
        assert_eq!(split_pair("/USDT"), None);
        assert_eq!(split_pair("BTC/"), None);
    }

    #[test]
    fn join_separators() {
        assert_eq!(join_pair("VAI/USDT", "-"), "VAI-USDT");
        assert_eq!(join_pair("VAI/USDT", "_"), "VAI_USDT");
        assert_eq!(join_pair("VAI/USDT", ""), "VAIUSDT");
    }
}
