//! Exchange identifiers.
//!
//! Tracked pairs keep the exchange as a lowercase string so that a typo is
//! accepted at add-time and only rejected when a URL is resolved. Parsing
//! into [`Exchange`] is where that check happens.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TopBidError;

// ---------------------------------------------------------------------------
// Exchange identifiers
// ---------------------------------------------------------------------------

/// Exchanges with a known REST orderbook endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    Binance,
    Bitget,
    Bybit,
    Gateio,
    Huobi,
    Kraken,
    Kucoin,
    Mexc,
    Okx,
}

impl Exchange {
    /// Every supported exchange, in alphabetical order.
    pub const ALL: [Exchange; 9] = [
        Self::Binance,
        Self::Bitget,
        Self::Bybit,
        Self::Gateio,
        Self::Huobi,
        Self::Kraken,
        Self::Kucoin,
        Self::Mexc,
        Self::Okx,
    ];

    /// Lowercase canonical name, as used in tracked pair keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Binance => "binance",
            Self::Bitget => "bitget",
            Self::Bybit => "bybit",
            Self::Gateio => "gateio",
            Self::Huobi => "huobi",
            Self::Kraken => "kraken",
            Self::Kucoin => "kucoin",
            Self::Mexc => "mexc",
            Self::Okx => "okx",
        }
    }

    /// Exchange identifier used by the CoinGecko tickers endpoint.
    pub fn coingecko_id(&self) -> &'static str {
        match self {
            Self::Binance => "binance",
            Self::Bitget => "bitget",
            Self::Bybit => "bybit_spot",
            Self::Gateio => "gate",
            Self::Huobi => "huobi",
            Self::Kraken => "kraken",
            Self::Kucoin => "kucoin",
            Self::Mexc => "mxc",
            Self::Okx => "okex",
        }
    }
}

impl FromStr for Exchange {
    type Err = TopBidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == lower)
            .ok_or(TopBidError::UnsupportedExchange(lower))
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
