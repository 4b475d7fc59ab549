//! Endpoint registry: resolves exchange names to REST and chart URLs.
//!
//! Exchange names are validated here rather than when a pair is added, so a
//! misspelt exchange surfaces as [`TopBidError::UnsupportedExchange`] the
//! first time a URL is built for it.

use topbid_core::{Exchange, TopBidError};

use crate::exchange::{binance, bitget, bybit, gateio, huobi, kraken, kucoin, mexc, okx};

/// Build the top-of-book request URL for a native pair.
pub fn orderbook_url(exchange: &str, native_pair: &str) -> Result<String, TopBidError> {
    let url = match exchange.parse::<Exchange>()? {
        Exchange::Binance => binance::orderbook_url(native_pair),
        Exchange::Bitget => bitget::orderbook_url(native_pair),
        Exchange::Bybit => bybit::orderbook_url(native_pair),
        Exchange::Gateio => gateio::orderbook_url(native_pair),
        Exchange::Huobi => huobi::orderbook_url(native_pair),
        Exchange::Kraken => kraken::orderbook_url(native_pair),
        Exchange::Kucoin => kucoin::orderbook_url(native_pair),
        Exchange::Mexc => mexc::orderbook_url(native_pair),
        Exchange::Okx => okx::orderbook_url(native_pair),
    };
    Ok(url)
}

/// Build the trading-chart page URL for a native pair.
pub fn chart_url(exchange: &str, native_pair: &str) -> Result<String, TopBidError> {
    let url = match exchange.parse::<Exchange>()? {
        Exchange::Binance => binance::chart_url(native_pair),
        Exchange::Bitget => bitget::chart_url(native_pair),
        Exchange::Bybit => bybit::chart_url(native_pair),
        Exchange::Gateio => gateio::chart_url(native_pair),
        Exchange::Huobi => huobi::chart_url(native_pair),
        Exchange::Kraken => kraken::chart_url(native_pair),
        Exchange::Kucoin => kucoin::chart_url(native_pair),
        Exchange::Mexc => mexc::chart_url(native_pair),
        Exchange::Okx => okx::chart_url(native_pair),
    };
    Ok(url)
}

/// Markdown hyperlink labelled with the canonical pair: `[PAIR](chart url)`.
pub fn chart_link(exchange: &str, canonical_pair: &str, native_pair: &str) -> Result<String, TopBidError> {
    Ok(format!("[{canonical_pair}]({})", chart_url(exchange, native_pair)?))
}
