//! Per-exchange REST endpoints and response extractors.
//!
//! Each module provides:
//! - `orderbook_url(pair)`: request URL for the top of book of a native pair
//! - `chart_url(pair)`: web trading-chart page for the pair
//! - `extract(body)`: best bid/ask extractor registered in
//!   [`SCHEMAS`](crate::classifier::SCHEMAS)
//!
//! Pairs passed in are native pairs in canonical `BASE/QUOTE` form; each
//! exchange rewrites the separator and casing its own way.

pub mod binance;
pub mod bitget;
pub mod bybit;
pub mod gateio;
pub mod huobi;
pub mod kraken;
pub mod kucoin;
pub mod mexc;
pub mod okx;
