//! # topbid-md
//!
//! REST top-of-book polling across cryptocurrency exchanges.
//!
//! ## Architecture
//!
//! Each exchange module provides `orderbook_url`/`chart_url` builders and an
//! extractor for its orderbook response. The [`orderbook::OrderBook`] facade
//! periodically fetches every tracked pair, runs each body through the
//! [`classifier`] and writes the best bid/ask into the [`store`].
//!
//! ## Shared infrastructure
//!
//! - [`classifier`]: ordered response fingerprint table
//! - [`fetch`]: parallel HTTP fetch with retry and deadline
//! - [`registry`]: exchange name → endpoint builders
//! - [`scheduler`]: fixed-interval background job runner
//! - [`symbol_map`] / [`coingecko`]: canonical → native pair mapping
//! - [`json_util`]: JSON parsing helpers

pub mod classifier;
pub mod coingecko;
pub mod exchange;
pub mod fetch;
pub mod json_util;
pub mod orderbook;
pub mod registry;
pub mod scheduler;
pub mod store;
pub mod symbol_map;

pub use orderbook::{CycleReport, OrderBook};
