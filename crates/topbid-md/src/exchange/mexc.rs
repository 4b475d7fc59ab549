//! MEXC spot orderbook (Binance-compatible v3 API).
//!
//! `GET /api/v3/depth?limit=1&symbol=BASEQUOTE`
//!
//! Same body as Binance plus a `timestamp` field.

use serde_json::Value;
use topbid_core::join_pair;

use super::binance::extract_depth;
use crate::classifier::Extraction;

pub fn orderbook_url(pair: &str) -> String {
    format!("https://api.mexc.com/api/v3/depth?limit=1&symbol={}", join_pair(pair, "").to_uppercase())
}

pub fn chart_url(pair: &str) -> String {
    format!("https://www.mexc.com/exchange/{}", join_pair(pair, "_").to_uppercase())
}

pub(crate) fn extract(v: &Value) -> Extraction {
    extract_depth("mexc", v)
}
