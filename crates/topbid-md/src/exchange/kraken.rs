//! Kraken spot orderbook.
//!
//! `GET /0/public/Depth?count=1&pair=BASEQUOTE`
//!
//! ```json
//! {"error":[],"result":{"XXBTZUSD":{"asks":[["29000.1","1.2",1688671200]],
//!   "bids":[["28999.9","0.4",1688671199]]}}}
//! ```
//!
//! The single `result` entry is keyed by Kraken's own pair name, which may
//! differ from the requested one, so the first entry is taken whatever its key.
//! Failures return `{"error":["EQuery:Unknown asset pair"]}` without `result`.

use serde_json::Value;
use topbid_core::join_pair;

use crate::classifier::Extraction;
use crate::json_util::best_level;

pub fn orderbook_url(pair: &str) -> String {
    format!("https://api.kraken.com/0/public/Depth?count=1&pair={}", join_pair(pair, ""))
}

pub fn chart_url(pair: &str) -> String {
    format!("https://trade.kraken.com/charts/KRAKEN:{}", join_pair(pair, "-"))
}

pub(crate) fn extract(v: &Value) -> Extraction {
    if let Some(reason) = error_messages(v) {
        return Extraction::Rejected { schema: "kraken", reason };
    }
    let Some(book) = v.get("result").and_then(|r| r.as_object()).and_then(|r| r.values().next()) else {
        return Extraction::Empty { schema: "kraken" };
    };
    Extraction::from_sides("kraken", best_level(book.get("bids")), best_level(book.get("asks")))
}

pub(crate) fn extract_error(v: &Value) -> Extraction {
    let reason = error_messages(v).unwrap_or_else(|| "unknown error".to_string());
    Extraction::Rejected { schema: "kraken-error", reason }
}

/// Joined `error` array, or `None` when it is empty.
fn error_messages(v: &Value) -> Option<String> {
    let errors: Vec<&str> = v.get("error")?.as_array()?.iter().filter_map(|e| e.as_str()).collect();
    if errors.is_empty() { None } else { Some(errors.join("; ")) }
}
