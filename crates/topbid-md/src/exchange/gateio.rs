//! Gate.io spot orderbook (v4 API).
//!
//! `GET /api/v4/spot/order_book?limit=1&currency_pair=BASE_QUOTE`
//!
//! ```json
//! {"current":1623898993123,"update":1623898993121,
//!  "asks":[["1.52","1.151"]],"bids":[["1.17","201.863"]]}
//! ```
//!
//! Errors: `{"label":"INVALID_CURRENCY_PAIR","message":"..."}`.

use serde_json::Value;
use topbid_core::join_pair;

use crate::classifier::Extraction;
use crate::json_util::best_level;

pub fn orderbook_url(pair: &str) -> String {
    format!(
        "https://api.gateio.ws/api/v4/spot/order_book?limit=1&currency_pair={}",
        join_pair(pair, "_").to_uppercase()
    )
}

pub fn chart_url(pair: &str) -> String {
    format!("https://www.gate.io/trade/{}", join_pair(pair, "_").to_uppercase())
}

pub(crate) fn extract(v: &Value) -> Extraction {
    Extraction::from_sides("gateio", best_level(v.get("bids")), best_level(v.get("asks")))
}

pub(crate) fn extract_error(v: &Value) -> Extraction {
    let label = v.get("label").and_then(|l| l.as_str()).unwrap_or("?");
    let message = v.get("message").and_then(|m| m.as_str()).unwrap_or("");
    Extraction::Rejected { schema: "gateio-error", reason: format!("{label}: {message}") }
}
