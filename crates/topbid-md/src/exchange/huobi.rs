//! Huobi (HTX) spot orderbook.
//!
//! `GET /market/depth?type=step0&depth=5&symbol=basequote`
//!
//! ```json
//! {"ch":"market.btcusdt.depth.step0","status":"ok","ts":1630983879535,
//!  "tick":{"ts":1630983878964,"version":137142934,"bids":[[52000.5,0.95]],"asks":[[52000.6,1.2]]}}
//! ```
//!
//! Levels are native JSON numbers. Errors:
//! `{"status":"error","err-code":"invalid-parameter","err-msg":"invalid symbol","ts":...}`.

use serde_json::Value;
use topbid_core::join_pair;

use crate::classifier::Extraction;
use crate::json_util::best_level;

pub fn orderbook_url(pair: &str) -> String {
    format!(
        "https://api.huobi.pro/market/depth?type=step0&depth=5&symbol={}",
        join_pair(pair, "").to_lowercase()
    )
}

pub fn chart_url(pair: &str) -> String {
    format!("https://www.htx.com/trade/{}", join_pair(pair, "_").to_lowercase())
}

pub(crate) fn extract(v: &Value) -> Extraction {
    if v.get("status").and_then(|s| s.as_str()) != Some("ok") {
        return extract_error(v);
    }
    let Some(tick) = v.get("tick").filter(|t| !t.is_null()) else {
        return Extraction::Empty { schema: "huobi" };
    };
    Extraction::from_sides("huobi", best_level(tick.get("bids")), best_level(tick.get("asks")))
}

pub(crate) fn extract_error(v: &Value) -> Extraction {
    let code = v.get("err-code").and_then(|c| c.as_str()).unwrap_or("?");
    let msg = v.get("err-msg").and_then(|m| m.as_str()).unwrap_or("");
    Extraction::Rejected { schema: "huobi-error", reason: format!("code={code} msg={msg}") }
}
