//! Bybit spot orderbook (v5 API).
//!
//! `GET /v5/market/orderbook?category=spot&limit=1&symbol=BASEQUOTE`
//!
//! ```json
//! {"retCode":0,"retMsg":"OK","result":{"s":"BTCUSDT","b":[["65485.47","47.081829"]],
//!   "a":[["65557.7","16.606555"]],"ts":1716863719031,"u":230704},"retExtInfo":{},"time":1716863719382}
//! ```
//!
//! Unknown symbols return a non-zero `retCode` with an empty `result`.

use serde_json::Value;
use topbid_core::join_pair;

use crate::classifier::Extraction;
use crate::json_util::{best_level, code_str, reason};

const SUCCESS_CODE: &str = "0";

pub fn orderbook_url(pair: &str) -> String {
    format!(
        "https://api.bybit.com/v5/market/orderbook?category=spot&limit=1&symbol={}",
        join_pair(pair, "").to_uppercase()
    )
}

pub fn chart_url(pair: &str) -> String {
    format!("https://www.bybit.com/en/trade/spot/{}", pair.to_uppercase())
}

pub(crate) fn extract(v: &Value) -> Extraction {
    if code_str(v.get("retCode")).as_deref() != Some(SUCCESS_CODE) {
        return Extraction::Rejected { schema: "bybit", reason: reason(v.get("retCode"), v.get("retMsg")) };
    }
    let Some(result) = v.get("result").filter(|r| !r.is_null()) else {
        return Extraction::Empty { schema: "bybit" };
    };
    Extraction::from_sides("bybit", best_level(result.get("b")), best_level(result.get("a")))
}
