//! Bitget spot orderbook (v2 API).
//!
//! `GET /api/v2/spot/market/orderbook?type=step0&limit=1&symbol=BASEQUOTE`
//!
//! ```json
//! {"code":"00000","msg":"success","requestTime":1698303884579,
//!  "data":{"asks":[["34567.15","0.0131"]],"bids":[["34567.14","0.2917"]],"ts":"1698303884584"}}
//! ```

use serde_json::Value;
use topbid_core::join_pair;

use crate::classifier::Extraction;
use crate::json_util::{best_level, code_str, reason};

const SUCCESS_CODE: &str = "00000";

pub fn orderbook_url(pair: &str) -> String {
    format!(
        "https://api.bitget.com/api/v2/spot/market/orderbook?type=step0&limit=1&symbol={}",
        join_pair(pair, "").to_uppercase()
    )
}

pub fn chart_url(pair: &str) -> String {
    format!("https://www.bitget.com/spot/{}", join_pair(pair, "").to_uppercase())
}

pub(crate) fn extract(v: &Value) -> Extraction {
    if code_str(v.get("code")).as_deref() != Some(SUCCESS_CODE) {
        return Extraction::Rejected { schema: "bitget", reason: reason(v.get("code"), v.get("msg")) };
    }
    let Some(data) = v.get("data").filter(|d| !d.is_null()) else {
        return Extraction::Empty { schema: "bitget" };
    };
    Extraction::from_sides("bitget", best_level(data.get("bids")), best_level(data.get("asks")))
}
