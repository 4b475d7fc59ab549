//! KuCoin spot orderbook.
//!
//! `GET /api/v1/market/orderbook/level2_20?symbol=BASE-QUOTE`
//!
//! ```json
//! {"code":"200000","data":{"time":1675853445037,"sequence":"47221666",
//!   "bids":[["0.197007","1300"]],"asks":[["0.197607","1506.5178"]]}}
//! ```
//!
//! `data.bids` / `data.asks` may be `null` on a successful call for an
//! inactive market.

use serde_json::Value;
use topbid_core::join_pair;

use crate::classifier::Extraction;
use crate::json_util::{best_level, code_str, reason};

const SUCCESS_CODE: &str = "200000";

pub fn orderbook_url(pair: &str) -> String {
    format!("https://api.kucoin.com/api/v1/market/orderbook/level2_20?symbol={}", join_pair(pair, "-"))
}

pub fn chart_url(pair: &str) -> String {
    format!("https://www.kucoin.com/trade/{}", join_pair(pair, "-"))
}

pub(crate) fn extract(v: &Value) -> Extraction {
    if code_str(v.get("code")).as_deref() != Some(SUCCESS_CODE) {
        return Extraction::Rejected { schema: "kucoin", reason: reason(v.get("code"), v.get("msg")) };
    }
    let Some(data) = v.get("data").filter(|d| !d.is_null()) else {
        return Extraction::Empty { schema: "kucoin" };
    };
    Extraction::from_sides("kucoin", best_level(data.get("bids")), best_level(data.get("asks")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use topbid_core::TopLevel;

    use super::*;

    #[test]
    fn urls() {
        assert_eq!(
            orderbook_url("VAI/USDT"),
            "https://api.kucoin.com/api/v1/market/orderbook/level2_20?symbol=VAI-USDT"
        );
        assert_eq!(chart_url("VAI/USDT"), "https://www.kucoin.com/trade/VAI-USDT");
    }

    #[test]
    fn null_sides_are_empty() {
        let v = json!({"code": "200000", "data": {"time": 1, "sequence": "1", "bids": null, "asks": null}});
        assert_eq!(extract(&v), Extraction::Empty { schema: "kucoin" });
    }

    #[test]
    fn one_sided_book() {
        let v = json!({"code": "200000", "data": {"bids": [["1.5", "10"]], "asks": null}});
        match extract(&v) {
            Extraction::Quote(book) => {
                assert_eq!(book.bid, TopLevel::new(1.5, 10.0));
                assert_eq!(book.ask, TopLevel::EMPTY);
            }
            other => panic!("expected Quote, got {other:?}"),
        }
    }

    #[test]
    fn error_code_rejected() {
        let v = json!({"code": "400100", "data": null, "msg": "symbol not exists"});
        assert!(matches!(extract(&v), Extraction::Rejected { schema: "kucoin", .. }));
    }
}
