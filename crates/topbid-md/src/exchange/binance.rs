//! Binance spot orderbook.
//!
//! `GET /api/v3/depth?limit=1&symbol=BASEQUOTE`
//!
//! ```json
//! {"lastUpdateId":1027024,"bids":[["4.00000000","431.00000000"]],
//!  "asks":[["4.00000200","12.00000000"]]}
//! ```
//!
//! Errors come back as the shared `{"code":-1121,"msg":"Invalid symbol."}`
//! envelope and are handled by the classifier.

use serde_json::Value;
use topbid_core::join_pair;

use crate::classifier::Extraction;
use crate::json_util::best_level;

pub fn orderbook_url(pair: &str) -> String {
    format!("https://api.binance.com/api/v3/depth?limit=1&symbol={}", join_pair(pair, ""))
}

pub fn chart_url(pair: &str) -> String {
    format!("https://www.binance.com/en/trade/{}", join_pair(pair, "_"))
}

pub(crate) fn extract(v: &Value) -> Extraction {
    extract_depth("binance", v)
}

/// `{lastUpdateId, bids, asks}` depth body, also used by MEXC.
pub(crate) fn extract_depth(schema: &'static str, v: &Value) -> Extraction {
    Extraction::from_sides(schema, best_level(v.get("bids")), best_level(v.get("asks")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use topbid_core::{TopLevel, TopOfBook};

    use super::*;

    #[test]
    fn urls() {
        assert_eq!(orderbook_url("BTC/USDT"), "https://api.binance.com/api/v3/depth?limit=1&symbol=BTCUSDT");
        assert_eq!(chart_url("BTC/USDT"), "https://www.binance.com/en/trade/BTC_USDT");
    }

    #[test]
    fn depth_body() {
        let v = json!({
            "lastUpdateId": 1027024,
            "bids": [["4.00000000", "431.00000000"]],
            "asks": [["4.00000200", "12.00000000"]]
        });
        assert_eq!(
            extract(&v),
            Extraction::Quote(TopOfBook::new(TopLevel::new(4.0, 431.0), TopLevel::new(4.000002, 12.0)))
        );
    }

    #[test]
    fn empty_book() {
        let v = json!({"lastUpdateId": 1, "bids": [], "asks": []});
        assert_eq!(extract(&v), Extraction::Empty { schema: "binance" });
    }
}
