//! OKX spot orderbook.
//!
//! `GET /api/v5/market/books?sz=1&instId=BASE-QUOTE`
//!
//! ```json
//! {"code":"0","msg":"","data":[{"asks":[["41006.8","0.60038921","0","1"]],
//!   "bids":[["41006.3","0.30178218","0","2"]],"ts":"1629966436396"}]}
//! ```

use serde_json::Value;
use topbid_core::join_pair;

use crate::classifier::Extraction;
use crate::json_util::{best_level, code_str, reason};

const SUCCESS_CODE: &str = "0";

pub fn orderbook_url(pair: &str) -> String {
    format!("https://www.okx.com/api/v5/market/books?sz=1&instId={}", join_pair(pair, "-").to_uppercase())
}

pub fn chart_url(pair: &str) -> String {
    format!("https://www.okx.com/trade-spot/{}", join_pair(pair, "-").to_lowercase())
}

pub(crate) fn extract(v: &Value) -> Extraction {
    if code_str(v.get("code")).as_deref() != Some(SUCCESS_CODE) {
        return Extraction::Rejected { schema: "okx", reason: reason(v.get("code"), v.get("msg")) };
    }
    let Some(book) = v.get("data").and_then(|d| d.as_array()).and_then(|d| d.first()) else {
        return Extraction::Empty { schema: "okx" };
    };
    Extraction::from_sides("okx", best_level(book.get("bids")), best_level(book.get("asks")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn urls() {
        assert_eq!(orderbook_url("btc/usdt"), "https://www.okx.com/api/v5/market/books?sz=1&instId=BTC-USDT");
        assert_eq!(chart_url("BTC/USDT"), "https://www.okx.com/trade-spot/btc-usdt");
    }

    #[test]
    fn unknown_instrument_rejected() {
        let v = json!({"code": "51001", "msg": "Instrument ID does not exist", "data": []});
        assert_eq!(
            extract(&v),
            Extraction::Rejected { schema: "okx", reason: "code=51001 msg=Instrument ID does not exist".into() }
        );
    }

    #[test]
    fn empty_data_array() {
        let v = json!({"code": "0", "msg": "", "data": []});
        assert_eq!(extract(&v), Extraction::Empty { schema: "okx" });
    }
}
