//! Response classification and top-of-book extraction.
//!
//! Exchange REST responses share no common envelope, so each body is matched
//! against a table of structural fingerprints (required top-level field
//! names). Several fingerprints are subsets of others (`code,data` ⊂
//! `code,msg,data` ⊂ `code,msg,requestTime,data`), so the table is evaluated
//! strictly in order, larger field sets first:
//!
//! | #  | Schema        | Required fields                         |
//! |----|---------------|-----------------------------------------|
//! | 1  | bitget        | `code, msg, requestTime, data`          |
//! | 2  | okx           | `code, msg, data`                       |
//! | 3  | kucoin        | `code, data`                            |
//! | 4  | code-error    | `code, msg`                             |
//! | 5  | bybit         | `retCode, retMsg, result, time`         |
//! | 6  | huobi         | `status, ch, ts, tick`                  |
//! | 7  | huobi-error   | `status, err-code, err-msg`             |
//! | 8  | gateio        | `current, update, bids, asks`           |
//! | 9  | gateio-error  | `label, message`                        |
//! | 10 | mexc          | `lastUpdateId, bids, asks, timestamp`   |
//! | 11 | binance       | `lastUpdateId, bids, asks`              |
//! | 12 | kraken        | `error, result`                         |
//! | 13 | kraken-error  | `error`                                 |

use serde_json::Value;
use topbid_core::{Exchange, TopLevel, TopOfBook};
use tracing::debug;

use crate::exchange::{binance, bitget, bybit, gateio, huobi, kraken, kucoin, mexc, okx};
use crate::json_util::{has_fields, reason};

/// Result of running one response body through the classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// A usable best bid and/or ask.
    Quote(TopOfBook),
    /// The exchange answered with an explicit error code.
    Rejected { schema: &'static str, reason: String },
    /// A successful response without any price level.
    Empty { schema: &'static str },
    /// No known schema matched.
    Unrecognized,
}

impl Extraction {
    /// Build a [`Quote`](Extraction::Quote), or [`Empty`](Extraction::Empty)
    /// if neither side has a price.
    pub fn from_sides(schema: &'static str, bid: TopLevel, ask: TopLevel) -> Self {
        let book = TopOfBook::new(bid, ask);
        if book.is_empty() { Self::Empty { schema } } else { Self::Quote(book) }
    }
}

/// Extractor function for one schema.
pub type Extractor = fn(&Value) -> Extraction;

/// One entry of the fingerprint table.
pub struct Schema {
    /// Short schema name used in logs.
    pub name: &'static str,
    /// Exchange this schema belongs to; `None` for envelopes shared by several.
    pub exchange: Option<Exchange>,
    /// Top-level fields that must all be present.
    pub fields: &'static [&'static str],
    pub extract: Extractor,
}

impl Schema {
    pub fn matches(&self, body: &Value) -> bool {
        has_fields(body, self.fields)
    }
}

/// Fingerprint table in priority order.
pub static SCHEMAS: &[Schema] = &[
    Schema {
        name: "bitget",
        exchange: Some(Exchange::Bitget),
        fields: &["code", "msg", "requestTime", "data"],
        extract: bitget::extract,
    },
    Schema {
        name: "okx",
        exchange: Some(Exchange::Okx),
        fields: &["code", "msg", "data"],
        extract: okx::extract,
    },
    Schema {
        name: "kucoin",
        exchange: Some(Exchange::Kucoin),
        fields: &["code", "data"],
        extract: kucoin::extract,
    },
    Schema {
        name: "code-error",
        exchange: None,
        fields: &["code", "msg"],
        extract: extract_code_error,
    },
    Schema {
        name: "bybit",
        exchange: Some(Exchange::Bybit),
        fields: &["retCode", "retMsg", "result", "time"],
        extract: bybit::extract,
    },
    Schema {
        name: "huobi",
        exchange: Some(Exchange::Huobi),
        fields: &["status", "ch", "ts", "tick"],
        extract: huobi::extract,
    },
    Schema {
        name: "huobi-error",
        exchange: Some(Exchange::Huobi),
        fields: &["status", "err-code", "err-msg"],
        extract: huobi::extract_error,
    },
    Schema {
        name: "gateio",
        exchange: Some(Exchange::Gateio),
        fields: &["current", "update", "bids", "asks"],
        extract: gateio::extract,
    },
    Schema {
        name: "gateio-error",
        exchange: Some(Exchange::Gateio),
        fields: &["label", "message"],
        extract: gateio::extract_error,
    },
    Schema {
        name: "mexc",
        exchange: Some(Exchange::Mexc),
        fields: &["lastUpdateId", "bids", "asks", "timestamp"],
        extract: mexc::extract,
    },
    Schema {
        name: "binance",
        exchange: Some(Exchange::Binance),
        fields: &["lastUpdateId", "bids", "asks"],
        extract: binance::extract,
    },
    Schema {
        name: "kraken",
        exchange: Some(Exchange::Kraken),
        fields: &["error", "result"],
        extract: kraken::extract,
    },
    Schema {
        name: "kraken-error",
        exchange: Some(Exchange::Kraken),
        fields: &["error"],
        extract: kraken::extract_error,
    },
];

/// Find the first schema whose fingerprint matches `body`.
pub fn classify(body: &Value) -> Option<&'static Schema> {
    SCHEMAS.iter().find(|s| s.matches(body))
}

/// Classify `body` and extract its best bid/ask.
///
/// With a `hint`, the hinted exchange's own schemas are tried first (in
/// table order); if none of them match, the body is sniffed against the
/// whole table. This lets an exchange whose payload is a subset of another
/// schema (e.g. a MEXC body without `timestamp`) still be decoded.
pub fn extract(body: &Value, hint: Option<Exchange>) -> Extraction {
    let hinted = hint.and_then(|ex| {
        SCHEMAS
            .iter()
            .filter(|s| s.exchange == Some(ex))
            .find(|s| s.matches(body))
    });

    let schema = match hinted {
        Some(s) => s,
        None => match classify(body) {
            Some(s) => {
                if let Some(ex) = hint {
                    debug!("[classifier] {ex} response matched foreign schema '{}'", s.name);
                }
                s
            }
            None => return Extraction::Unrecognized,
        },
    };

    (schema.extract)(body)
}

/// Shared `{code, msg}` error envelope (Binance, MEXC and KuCoin errors).
fn extract_code_error(v: &Value) -> Extraction {
    Extraction::Rejected { schema: "code-error", reason: reason(v.get("code"), v.get("msg")) }
}
