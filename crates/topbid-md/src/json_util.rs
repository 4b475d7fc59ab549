//! Shared JSON parsing helpers used by all exchange extractors.
//!
//! Exchanges encode numbers either as JSON strings (`"30000.5"`) or as native
//! numbers, and error codes as either strings or integers. These helpers
//! normalize both forms.

use topbid_core::TopLevel;

/// Parse a JSON value (string or number) as `f64`.
#[inline]
pub fn parse_str_f64(v: Option<&serde_json::Value>) -> Option<f64> {
    let v = v?;
    if let Some(s) = v.as_str() {
        fast_float2::parse(s).ok()
    } else {
        v.as_f64()
    }
}

/// Read a response code (string or integer) as a string.
pub fn code_str(v: Option<&serde_json::Value>) -> Option<String> {
    let v = v?;
    if let Some(s) = v.as_str() {
        Some(s.to_string())
    } else if v.is_number() {
        Some(v.to_string())
    } else {
        None
    }
}

/// Returns `true` if `v` is an object carrying every field in `fields`.
///
/// A field whose value is `null` still counts as present.
pub fn has_fields(v: &serde_json::Value, fields: &[&str]) -> bool {
    match v.as_object() {
        Some(obj) => fields.iter().all(|f| obj.contains_key(*f)),
        None => false,
    }
}

/// Parse one `["price", "volume", ...]` level.
///
/// Returns [`TopLevel::EMPTY`] when the level is missing or its price is not
/// numeric. Trailing elements (timestamps, order counts) are ignored.
pub fn parse_level(level: Option<&serde_json::Value>) -> TopLevel {
    let Some(arr) = level.and_then(|l| l.as_array()) else {
        return TopLevel::EMPTY;
    };
    match parse_str_f64(arr.first()) {
        Some(price) => TopLevel { price: Some(price), volume: parse_str_f64(arr.get(1)) },
        None => TopLevel::EMPTY,
    }
}

/// Best level of one side: index 0 of the level array.
///
/// A `null` or absent side yields [`TopLevel::EMPTY`]. No re-sorting is done;
/// exchanges already return bids descending and asks ascending.
#[inline]
pub fn best_level(side: Option<&serde_json::Value>) -> TopLevel {
    parse_level(side.and_then(|s| s.as_array()).and_then(|a| a.first()))
}

/// Render a short reason from a message field, falling back to the code.
pub fn reason(code: Option<&serde_json::Value>, msg: Option<&serde_json::Value>) -> String {
    let code = code_str(code).unwrap_or_else(|| "?".to_string());
    match msg.and_then(|m| m.as_str()).filter(|m| !m.is_empty()) {
        Some(m) => format!("code={code} msg={m}"),
        None => format!("code={code}"),
    }
}
