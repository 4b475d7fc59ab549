//! Top-of-book structures.
//!
//! [`TopLevel`] is what callers read: both fields stay `None` until a refresh
//! cycle has extracted a usable level, and return to `None` when a fetch for
//! the key fails.

/// Best price level on one side of the book.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TopLevel {
    pub price: Option<f64>,
    pub volume: Option<f64>,
}

impl TopLevel {
    /// No data for this side.
    pub const EMPTY: TopLevel = TopLevel { price: None, volume: None };

    pub fn new(price: f64, volume: f64) -> Self {
        Self { price: Some(price), volume: Some(volume) }
    }

    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.volume.is_none()
    }
}

impl std::fmt::Display for TopLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.price, self.volume) {
            (Some(p), Some(v)) => write!(f, "{p}x{v}"),
            (Some(p), None) => write!(f, "{p}x?"),
            _ => f.write_str("-"),
        }
    }
}

/// Best bid and ask extracted from one orderbook response.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TopOfBook {
    pub bid: TopLevel,
    pub ask: TopLevel,
}

impl TopOfBook {
    pub fn new(bid: TopLevel, ask: TopLevel) -> Self {
        Self { bid, ask }
    }

    /// Returns `true` if neither side carries a price.
    pub fn is_empty(&self) -> bool {
        self.bid.price.is_none() && self.ask.price.is_none()
    }
}

impl std::fmt::Display for TopOfBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bid={} ask={}", self.bid, self.ask)
    }
}
