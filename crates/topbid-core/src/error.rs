//! Typed error definitions for the topbid system.
//!
//! Provides [`TopBidError`] for domain-specific errors that are more
//! informative than plain `anyhow::Error` strings. All variants implement
//! `std::error::Error` via `thiserror`, so they integrate with `anyhow::Result`.

use thiserror::Error;

/// Domain-specific errors for the topbid system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopBidError {
    /// Configuration parsing or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// An exchange name with no known endpoints was used to build a URL.
    #[error("config error: exchange '{0}' not supported")]
    UnsupportedExchange(String),

    /// HTTP transport setup or request failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body or field parsing error.
    #[error("parse error: {0}")]
    Parse(String),

    /// Symbol-mapping service lookup failure.
    #[error("mapping error: {0}")]
    Mapping(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_exchange_names_the_exchange() {
        let err = TopBidError::UnsupportedExchange("krakken".into());
        assert_eq!(err.to_string(), "config error: exchange 'krakken' not supported");
    }

    #[test]
    fn transport_message() {
        assert_eq!(TopBidError::Transport("timeout".into()).to_string(), "transport error: timeout");
    }
}
