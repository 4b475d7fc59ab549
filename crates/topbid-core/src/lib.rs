//! # topbid-core
//!
//! Core crate for the topbid orderbook poller, providing:
//!
//! - **Types** (`types`): exchange identifiers, tracked pair keys, top-of-book levels
//! - **Configuration** (`config`): JSON config deserialization and validation
//! - **Error types** (`error`): domain-specific `TopBidError` via thiserror
//! - **Logging** (`logging`): tracing-based structured logging

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-export types at crate root for convenience.
pub use error::TopBidError;
pub use types::*;
