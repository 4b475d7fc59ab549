//! Core data types: exchange identifiers, tracked pair keys and top-of-book levels.

pub mod book;
pub mod exchange;
pub mod pair;

pub use book::*;
pub use exchange::*;
pub use pair::*;
