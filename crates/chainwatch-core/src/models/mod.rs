//! Data models for Chainwatch

mod alert;
mod chain;

pub use alert::*;
pub use chain::*;
