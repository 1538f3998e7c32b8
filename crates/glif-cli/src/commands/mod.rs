//! Command handlers.

pub mod tx;
pub mod wallet;
