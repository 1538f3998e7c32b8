//! Service Layer
//!
//! Orchestrates the domain types against a [`ChainProvider`](crate::ports::ChainProvider).

pub mod replace;
pub mod submit;
pub mod wait;

pub use replace::Replacer;
pub use submit::TxSubmitter;
pub use wait::ReceiptWaiter;
