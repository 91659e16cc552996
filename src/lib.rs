//! Relays IBC packets, acknowledgements and timeouts between two chains.

pub mod core;
pub mod link;
pub mod primitives;
pub mod testsuite;

pub use crate::core::error::Error;
