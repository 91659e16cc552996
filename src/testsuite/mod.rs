//! Relay scenarios over in-memory chains, run from `tests/`.

pub mod mock;
pub mod setup;
