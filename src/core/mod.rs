pub mod config;
pub mod error;
pub mod events;
pub mod height;
pub mod logging;
pub mod packets;
pub mod queue;
pub mod relay;
pub mod retry;
pub mod setup;

#[cfg(test)]
mod fixtures;
