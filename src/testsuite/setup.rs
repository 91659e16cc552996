use super::mock::{MockChain, MockChannel, MockHandshake, BLOCK_TIME};
use crate::{
    link::{Link, RelaySummary},
    primitives::RequestBudget,
};
use std::{future::Future, time::Duration};

pub const CHAIN_A: &str = "juno-1";
pub const CHAIN_B: &str = "nois-2";
pub const TRANSFER_PORT: &str = "transfer";

pub async fn timeout_future<T: Future>(future: T, secs: u64, reason: String) -> T::Output {
    let duration = Duration::from_secs(secs);
    match tokio::time::timeout(duration, future).await {
        Ok(output) => output,
        Err(_) => panic!("Future didn't finish within {duration:?}, {reason}"),
    }
}

pub fn budgets() -> (RequestBudget, RequestBudget) {
    (RequestBudget::default(), RequestBudget::default())
}

pub fn setup_chains() -> (MockChain, MockChain) {
    log::info!(target: "packet-relayer", "============================== Starting Test ==============================");
    (MockChain::new(CHAIN_A), MockChain::new(CHAIN_B))
}

/// Opens a transfer channel between the two ends of `link`, on top of its connections.
pub fn open_channel(
    link: &Link<MockChain, MockChain>,
    channel_a: &str,
    channel_b: &str,
) -> (MockChannel, MockChannel) {
    let end_a = MockChannel {
        port_id: TRANSFER_PORT.to_string(),
        channel_id: channel_a.to_string(),
        counterparty_port_id: TRANSFER_PORT.to_string(),
        counterparty_channel_id: channel_b.to_string(),
        connection_id: link.end_a.connection_id.clone(),
    };
    let end_b = MockChannel {
        port_id: TRANSFER_PORT.to_string(),
        channel_id: channel_b.to_string(),
        counterparty_port_id: TRANSFER_PORT.to_string(),
        counterparty_channel_id: channel_a.to_string(),
        connection_id: link.end_b.connection_id.clone(),
    };
    link.end_a.chain().add_channel(end_a.clone());
    link.end_b.chain().add_channel(end_b.clone());
    log::info!(target: "packet-relayer", "============ Channel opened: {} <=> {} ============", channel_a, channel_b);
    (end_a, end_b)
}

/// This will set up a connection and a transfer channel in-between the two chains.
pub async fn setup_link(
    chain_a: MockChain,
    chain_b: MockChain,
) -> Result<(Link<MockChain, MockChain>, MockChannel, MockChannel), anyhow::Error> {
    let link =
        Link::create_with_new_connections(chain_a, chain_b, &MockHandshake::default(), budgets())
            .await?;
    log::info!(
        target: "packet-relayer",
        "============ Connection handshake completed: {} <=> {} ============",
        link.end_a.connection_id,
        link.end_b.connection_id
    );
    let (channel_a, channel_b) = open_channel(&link, "channel-0", "channel-0");
    Ok((link, channel_a, channel_b))
}

pub fn advance_both(link: &Link<MockChain, MockChain>, blocks: u64) {
    link.end_a.chain().advance(blocks, BLOCK_TIME);
    link.end_b.chain().advance(blocks, BLOCK_TIME);
}

/// Runs `cycles` relay passes over `link`, producing a block on both chains before each so
/// that everything written in the previous pass becomes provable.
pub async fn relay_cycles(link: &Link<MockChain, MockChain>, cycles: usize) -> RelaySummary {
    let mut total = RelaySummary::default();
    for cycle in 0..cycles {
        advance_both(link, 1);
        let summary = link
            .check_and_relay_packets_and_acks()
            .await
            .expect("relay cycle failed");
        log::info!(target: "packet-relayer", "Cycle {}: {}", cycle, summary);
        total += summary;
    }
    total
}
