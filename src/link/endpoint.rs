use crate::{
    core::{
        error::Error,
        events::{
            flatten_logs, parse_acks_from_events, parse_raw_log, parse_send_packet_events, Event,
            SEND_PACKET_EVENT, WRITE_ACK_EVENT,
        },
        height::Height,
        packets::types::{AckWithMetadata, Packet, PacketWithMetadata},
        queue::{flush_message_batch, BatchOutcome},
    },
    primitives::{funcs, Chain, Header, RequestBudget, TxResult, TxSearch},
};
use ibc_proto::google::protobuf::Any;
use serde::{Deserialize, Serialize};
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use tendermint::Time;
use tokio::sync::{Mutex, MutexGuard};

/// Search cursors of one endpoint: the lowest heights that may still hold unrelayed
/// `send_packet` and `write_acknowledgement` events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointHeights {
    pub packet_height: u64,
    pub ack_height: u64,
}

/// State of the client on an endpoint, measured against the tracked chain's clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientStatus {
    pub height: Height,
    /// Time elapsed since the latest consensus state was produced
    pub age: Duration,
    pub trusting_period_remaining: Duration,
}

impl ClientStatus {
    pub fn ensure_fresh(&self, chain: &str, client_id: &str, max_age: Duration) -> Result<(), Error> {
        if self.age > max_age {
            return Err(Error::ClientStale {
                chain: chain.to_string(),
                client_id: client_id.to_string(),
                age: self.age,
            });
        }
        Ok(())
    }

    pub fn is_expired(&self) -> bool {
        self.trusting_period_remaining.is_zero()
    }
}

/// One side of a link: a chain, the client and connection the relayer works through, and
/// the relay cursors for that chain.
pub struct Endpoint<C: Chain> {
    chain: C,
    pub client_id: String,
    pub connection_id: String,
    /// (port, channel) pairs to relay; empty relays every channel on the connection
    channel_whitelist: Vec<(String, String)>,
    packet_cursor: AtomicU64,
    ack_cursor: AtomicU64,
    budget: RequestBudget,
    update_lock: Mutex<()>,
    submit_lock: Mutex<()>,
}

impl<C: Chain> Endpoint<C> {
    pub fn new(chain: C, client_id: String, connection_id: String, budget: RequestBudget) -> Self {
        Self {
            chain,
            client_id,
            connection_id,
            channel_whitelist: vec![],
            packet_cursor: AtomicU64::new(0),
            ack_cursor: AtomicU64::new(0),
            budget,
            update_lock: Mutex::new(()),
            submit_lock: Mutex::new(()),
        }
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    pub fn chain_id(&self) -> &str {
        self.chain.chain_id()
    }

    pub fn set_channel_whitelist(&mut self, channel_whitelist: Vec<(String, String)>) {
        self.channel_whitelist = channel_whitelist;
    }

    fn is_whitelisted(&self, port_id: &str, channel_id: &str) -> bool {
        self.channel_whitelist.is_empty()
            || self
                .channel_whitelist
                .iter()
                .any(|(port, channel)| port == port_id && channel == channel_id)
    }

    pub fn packet_cursor(&self) -> u64 {
        self.packet_cursor.load(Ordering::SeqCst)
    }

    pub fn set_packet_cursor(&self, height: u64) {
        self.packet_cursor.store(height, Ordering::SeqCst);
    }

    pub fn ack_cursor(&self) -> u64 {
        self.ack_cursor.load(Ordering::SeqCst)
    }

    pub fn set_ack_cursor(&self, height: u64) {
        self.ack_cursor.store(height, Ordering::SeqCst);
    }

    pub fn heights(&self) -> EndpointHeights {
        EndpointHeights {
            packet_height: self.packet_cursor(),
            ack_height: self.ack_cursor(),
        }
    }

    pub fn resume_from(&self, heights: EndpointHeights) {
        self.set_packet_cursor(heights.packet_height);
        self.set_ack_cursor(heights.ack_height);
    }

    /// Held while deciding on and submitting a client update on this chain.
    pub(crate) async fn lock_updates(&self) -> MutexGuard<'_, ()> {
        self.update_lock.lock().await
    }

    pub async fn latest_height_and_timestamp(&self) -> Result<(Height, Time), Error> {
        let _permit = self.budget.acquire().await;
        self.chain.latest_height_and_timestamp().await
    }

    async fn search_txs(&self, event_kind: &str, since: u64, until: u64) -> Result<Vec<TxResult>, Error> {
        let _permit = self.budget.acquire().await;
        self.chain
            .search_txs(TxSearch {
                event_kind: event_kind.to_string(),
                connection_id: self.connection_id.clone(),
                min_height: since,
                max_height: until,
            })
            .await
    }

    /// Packets sent on this chain through the endpoint's connection between `since` and
    /// `until`, in emission order.
    pub async fn query_pending_packets(
        &self,
        since: u64,
        until: u64,
    ) -> Result<Vec<PacketWithMetadata>, Error> {
        let mut packets = vec![];
        for tx in self.search_txs(SEND_PACKET_EVENT, since, until).await? {
            let events = tx_events(&tx)?;
            let sent = parse_send_packet_events(&events).map_err(|e| {
                log::error!(target: "packet-relayer", "❌ Could not parse packets of tx {} on {}: {}", tx.hash, self.chain.name(), e);
                e
            })?;
            packets.extend(
                sent.into_iter()
                    .filter(|event| event.connection_id == self.connection_id)
                    .filter(|event| {
                        self.is_whitelisted(&event.packet.source_port, &event.packet.source_channel)
                    })
                    .map(|event| PacketWithMetadata {
                        packet: event.packet,
                        height: tx.height,
                    }),
            );
        }
        log::trace!(target: "packet-relayer", "Found {} packets on {} in [{}, {}]", packets.len(), self.chain.name(), since, until);
        Ok(packets)
    }

    /// Acknowledgements written on this chain for packets received through the endpoint's
    /// connection between `since` and `until`.
    pub async fn query_pending_acks(
        &self,
        since: u64,
        until: u64,
    ) -> Result<Vec<AckWithMetadata>, Error> {
        let mut acks = vec![];
        for tx in self.search_txs(WRITE_ACK_EVENT, since, until).await? {
            let events = tx_events(&tx)?;
            let written = parse_acks_from_events(&events).map_err(|e| {
                log::error!(target: "packet-relayer", "❌ Could not parse acknowledgements of tx {} on {}: {}", tx.hash, self.chain.name(), e);
                e
            })?;
            acks.extend(
                written
                    .into_iter()
                    .filter(|ack| {
                        self.is_whitelisted(
                            &ack.original_packet.destination_port,
                            &ack.original_packet.destination_channel,
                        )
                    })
                    .map(|ack| AckWithMetadata {
                        ack,
                        height: tx.height,
                    }),
            );
        }
        Ok(acks)
    }

    /// Age and remaining trust of `client_id`, where `now` is the latest block time of the
    /// chain the client tracks.
    pub async fn query_client_state(&self, client_id: &str, now: Time) -> Result<ClientStatus, Error> {
        let _permit = self.budget.acquire().await;
        let state = self.chain.query_client_state(client_id).await?;
        let produced_at = self
            .chain
            .query_consensus_state_time(client_id, state.latest_height)
            .await?;
        let age = now.duration_since(produced_at).unwrap_or_default();
        Ok(ClientStatus {
            height: state.latest_height,
            age,
            trusting_period_remaining: state.trusting_period.saturating_sub(age),
        })
    }

    pub async fn query_client_status(&self, now: Time) -> Result<ClientStatus, Error> {
        self.query_client_state(&self.client_id, now).await
    }

    /// Time of the tracked chain stored in this endpoint's client at `height`.
    pub async fn query_consensus_state_time(&self, height: Height) -> Result<Time, Error> {
        let _permit = self.budget.acquire().await;
        self.chain
            .query_consensus_state_time(&self.client_id, height)
            .await
    }

    pub async fn query_header(&self, trusted_height: Height) -> Result<Header, Error> {
        let _permit = self.budget.acquire().await;
        self.chain.query_header(trusted_height).await
    }

    pub async fn query_packet_commitment_proof(&self, packet: &Packet, at: Height) -> Result<Vec<u8>, Error> {
        let _permit = self.budget.acquire().await;
        self.chain.query_packet_commitment_proof(packet, at).await
    }

    pub async fn query_packet_acknowledgement_proof(
        &self,
        packet: &Packet,
        at: Height,
    ) -> Result<Vec<u8>, Error> {
        let _permit = self.budget.acquire().await;
        self.chain.query_packet_acknowledgement_proof(packet, at).await
    }

    pub async fn query_packet_receipt_proof(
        &self,
        packet: &Packet,
        at: Height,
    ) -> Result<(Vec<u8>, u64), Error> {
        let _permit = self.budget.acquire().await;
        self.chain.query_packet_receipt_proof(packet, at).await
    }

    /// Drops the packets sent from this endpoint that were already received on, or timed
    /// out against, `sink`.
    pub async fn query_undelivered_packets<D: Chain>(
        &self,
        sink: &Endpoint<D>,
        packets: Vec<PacketWithMetadata>,
    ) -> Result<Vec<PacketWithMetadata>, Error> {
        let committed = {
            let _permit = self.budget.acquire().await;
            funcs::query_committed_packets(&self.chain, packets).await?
        };
        sink.query_unreceived_packets(committed).await
    }

    /// Drops the packets this endpoint already holds a receipt for.
    pub async fn query_unreceived_packets(
        &self,
        packets: Vec<PacketWithMetadata>,
    ) -> Result<Vec<PacketWithMetadata>, Error> {
        let _permit = self.budget.acquire().await;
        funcs::query_unreceived_packets(&self.chain, packets).await
    }

    /// Drops the acknowledgements this endpoint has already processed.
    pub async fn query_undelivered_acks(
        &self,
        acks: Vec<AckWithMetadata>,
    ) -> Result<Vec<AckWithMetadata>, Error> {
        let _permit = self.budget.acquire().await;
        funcs::query_undelivered_acks(&self.chain, acks).await
    }

    pub fn build_update_client_message(&self, header: Header) -> Any {
        funcs::update_client_message(&self.client_id, header, self.chain.account_id())
    }

    pub fn signer(&self) -> String {
        self.chain.account_id()
    }

    pub async fn estimate_weight(&self, msgs: Vec<Any>) -> Result<u64, Error> {
        let _permit = self.budget.acquire().await;
        self.chain.estimate_weight(msgs).await
    }

    /// Submits one transaction. Submissions on the same endpoint never overlap.
    pub async fn submit(&self, msgs: Vec<Any>) -> Result<TxResult, Error> {
        let _guard = self.submit_lock.lock().await;
        let _permit = self.budget.acquire().await;
        self.chain.submit(msgs).await
    }

    pub async fn submit_batch(&self, msgs: Vec<Any>) -> Result<BatchOutcome, Error> {
        flush_message_batch(msgs, self).await
    }
}

/// Events of a transaction, falling back to its raw log when the node returned no events.
fn tx_events(tx: &TxResult) -> Result<Vec<Event>, Error> {
    if !tx.events.is_empty() || tx.raw_log.is_empty() {
        return Ok(tx.events.clone());
    }
    Ok(flatten_logs(&parse_raw_log(&tx.raw_log)?))
}
