use crate::core::{error::Error, events::Event, height::Height, packets::types::Packet};
use ibc_proto::google::protobuf::Any;
use std::time::Duration;
use tendermint::Time;

/// A committed transaction as returned by a chain's submit or search endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxResult {
    pub hash: String,
    pub height: u64,
    /// Flat list of events, empty when the node only returned `raw_log`.
    pub events: Vec<Event>,
    pub raw_log: String,
}

/// Transaction search for one event type on one connection, inclusive on both ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxSearch {
    pub event_kind: String,
    pub connection_id: String,
    pub min_height: u64,
    pub max_height: u64,
}

/// The parts of a connection end the relayer relies on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub client_id: String,
    pub counterparty_client_id: String,
    pub counterparty_connection_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientStateInfo {
    /// Chain id of the chain this client tracks
    pub chain_id: String,
    pub latest_height: Height,
    pub trusting_period: Duration,
}

/// A light client header of this chain, opaque to the relayer.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub height: Height,
    pub time: Time,
    pub value: Any,
}

#[async_trait::async_trait]
pub trait Chain: IbcProvider + KeyProvider + Send + Sync {
    /// Name of this chain, used in logs.
    fn name(&self) -> &str;

    fn chain_id(&self) -> &str;

    /// Should return a numerical value for the max weight of transactions allowed in a block.
    fn block_max_weight(&self) -> u64;

    /// Should return an estimate of the weight of a batch of messages.
    async fn estimate_weight(&self, msgs: Vec<Any>) -> Result<u64, Error>;

    /// Submit messages from the counterparty chain as one transaction. A transaction
    /// that was committed but failed must be reported through [`Error::from_tx_failure`].
    async fn submit(&self, messages: Vec<Any>) -> Result<TxResult, Error>;
}

/// Provides an interface for accessing events and IBC state which must be relayed to the
/// counterparty chain.
#[async_trait::async_trait]
pub trait IbcProvider: Send + Sync {
    /// Return latest height and block time
    async fn latest_height_and_timestamp(&self) -> Result<(Height, Time), Error>;

    /// Search committed transactions carrying an event of the given kind.
    async fn search_txs(&self, search: TxSearch) -> Result<Vec<TxResult>, Error>;

    async fn query_connection(&self, connection_id: &str) -> Result<ConnectionInfo, Error>;

    async fn query_client_state(&self, client_id: &str) -> Result<ClientStateInfo, Error>;

    /// Block time of the counterparty stored in the client's consensus state at `height`.
    async fn query_consensus_state_time(&self, client_id: &str, height: Height)
        -> Result<Time, Error>;

    /// Header at the latest height of this chain, built on top of `trusted_height`.
    async fn query_header(&self, trusted_height: Height) -> Result<Header, Error>;

    /// Sequences of packets sent on `port_id`/`channel_id` whose commitment still exists.
    async fn query_packet_commitments(
        &self,
        port_id: &str,
        channel_id: &str,
        seqs: Vec<u64>,
    ) -> Result<Vec<u64>, Error>;

    /// Given packet sequences sent to `port_id`/`channel_id` on this chain, return the ones
    /// not received yet.
    async fn query_unreceived_packets(
        &self,
        port_id: &str,
        channel_id: &str,
        seqs: Vec<u64>,
    ) -> Result<Vec<u64>, Error>;

    /// Given packet sequences sent from `port_id`/`channel_id` on this chain, return the ones
    /// whose acknowledgement has not been processed yet.
    async fn query_unreceived_acknowledgements(
        &self,
        port_id: &str,
        channel_id: &str,
        seqs: Vec<u64>,
    ) -> Result<Vec<u64>, Error>;

    /// Proof of the packet commitment on this (sending) chain.
    async fn query_packet_commitment_proof(
        &self,
        packet: &Packet,
        at: Height,
    ) -> Result<Vec<u8>, Error>;

    /// Proof of the acknowledgement written on this (receiving) chain.
    async fn query_packet_acknowledgement_proof(
        &self,
        packet: &Packet,
        at: Height,
    ) -> Result<Vec<u8>, Error>;

    /// Proof that this (receiving) chain never received the packet, along with the
    /// channel's next receive sequence.
    async fn query_packet_receipt_proof(
        &self,
        packet: &Packet,
        at: Height,
    ) -> Result<(Vec<u8>, u64), Error>;
}

/// Provides an interface for managing key management for signing.
pub trait KeyProvider {
    /// Should return the relayer's account id on the host chain as a string in the expected format
    fn account_id(&self) -> String;
}

/// Creates a fresh connection between two chains in a single step. Returns the
/// connection ids on `chain_a` and `chain_b`.
#[async_trait::async_trait]
pub trait ConnectionHandshake<A: Chain, B: Chain>: Send + Sync {
    async fn create_connection_pair(&self, chain_a: &A, chain_b: &B)
        -> Result<(String, String), Error>;
}
