//! An in-memory chain for exercising the relayer without nodes. Every transaction is a
//! block; state proofs are plain strings naming what they prove and at which height.

use crate::{
    core::{
        error::Error,
        events::{
            Event, TxLog, PKT_ACK_HEX_ATTRIBUTE_KEY, PKT_CHANNEL_ORDERING_ATTRIBUTE_KEY,
            PKT_CONNECTION_ATTRIBUTE_KEY, PKT_DATA_HEX_ATTRIBUTE_KEY, PKT_DST_CHANNEL_ATTRIBUTE_KEY,
            PKT_DST_PORT_ATTRIBUTE_KEY, PKT_SEQ_ATTRIBUTE_KEY, PKT_SRC_CHANNEL_ATTRIBUTE_KEY,
            PKT_SRC_PORT_ATTRIBUTE_KEY, PKT_TIMEOUT_HEIGHT_ATTRIBUTE_KEY,
            PKT_TIMEOUT_TIMESTAMP_ATTRIBUTE_KEY, SEND_PACKET_EVENT, WRITE_ACK_EVENT,
        },
        height::{parse_revision_number, Height},
        packets::{types::Packet, utils::nanos_from_time},
    },
    primitives::{
        funcs::{
            MSG_ACKNOWLEDGEMENT_TYPE_URL, MSG_RECV_PACKET_TYPE_URL, MSG_TIMEOUT_TYPE_URL,
            MSG_UPDATE_CLIENT_TYPE_URL,
        },
        Chain, ClientStateInfo, ConnectionHandshake, ConnectionInfo, Header, IbcProvider,
        KeyProvider, TxResult, TxSearch,
    },
};
use ibc_proto::{
    google::protobuf::Any,
    ibc::core::{
        channel::v1::{MsgAcknowledgement, MsgRecvPacket, MsgTimeout},
        client::v1::MsgUpdateClient,
    },
};
use prost::Message;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tendermint::Time;

pub const MOCK_HEADER_TYPE_URL: &str = "/mock.Header";
pub const GENESIS_TIME: &str = "2022-10-19T09:00:00Z";
pub const BLOCK_TIME: Duration = Duration::from_secs(5);
pub const SUCCESS_ACK: &[u8] = br#"{"result":"AQ=="}"#;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MockHeader {
    pub chain_id: String,
    pub height: Height,
    pub time: Time,
}

/// One end of a channel as known to the chain it lives on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockChannel {
    pub port_id: String,
    pub channel_id: String,
    pub counterparty_port_id: String,
    pub counterparty_channel_id: String,
    pub connection_id: String,
}

#[derive(Clone, Debug)]
struct MockClient {
    chain_id: String,
    trusting_period: Duration,
    consensus_states: BTreeMap<Height, Time>,
}

impl MockClient {
    fn latest_height(&self) -> Height {
        self.consensus_states
            .keys()
            .next_back()
            .copied()
            .unwrap_or_default()
    }
}

type PacketKey = (String, String, u64);

#[derive(Clone, Debug)]
struct MockState {
    height: u64,
    time: Time,
    txs: Vec<TxResult>,
    clients: HashMap<String, MockClient>,
    connections: HashMap<String, ConnectionInfo>,
    channels: HashMap<(String, String), MockChannel>,
    next_sequence_send: HashMap<(String, String), u64>,
    /// (source port, source channel, seq) -> height
    commitments: HashMap<PacketKey, u64>,
    /// (destination port, destination channel, seq) -> height
    receipts: HashMap<PacketKey, u64>,
    /// (destination port, destination channel, seq) -> height
    acks: HashMap<PacketKey, u64>,
    acknowledged: Vec<u64>,
    timed_out: Vec<u64>,
    counter: u64,
    transient_failures: usize,
    forced_rejections: usize,
    raw_log_only: bool,
    /// Header served while the header node lags behind
    stalled_header: Option<(u64, Time)>,
    /// Served headers claim a time this far behind the block time
    header_time_skew: Duration,
    submitted: Vec<String>,
}

#[derive(Clone)]
pub struct MockChain {
    chain_id: String,
    revision_number: u64,
    block_max_weight: u64,
    state: Arc<Mutex<MockState>>,
}

impl MockChain {
    pub fn new(chain_id: &str) -> Self {
        let time = Time::parse_from_rfc3339(GENESIS_TIME).unwrap_or_else(|_| Time::unix_epoch());
        Self {
            chain_id: chain_id.to_string(),
            revision_number: parse_revision_number(chain_id),
            block_max_weight: 10,
            state: Arc::new(Mutex::new(MockState {
                height: 1,
                time,
                txs: vec![],
                clients: HashMap::new(),
                connections: HashMap::new(),
                channels: HashMap::new(),
                next_sequence_send: HashMap::new(),
                commitments: HashMap::new(),
                receipts: HashMap::new(),
                acks: HashMap::new(),
                acknowledged: vec![],
                timed_out: vec![],
                counter: 0,
                transient_failures: 0,
                forced_rejections: 0,
                raw_log_only: false,
                stalled_header: None,
                header_time_skew: Duration::ZERO,
                submitted: vec![],
            })),
        }
    }

    /// Max number of messages in one transaction.
    pub fn with_block_max_weight(mut self, block_max_weight: u64) -> Self {
        self.block_max_weight = block_max_weight;
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn height(&self, revision_height: u64) -> Height {
        Height::new(self.revision_number, revision_height)
    }

    pub fn latest_height(&self) -> Height {
        self.height(self.state().height)
    }

    pub fn now(&self) -> Time {
        self.state().time
    }

    /// Produces `blocks` empty blocks, `block_time` apart.
    pub fn advance(&self, blocks: u64, block_time: Duration) {
        let mut state = self.state();
        for _ in 0..blocks {
            state.height += 1;
            state.time = state.time.checked_add(block_time).unwrap_or(state.time);
        }
    }

    /// The next `n` submissions fail as if the node were unreachable.
    pub fn fail_next_submits(&self, n: usize) {
        self.state().transient_failures += n;
    }

    /// The next `n` submissions are refused as already relayed.
    pub fn reject_next_submits(&self, n: usize) {
        self.state().forced_rejections += n;
    }

    /// Headers stop at the current block until [`MockChain::resume_headers`], like a
    /// lagging header node.
    pub fn stall_headers(&self) {
        let mut state = self.state();
        state.stalled_header = Some((state.height, state.time));
    }

    pub fn resume_headers(&self) {
        self.state().stalled_header = None;
    }

    /// Headers carry a time `skew` earlier than the block they belong to.
    pub fn skew_header_time(&self, skew: Duration) {
        self.state().header_time_skew = skew;
    }

    /// Search results carry only the JSON log, like older nodes.
    pub fn set_raw_log_only(&self, raw_log_only: bool) {
        self.state().raw_log_only = raw_log_only;
    }

    /// Type urls of every message committed on this chain, in order.
    pub fn submitted_messages(&self) -> Vec<String> {
        self.state().submitted.clone()
    }

    pub fn count_submitted(&self, type_url: &str) -> usize {
        self.state()
            .submitted
            .iter()
            .filter(|url| url.as_str() == type_url)
            .count()
    }

    pub fn acknowledged_packets(&self) -> Vec<u64> {
        self.state().acknowledged.clone()
    }

    pub fn timed_out_packets(&self) -> Vec<u64> {
        self.state().timed_out.clone()
    }

    pub fn has_receipt(&self, port_id: &str, channel_id: &str, sequence: u64) -> bool {
        self.state()
            .receipts
            .contains_key(&(port_id.to_string(), channel_id.to_string(), sequence))
    }

    pub fn has_commitment(&self, port_id: &str, channel_id: &str, sequence: u64) -> bool {
        self.state()
            .commitments
            .contains_key(&(port_id.to_string(), channel_id.to_string(), sequence))
    }

    pub fn client_height(&self, client_id: &str) -> Option<Height> {
        self.state()
            .clients
            .get(client_id)
            .map(MockClient::latest_height)
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut state = self.state();
        let id = format!("{}-{}", prefix, state.counter);
        state.counter += 1;
        id
    }

    /// Creates a client of `tracked` on this chain from its latest header.
    pub fn create_client(&self, tracked: &MockChain, trusting_period: Duration) -> String {
        let id = self.next_id("07-tendermint");
        let (height, time) = (tracked.latest_height(), tracked.now());
        let mut state = self.state();
        state.clients.insert(
            id.clone(),
            MockClient {
                chain_id: tracked.chain_id.clone(),
                trusting_period,
                consensus_states: BTreeMap::from([(height, time)]),
            },
        );
        state.height += 1;
        id
    }

    fn add_connection(&self, connection_id: &str, connection: ConnectionInfo) {
        self.state()
            .connections
            .insert(connection_id.to_string(), connection);
    }

    pub fn add_channel(&self, channel: MockChannel) {
        self.state().channels.insert(
            (channel.port_id.clone(), channel.channel_id.clone()),
            channel,
        );
    }

    /// Commits a packet on `channel` and records its `send_packet` event in a new block.
    pub fn send_packet(
        &self,
        channel: &MockChannel,
        data: &[u8],
        timeout_height: Option<Height>,
        timeout_timestamp: Option<u64>,
    ) -> Packet {
        let mut state = self.state();
        let key = (channel.port_id.clone(), channel.channel_id.clone());
        let sequence = state.next_sequence_send.get(&key).copied().unwrap_or(1);
        state.next_sequence_send.insert(key, sequence + 1);
        let packet = Packet {
            sequence,
            source_port: channel.port_id.clone(),
            source_channel: channel.channel_id.clone(),
            destination_port: channel.counterparty_port_id.clone(),
            destination_channel: channel.counterparty_channel_id.clone(),
            data: data.to_vec(),
            timeout_height,
            timeout_timestamp,
        };
        let mut attributes = packet_attributes(&packet);
        attributes.push((PKT_CHANNEL_ORDERING_ATTRIBUTE_KEY.into(), "ORDER_UNORDERED".into()));
        attributes.push((PKT_CONNECTION_ATTRIBUTE_KEY.into(), channel.connection_id.clone()));

        state.height += 1;
        let height = state.height;
        state.commitments.insert(
            (packet.source_port.clone(), packet.source_channel.clone(), sequence),
            height,
        );
        let events = vec![
            Event::new("message", [("action", "send_packet")]),
            Event::new(SEND_PACKET_EVENT, attributes),
        ];
        push_tx(&mut state, events);
        packet
    }

    /// Records a transaction carrying `events` in a new block, bypassing any state checks.
    pub fn push_events(&self, events: Vec<Event>) -> TxResult {
        let mut state = self.state();
        state.height += 1;
        push_tx(&mut state, events)
    }

    fn client_for_channel<'s>(
        state: &'s MockState,
        port_id: &str,
        channel_id: &str,
    ) -> Result<(&'s MockChannel, &'s MockClient), String> {
        let channel = state
            .channels
            .get(&(port_id.to_string(), channel_id.to_string()))
            .ok_or_else(|| format!("channel {}/{} not found", port_id, channel_id))?;
        let connection = state
            .connections
            .get(&channel.connection_id)
            .ok_or_else(|| format!("connection {} not found", channel.connection_id))?;
        let client = state
            .clients
            .get(&connection.client_id)
            .ok_or_else(|| format!("client {} not found", connection.client_id))?;
        Ok((channel, client))
    }

    /// Applies one message to `state`. `Ok(None)` means the message was redundant.
    fn deliver(&self, state: &mut MockState, msg: &Any) -> Result<Option<Vec<Event>>, String> {
        let height = state.height + 1;
        match msg.type_url.as_str() {
            MSG_UPDATE_CLIENT_TYPE_URL => {
                let msg = MsgUpdateClient::decode(msg.value.as_slice()).map_err(|e| e.to_string())?;
                let header = msg.header.ok_or("missing header")?;
                if header.type_url != MOCK_HEADER_TYPE_URL {
                    return Err(format!("unsupported header {}", header.type_url));
                }
                let header: MockHeader =
                    serde_json::from_slice(&header.value).map_err(|e| e.to_string())?;
                let client = state
                    .clients
                    .get_mut(&msg.client_id)
                    .ok_or_else(|| format!("client {} not found", msg.client_id))?;
                if client.chain_id != header.chain_id {
                    return Err(format!("header of {} for a client of {}", header.chain_id, client.chain_id));
                }
                if client.consensus_states.contains_key(&header.height) {
                    return Ok(None);
                }
                client.consensus_states.insert(header.height, header.time);
                Ok(Some(vec![Event::new(
                    "update_client",
                    [
                        ("client_id", msg.client_id),
                        ("consensus_height", header.height.to_string()),
                    ],
                )]))
            }
            MSG_RECV_PACKET_TYPE_URL => {
                let msg = MsgRecvPacket::decode(msg.value.as_slice()).map_err(|e| e.to_string())?;
                let packet = Packet::from(msg.packet.ok_or("missing packet")?);
                let proof_height = Height::from(msg.proof_height.ok_or("missing proof height")?);
                let (channel, client) = Self::client_for_channel(
                    state,
                    &packet.destination_port,
                    &packet.destination_channel,
                )?;
                verify_proof(client, "commitment", &packet.source_port, &packet.source_channel, packet.sequence, proof_height, &msg.proof_commitment)?;
                let current = self.height(height);
                let elapsed_height = packet.timeout_height.map_or(false, |h| h <= current);
                let elapsed_time = packet
                    .timeout_timestamp
                    .map_or(false, |t| t <= nanos_from_time(&state.time));
                if elapsed_height || elapsed_time {
                    return Err("receive packet verification failed: packet timeout".into());
                }
                let connection_id = channel.connection_id.clone();
                let key = (
                    packet.destination_port.clone(),
                    packet.destination_channel.clone(),
                    packet.sequence,
                );
                if state.receipts.contains_key(&key) {
                    return Ok(None);
                }
                state.receipts.insert(key.clone(), height);
                state.acks.insert(key, height);

                let mut attributes = packet_attributes(&packet);
                attributes.push((PKT_CONNECTION_ATTRIBUTE_KEY.into(), connection_id));
                let mut ack_attributes = attributes.clone();
                ack_attributes.push((PKT_ACK_HEX_ATTRIBUTE_KEY.into(), hex::encode(SUCCESS_ACK)));
                Ok(Some(vec![
                    Event::new("recv_packet", attributes),
                    Event::new(WRITE_ACK_EVENT, ack_attributes),
                ]))
            }
            MSG_ACKNOWLEDGEMENT_TYPE_URL => {
                let msg =
                    MsgAcknowledgement::decode(msg.value.as_slice()).map_err(|e| e.to_string())?;
                let packet = Packet::from(msg.packet.ok_or("missing packet")?);
                let proof_height = Height::from(msg.proof_height.ok_or("missing proof height")?);
                let (_, client) =
                    Self::client_for_channel(state, &packet.source_port, &packet.source_channel)?;
                verify_proof(client, "ack", &packet.destination_port, &packet.destination_channel, packet.sequence, proof_height, &msg.proof_acked)?;
                let key = (packet.source_port.clone(), packet.source_channel.clone(), packet.sequence);
                if state.commitments.remove(&key).is_none() {
                    return Ok(None);
                }
                state.acknowledged.push(packet.sequence);
                Ok(Some(vec![Event::new("acknowledge_packet", packet_attributes(&packet))]))
            }
            MSG_TIMEOUT_TYPE_URL => {
                let msg = MsgTimeout::decode(msg.value.as_slice()).map_err(|e| e.to_string())?;
                let packet = Packet::from(msg.packet.ok_or("missing packet")?);
                let proof_height = Height::from(msg.proof_height.ok_or("missing proof height")?);
                let (_, client) =
                    Self::client_for_channel(state, &packet.source_port, &packet.source_channel)?;
                verify_proof(client, "receipt-absent", &packet.destination_port, &packet.destination_channel, packet.sequence, proof_height, &msg.proof_unreceived)?;
                let consensus_time = client.consensus_states[&proof_height];
                let elapsed_height = packet.timeout_height.map_or(false, |h| h <= proof_height);
                let elapsed_time = packet
                    .timeout_timestamp
                    .map_or(false, |t| t <= nanos_from_time(&consensus_time));
                if !elapsed_height && !elapsed_time {
                    return Err("packet timeout has not been reached".into());
                }
                let key = (packet.source_port.clone(), packet.source_channel.clone(), packet.sequence);
                if state.commitments.remove(&key).is_none() {
                    return Ok(None);
                }
                state.timed_out.push(packet.sequence);
                Ok(Some(vec![Event::new("timeout_packet", packet_attributes(&packet))]))
            }
            other => Err(format!("unknown message {}", other)),
        }
    }

    fn proof(&self, kind: &str, port_id: &str, channel_id: &str, sequence: u64, at: Height) -> Vec<u8> {
        proof_text(&self.chain_id, kind, port_id, channel_id, sequence, at).into_bytes()
    }

    /// State written at `written` is provable from the next height on, up to the latest one.
    fn check_provable(&self, state: &MockState, written: u64, at: Height) -> Result<(), Error> {
        if at.revision_number != self.revision_number
            || at.revision_height <= written
            || at.revision_height > state.height
        {
            return Err(Error::RpcError(format!(
                "no proof at {} for state written at {} on {}",
                at, written, self.chain_id
            )));
        }
        Ok(())
    }
}

fn packet_attributes(packet: &Packet) -> Vec<(String, String)> {
    vec![
        (PKT_DATA_HEX_ATTRIBUTE_KEY.into(), hex::encode(&packet.data)),
        (PKT_DST_CHANNEL_ATTRIBUTE_KEY.into(), packet.destination_channel.clone()),
        (PKT_DST_PORT_ATTRIBUTE_KEY.into(), packet.destination_port.clone()),
        (PKT_SEQ_ATTRIBUTE_KEY.into(), packet.sequence.to_string()),
        (PKT_SRC_CHANNEL_ATTRIBUTE_KEY.into(), packet.source_channel.clone()),
        (PKT_SRC_PORT_ATTRIBUTE_KEY.into(), packet.source_port.clone()),
        (
            PKT_TIMEOUT_HEIGHT_ATTRIBUTE_KEY.into(),
            packet.timeout_height.unwrap_or_default().to_string(),
        ),
        (
            PKT_TIMEOUT_TIMESTAMP_ATTRIBUTE_KEY.into(),
            packet.timeout_timestamp.unwrap_or_default().to_string(),
        ),
    ]
}

fn proof_text(chain_id: &str, kind: &str, port_id: &str, channel_id: &str, sequence: u64, at: Height) -> String {
    format!("{}:{}:{}/{}/{}@{}", kind, chain_id, port_id, channel_id, sequence, at)
}

fn verify_proof(
    client: &MockClient,
    kind: &str,
    port_id: &str,
    channel_id: &str,
    sequence: u64,
    proof_height: Height,
    proof: &[u8],
) -> Result<(), String> {
    if !client.consensus_states.contains_key(&proof_height) {
        return Err(format!("client has no consensus state at {}", proof_height));
    }
    let expected = proof_text(&client.chain_id, kind, port_id, channel_id, sequence, proof_height);
    if proof != expected.as_bytes() {
        return Err(format!("invalid {} proof", kind));
    }
    Ok(())
}

fn push_tx(state: &mut MockState, events: Vec<Event>) -> TxResult {
    state.counter += 1;
    let tx = TxResult {
        hash: format!("{:064X}", state.counter),
        height: state.height,
        events,
        raw_log: String::new(),
    };
    state.txs.push(tx.clone());
    tx
}

#[async_trait::async_trait]
impl Chain for MockChain {
    fn name(&self) -> &str {
        &self.chain_id
    }

    fn chain_id(&self) -> &str {
        &self.chain_id
    }

    fn block_max_weight(&self) -> u64 {
        self.block_max_weight
    }

    async fn estimate_weight(&self, msgs: Vec<Any>) -> Result<u64, Error> {
        Ok(msgs.len() as u64)
    }

    async fn submit(&self, messages: Vec<Any>) -> Result<TxResult, Error> {
        let mut state = self.state();
        if state.transient_failures > 0 {
            state.transient_failures -= 1;
            return Err(Error::ChainSubmit {
                chain: self.chain_id.clone(),
                reason: "connection refused".into(),
            });
        }
        if state.forced_rejections > 0 {
            state.forced_rejections -= 1;
            return Err(Error::from_tx_failure(&self.chain_id, 21, "packet messages are redundant"));
        }
        if messages.len() as u64 > self.block_max_weight {
            return Err(Error::from_tx_failure(&self.chain_id, 11, "out of gas"));
        }

        let mut next = state.clone();
        let mut events = vec![];
        let mut redundant = 0;
        for msg in &messages {
            match self.deliver(&mut next, msg) {
                Ok(Some(emitted)) => events.extend(emitted),
                Ok(None) => redundant += 1,
                Err(log) => {
                    return Err(Error::from_tx_failure(
                        &self.chain_id,
                        1,
                        &format!("failed to execute message; message index: 0: {}", log),
                    ))
                }
            }
        }
        if redundant == messages.len() {
            return Err(Error::from_tx_failure(&self.chain_id, 21, "packet messages are redundant"));
        }
        next.submitted
            .extend(messages.iter().map(|msg| msg.type_url.clone()));
        next.height += 1;
        next.time = next.time.checked_add(BLOCK_TIME).unwrap_or(next.time);
        let tx = push_tx(&mut next, events);
        *state = next;
        Ok(tx)
    }
}

#[async_trait::async_trait]
impl IbcProvider for MockChain {
    async fn latest_height_and_timestamp(&self) -> Result<(Height, Time), Error> {
        let state = self.state();
        Ok((self.height(state.height), state.time))
    }

    async fn search_txs(&self, search: TxSearch) -> Result<Vec<TxResult>, Error> {
        let state = self.state();
        let txs = state
            .txs
            .iter()
            .filter(|tx| tx.height >= search.min_height && tx.height <= search.max_height)
            .filter(|tx| {
                tx.events.iter().any(|event| {
                    event.kind == search.event_kind
                        && event.attribute(PKT_CONNECTION_ATTRIBUTE_KEY)
                            == Some(search.connection_id.as_str())
                })
            })
            .cloned()
            .map(|tx| -> Result<TxResult, Error> {
                if !state.raw_log_only {
                    return Ok(tx);
                }
                let log = vec![TxLog {
                    msg_index: 0,
                    log: String::new(),
                    events: tx.events,
                }];
                Ok(TxResult {
                    events: vec![],
                    raw_log: serde_json::to_string(&log)?,
                    ..tx
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(txs)
    }

    async fn query_connection(&self, connection_id: &str) -> Result<ConnectionInfo, Error> {
        self.state()
            .connections
            .get(connection_id)
            .cloned()
            .ok_or_else(|| Error::RpcError(format!("connection {} not found", connection_id)))
    }

    async fn query_client_state(&self, client_id: &str) -> Result<ClientStateInfo, Error> {
        let state = self.state();
        let client = state
            .clients
            .get(client_id)
            .ok_or_else(|| Error::RpcError(format!("client {} not found", client_id)))?;
        Ok(ClientStateInfo {
            chain_id: client.chain_id.clone(),
            latest_height: client.latest_height(),
            trusting_period: client.trusting_period,
        })
    }

    async fn query_consensus_state_time(&self, client_id: &str, height: Height) -> Result<Time, Error> {
        self.state()
            .clients
            .get(client_id)
            .and_then(|client| client.consensus_states.get(&height).copied())
            .ok_or_else(|| {
                Error::RpcError(format!("no consensus state for {} at {}", client_id, height))
            })
    }

    async fn query_header(&self, _trusted_height: Height) -> Result<Header, Error> {
        let (height, time) = {
            let state = self.state();
            let (height, time) = state.stalled_header.unwrap_or((state.height, state.time));
            (height, time.checked_sub(state.header_time_skew).unwrap_or(time))
        };
        let header = MockHeader {
            chain_id: self.chain_id.clone(),
            height: self.height(height),
            time,
        };
        Ok(Header {
            height: header.height,
            time: header.time,
            value: Any {
                type_url: MOCK_HEADER_TYPE_URL.to_string(),
                value: serde_json::to_vec(&header)?,
            },
        })
    }

    async fn query_packet_commitments(
        &self,
        port_id: &str,
        channel_id: &str,
        seqs: Vec<u64>,
    ) -> Result<Vec<u64>, Error> {
        let state = self.state();
        Ok(seqs
            .into_iter()
            .filter(|seq| {
                state
                    .commitments
                    .contains_key(&(port_id.to_string(), channel_id.to_string(), *seq))
            })
            .collect())
    }

    async fn query_unreceived_packets(
        &self,
        port_id: &str,
        channel_id: &str,
        seqs: Vec<u64>,
    ) -> Result<Vec<u64>, Error> {
        let state = self.state();
        Ok(seqs
            .into_iter()
            .filter(|seq| {
                !state
                    .receipts
                    .contains_key(&(port_id.to_string(), channel_id.to_string(), *seq))
            })
            .collect())
    }

    async fn query_unreceived_acknowledgements(
        &self,
        port_id: &str,
        channel_id: &str,
        seqs: Vec<u64>,
    ) -> Result<Vec<u64>, Error> {
        self.query_packet_commitments(port_id, channel_id, seqs).await
    }

    async fn query_packet_commitment_proof(&self, packet: &Packet, at: Height) -> Result<Vec<u8>, Error> {
        let state = self.state();
        let written = state
            .commitments
            .get(&(packet.source_port.clone(), packet.source_channel.clone(), packet.sequence))
            .copied()
            .ok_or_else(|| Error::RpcError(format!("packet commitment {} not found", packet.sequence)))?;
        self.check_provable(&state, written, at)?;
        Ok(self.proof("commitment", &packet.source_port, &packet.source_channel, packet.sequence, at))
    }

    async fn query_packet_acknowledgement_proof(
        &self,
        packet: &Packet,
        at: Height,
    ) -> Result<Vec<u8>, Error> {
        let state = self.state();
        let written = state
            .acks
            .get(&(
                packet.destination_port.clone(),
                packet.destination_channel.clone(),
                packet.sequence,
            ))
            .copied()
            .ok_or_else(|| Error::RpcError(format!("acknowledgement {} not found", packet.sequence)))?;
        self.check_provable(&state, written, at)?;
        Ok(self.proof("ack", &packet.destination_port, &packet.destination_channel, packet.sequence, at))
    }

    async fn query_packet_receipt_proof(
        &self,
        packet: &Packet,
        at: Height,
    ) -> Result<(Vec<u8>, u64), Error> {
        let state = self.state();
        let key = (
            packet.destination_port.clone(),
            packet.destination_channel.clone(),
            packet.sequence,
        );
        if state.receipts.contains_key(&key) {
            return Err(Error::RpcError(format!("packet {} was received", packet.sequence)));
        }
        self.check_provable(&state, 0, at)?;
        let proof = self.proof(
            "receipt-absent",
            &packet.destination_port,
            &packet.destination_channel,
            packet.sequence,
            at,
        );
        Ok((proof, 1))
    }
}

impl KeyProvider for MockChain {
    fn account_id(&self) -> String {
        format!("{}-relayer", self.chain_id)
    }
}

/// Creates a client of the counterparty on each chain and a connection on top of them.
#[derive(Clone, Debug, Default)]
pub struct MockHandshake {
    pub fail: bool,
    pub trusting_period: Option<Duration>,
}

#[async_trait::async_trait]
impl ConnectionHandshake<MockChain, MockChain> for MockHandshake {
    async fn create_connection_pair(
        &self,
        chain_a: &MockChain,
        chain_b: &MockChain,
    ) -> Result<(String, String), Error> {
        if self.fail {
            return Err(Error::Handshake {
                chain_a: chain_a.chain_id.clone(),
                chain_b: chain_b.chain_id.clone(),
                reason: "connection open try refused".into(),
            });
        }
        let trusting_period = self
            .trusting_period
            .unwrap_or(Duration::from_secs(14 * 86400));
        let client_a = chain_a.create_client(chain_b, trusting_period);
        let client_b = chain_b.create_client(chain_a, trusting_period);
        let connection_a = chain_a.next_id("connection");
        let connection_b = chain_b.next_id("connection");
        chain_a.add_connection(
            &connection_a,
            ConnectionInfo {
                client_id: client_a.clone(),
                counterparty_client_id: client_b.clone(),
                counterparty_connection_id: connection_b.clone(),
            },
        );
        chain_b.add_connection(
            &connection_b,
            ConnectionInfo {
                client_id: client_b,
                counterparty_client_id: client_a,
                counterparty_connection_id: connection_a.clone(),
            },
        );
        Ok((connection_a, connection_b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn raw_log_search_round_trips_events() {
        let chain = MockChain::new("juno-1");
        let channel = MockChannel {
            port_id: "transfer".into(),
            channel_id: "channel-0".into(),
            counterparty_port_id: "transfer".into(),
            counterparty_channel_id: "channel-5".into(),
            connection_id: "connection-0".into(),
        };
        chain.add_channel(channel.clone());
        let packet = chain.send_packet(&channel, b"{}", Some(Height::new(2, 50)), None);
        assert_eq!(packet.sequence, 1);
        chain.set_raw_log_only(true);

        let search = TxSearch {
            event_kind: SEND_PACKET_EVENT.into(),
            connection_id: "connection-0".into(),
            min_height: 0,
            max_height: 100,
        };
        let txs = chain.search_txs(search.clone()).await.unwrap();
        assert_eq!(txs.len(), 1);
        assert!(txs[0].events.is_empty());
        let logs = crate::core::events::parse_raw_log(&txs[0].raw_log).unwrap();
        assert_eq!(
            crate::core::events::parse_packets_from_logs(&logs).unwrap(),
            vec![packet]
        );

        let other = TxSearch {
            connection_id: "connection-1".into(),
            ..search
        };
        assert!(chain.search_txs(other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn submit_failures_are_classified() {
        let chain = MockChain::new("juno-1");
        chain.fail_next_submits(1);
        chain.reject_next_submits(1);
        let msg = Any {
            type_url: "/unknown".into(),
            value: vec![],
        };
        assert!(chain.submit(vec![msg.clone()]).await.unwrap_err().is_transient());
        assert!(chain.submit(vec![msg.clone()]).await.unwrap_err().is_reject());
        // unknown messages fail the transaction
        assert!(chain.submit(vec![msg]).await.unwrap_err().is_transient());
        assert!(chain.submitted_messages().is_empty());
    }
}
