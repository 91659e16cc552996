use crate::core::height::Height;
use ibc_proto::ibc::core::channel::v1::Packet as RawPacket;
use serde::{Deserialize, Serialize};

/// An in-flight IBC packet as emitted by a `send_packet` event. Relay state lives
/// outside the packet.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    /// Packet sequence
    pub sequence: u64,
    /// Source port
    pub source_port: String,
    /// Source channel
    pub source_channel: String,
    /// Destination port
    pub destination_port: String,
    /// Destination channel
    pub destination_channel: String,
    /// Opaque packet data
    pub data: Vec<u8>,
    /// Timeout height, `None` when the packet has no height timeout
    pub timeout_height: Option<Height>,
    /// Timeout timestamp in nanoseconds, `None` when the packet has no time timeout
    pub timeout_timestamp: Option<u64>,
}

impl From<Packet> for RawPacket {
    fn from(packet: Packet) -> Self {
        RawPacket {
            sequence: packet.sequence,
            source_port: packet.source_port,
            source_channel: packet.source_channel,
            destination_port: packet.destination_port,
            destination_channel: packet.destination_channel,
            data: packet.data,
            timeout_height: packet.timeout_height.map(Into::into),
            timeout_timestamp: packet.timeout_timestamp.unwrap_or_default(),
        }
    }
}

impl From<RawPacket> for Packet {
    fn from(raw: RawPacket) -> Self {
        Packet {
            sequence: raw.sequence,
            source_port: raw.source_port,
            source_channel: raw.source_channel,
            destination_port: raw.destination_port,
            destination_channel: raw.destination_channel,
            data: raw.data,
            timeout_height: raw
                .timeout_height
                .and_then(|height| Height::from(height).into_timeout()),
            timeout_timestamp: (raw.timeout_timestamp != 0).then_some(raw.timeout_timestamp),
        }
    }
}

/// Acknowledgement written on the chain that received `original_packet`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub original_packet: Packet,
    pub acknowledgement: Vec<u8>,
}

/// A parsed `send_packet` event with the extra routing attributes it carries.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SendPacketEvent {
    pub packet: Packet,
    pub connection_id: String,
    pub channel_ordering: String,
}

/// Packet together with the height at which its `send_packet` event was emitted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PacketWithMetadata {
    pub packet: Packet,
    pub height: u64,
}

/// Acknowledgement together with the height at which it was written.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AckWithMetadata {
    pub ack: Ack,
    pub height: u64,
}
