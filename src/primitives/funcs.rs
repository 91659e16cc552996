use super::traits::{Chain, Header};
use crate::core::{
    error::Error,
    height::Height,
    packets::types::{AckWithMetadata, Packet, PacketWithMetadata},
};
use ibc_proto::{
    google::protobuf::Any,
    ibc::core::{
        channel::v1::{MsgAcknowledgement, MsgRecvPacket, MsgTimeout},
        client::v1::MsgUpdateClient,
    },
};
use prost::Message;
use std::collections::{BTreeMap, HashSet};

pub const MSG_RECV_PACKET_TYPE_URL: &str = "/ibc.core.channel.v1.MsgRecvPacket";
pub const MSG_ACKNOWLEDGEMENT_TYPE_URL: &str = "/ibc.core.channel.v1.MsgAcknowledgement";
pub const MSG_TIMEOUT_TYPE_URL: &str = "/ibc.core.channel.v1.MsgTimeout";
pub const MSG_UPDATE_CLIENT_TYPE_URL: &str = "/ibc.core.client.v1.MsgUpdateClient";

type ChannelKey = (String, String);

/// Groups sequences by channel, keeping the first-seen order of packets intact for later
/// filtering.
fn sequences_by_channel<'a>(
    packets: impl Iterator<Item = (&'a Packet, ChannelKey)>,
) -> BTreeMap<ChannelKey, Vec<u64>> {
    let mut groups: BTreeMap<ChannelKey, Vec<u64>> = BTreeMap::new();
    for (packet, key) in packets {
        groups.entry(key).or_default().push(packet.sequence);
    }
    groups
}

fn source_key(packet: &Packet) -> ChannelKey {
    (packet.source_port.clone(), packet.source_channel.clone())
}

fn destination_key(packet: &Packet) -> ChannelKey {
    (packet.destination_port.clone(), packet.destination_channel.clone())
}

/// Keeps the packets whose commitment still exists on `source`, the chain that sent them.
/// A cleared commitment means the packet was acknowledged or timed out. Order is preserved.
pub async fn query_committed_packets(
    source: &impl Chain,
    packets: Vec<PacketWithMetadata>,
) -> Result<Vec<PacketWithMetadata>, Error> {
    if packets.is_empty() {
        return Ok(packets);
    }
    let mut committed = HashSet::new();
    for ((port_id, channel_id), seqs) in
        sequences_by_channel(packets.iter().map(|p| (&p.packet, source_key(&p.packet))))
    {
        for seq in source
            .query_packet_commitments(&port_id, &channel_id, seqs)
            .await?
        {
            committed.insert((port_id.clone(), channel_id.clone(), seq));
        }
    }
    Ok(packets
        .into_iter()
        .filter(|p| {
            let (port_id, channel_id) = source_key(&p.packet);
            committed.contains(&(port_id, channel_id, p.packet.sequence))
        })
        .collect())
}

/// Keeps the packets `sink` has no receipt for. Order is preserved.
pub async fn query_unreceived_packets(
    sink: &impl Chain,
    packets: Vec<PacketWithMetadata>,
) -> Result<Vec<PacketWithMetadata>, Error> {
    if packets.is_empty() {
        return Ok(packets);
    }
    let mut unreceived = HashSet::new();
    for ((port_id, channel_id), seqs) in
        sequences_by_channel(packets.iter().map(|p| (&p.packet, destination_key(&p.packet))))
    {
        for seq in sink
            .query_unreceived_packets(&port_id, &channel_id, seqs)
            .await?
        {
            unreceived.insert((port_id.clone(), channel_id.clone(), seq));
        }
    }
    Ok(packets
        .into_iter()
        .filter(|p| {
            let (port_id, channel_id) = destination_key(&p.packet);
            unreceived.contains(&(port_id, channel_id, p.packet.sequence))
        })
        .collect())
}

/// Keeps the acknowledgements that `source`, the chain which sent the original packets,
/// has not processed yet.
pub async fn query_undelivered_acks(
    source: &impl Chain,
    acks: Vec<AckWithMetadata>,
) -> Result<Vec<AckWithMetadata>, Error> {
    if acks.is_empty() {
        return Ok(acks);
    }
    let mut unreceived = HashSet::new();
    for ((port_id, channel_id), seqs) in sequences_by_channel(
        acks.iter()
            .map(|a| (&a.ack.original_packet, source_key(&a.ack.original_packet))),
    ) {
        for seq in source
            .query_unreceived_acknowledgements(&port_id, &channel_id, seqs)
            .await?
        {
            unreceived.insert((port_id.clone(), channel_id.clone(), seq));
        }
    }
    Ok(acks
        .into_iter()
        .filter(|a| {
            let (port_id, channel_id) = source_key(&a.ack.original_packet);
            unreceived.contains(&(port_id, channel_id, a.ack.original_packet.sequence))
        })
        .collect())
}

pub fn recv_packet_message(
    packet: Packet,
    proof_commitment: Vec<u8>,
    proof_height: Height,
    signer: String,
) -> Any {
    let msg = MsgRecvPacket {
        packet: Some(packet.into()),
        proof_commitment,
        proof_height: Some(proof_height.into()),
        signer,
    };
    Any {
        type_url: MSG_RECV_PACKET_TYPE_URL.to_string(),
        value: msg.encode_to_vec(),
    }
}

pub fn acknowledgement_message(
    packet: Packet,
    acknowledgement: Vec<u8>,
    proof_acked: Vec<u8>,
    proof_height: Height,
    signer: String,
) -> Any {
    let msg = MsgAcknowledgement {
        packet: Some(packet.into()),
        acknowledgement,
        proof_acked,
        proof_height: Some(proof_height.into()),
        signer,
    };
    Any {
        type_url: MSG_ACKNOWLEDGEMENT_TYPE_URL.to_string(),
        value: msg.encode_to_vec(),
    }
}

pub fn timeout_message(
    packet: Packet,
    proof_unreceived: Vec<u8>,
    next_sequence_recv: u64,
    proof_height: Height,
    signer: String,
) -> Any {
    let msg = MsgTimeout {
        packet: Some(packet.into()),
        proof_unreceived,
        proof_height: Some(proof_height.into()),
        next_sequence_recv,
        signer,
    };
    Any {
        type_url: MSG_TIMEOUT_TYPE_URL.to_string(),
        value: msg.encode_to_vec(),
    }
}

pub fn update_client_message(client_id: &str, header: Header, signer: String) -> Any {
    let msg = MsgUpdateClient {
        client_id: client_id.to_string(),
        header: Some(header.value),
        signer,
    };
    Any {
        type_url: MSG_UPDATE_CLIENT_TYPE_URL.to_string(),
        value: msg.encode_to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recv_packet_message_keeps_packet_and_proof() {
        let packet = Packet {
            sequence: 9,
            source_port: "transfer".into(),
            source_channel: "channel-0".into(),
            destination_port: "transfer".into(),
            destination_channel: "channel-3".into(),
            data: b"{}".to_vec(),
            timeout_height: Some(Height::new(1, 90)),
            timeout_timestamp: None,
        };
        let any = recv_packet_message(
            packet.clone(),
            vec![1, 2, 3],
            Height::new(1, 20),
            "relayer".into(),
        );
        assert_eq!(any.type_url, MSG_RECV_PACKET_TYPE_URL);
        let msg = MsgRecvPacket::decode(any.value.as_slice()).unwrap();
        assert_eq!(Packet::from(msg.packet.unwrap()), packet);
        assert_eq!(msg.proof_commitment, vec![1, 2, 3]);
        assert_eq!(Height::from(msg.proof_height.unwrap()), Height::new(1, 20));
        assert_eq!(msg.signer, "relayer");
    }
}
