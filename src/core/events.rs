//! Extraction of typed packets and acknowledgements from chain events.
//!
//! Attribute keys and values are untrusted input: raw bytes are decoded lossily and
//! never cause a panic. A `send_packet` or `write_acknowledgement` event that lacks a
//! required attribute is reported as [`Error::Parse`] with the event's index.

use crate::core::{
    error::Error,
    height::parse_height_attribute,
    packets::types::{Ack, Packet, SendPacketEvent},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use subtle_encoding::base64;

pub const SEND_PACKET_EVENT: &str = "send_packet";
pub const WRITE_ACK_EVENT: &str = "write_acknowledgement";

pub const PKT_SEQ_ATTRIBUTE_KEY: &str = "packet_sequence";
pub const PKT_DATA_ATTRIBUTE_KEY: &str = "packet_data";
pub const PKT_DATA_HEX_ATTRIBUTE_KEY: &str = "packet_data_hex";
pub const PKT_SRC_PORT_ATTRIBUTE_KEY: &str = "packet_src_port";
pub const PKT_SRC_CHANNEL_ATTRIBUTE_KEY: &str = "packet_src_channel";
pub const PKT_DST_PORT_ATTRIBUTE_KEY: &str = "packet_dst_port";
pub const PKT_DST_CHANNEL_ATTRIBUTE_KEY: &str = "packet_dst_channel";
pub const PKT_TIMEOUT_HEIGHT_ATTRIBUTE_KEY: &str = "packet_timeout_height";
pub const PKT_TIMEOUT_TIMESTAMP_ATTRIBUTE_KEY: &str = "packet_timeout_timestamp";
pub const PKT_CHANNEL_ORDERING_ATTRIBUTE_KEY: &str = "packet_channel_ordering";
pub const PKT_CONNECTION_ATTRIBUTE_KEY: &str = "packet_connection";
pub const PKT_ACK_ATTRIBUTE_KEY: &str = "packet_ack";
pub const PKT_ACK_HEX_ATTRIBUTE_KEY: &str = "packet_ack_hex";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAttribute {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// A chain event with UTF-8 attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Vec<EventAttribute>,
}

impl Event {
    pub fn new<K, V>(kind: impl Into<String>, attributes: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            kind: kind.into(),
            attributes: attributes
                .into_iter()
                .map(|(key, value)| EventAttribute {
                    key: key.into(),
                    value: value.into(),
                })
                .collect(),
        }
    }

    /// Value of the last attribute named `key`.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .rev()
            .find(|attribute| attribute.key == key)
            .map(|attribute| attribute.value.as_str())
    }
}

/// Event attribute exactly as delivered by a node, before any text decoding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawEventAttribute {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: String,
    pub attributes: Vec<RawEventAttribute>,
}

/// Decodes every key and value as UTF-8, replacing invalid sequences with U+FFFD.
pub fn stringify_event(event: &RawEvent) -> Event {
    Event {
        kind: event.kind.clone(),
        attributes: event
            .attributes
            .iter()
            .map(|attribute| EventAttribute {
                key: String::from_utf8_lossy(&attribute.key).into_owned(),
                value: String::from_utf8_lossy(&attribute.value).into_owned(),
            })
            .collect(),
    }
}

impl From<&RawEvent> for Event {
    fn from(event: &RawEvent) -> Self {
        stringify_event(event)
    }
}

/// Tendermint 0.34 nodes base64 encode attribute keys and values.
pub fn decode_base64_event(index: usize, event: &Event) -> Result<Event, Error> {
    let attributes = event
        .attributes
        .iter()
        .map(|attribute| {
            let key = base64::decode(attribute.key.as_bytes())
                .map_err(|e| Error::parse(index, &attribute.key, format!("is not base64: {}", e)))?;
            let value = base64::decode(attribute.value.as_bytes()).map_err(|e| {
                Error::parse(index, &attribute.key, format!("has a non-base64 value: {}", e))
            })?;
            Ok(RawEventAttribute { key, value })
        })
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(stringify_event(&RawEvent {
        kind: event.kind.clone(),
        attributes,
    }))
}

/// One message's worth of events in a transaction log.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxLog {
    #[serde(default)]
    pub msg_index: u32,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Parses the JSON `raw_log` of a successful transaction.
pub fn parse_raw_log(raw: &str) -> Result<Vec<TxLog>, Error> {
    if raw.trim().is_empty() {
        return Ok(vec![]);
    }
    serde_json::from_str(raw).map_err(|e| Error::InvalidLog(format!("{}: {}", e, raw)))
}

/// Events of every message in the log, in message order.
pub fn flatten_logs(logs: &[TxLog]) -> Vec<Event> {
    logs.iter()
        .flat_map(|log| log.events.iter().cloned())
        .collect()
}

/// Attributes of a single event, last occurrence of a key wins.
struct Attributes<'a> {
    index: usize,
    values: HashMap<&'a str, &'a str>,
}

impl<'a> Attributes<'a> {
    fn new(index: usize, event: &'a Event) -> Self {
        let values = event
            .attributes
            .iter()
            .map(|attribute| (attribute.key.as_str(), attribute.value.as_str()))
            .collect();
        Self { index, values }
    }

    fn optional(&self, key: &str) -> Option<&'a str> {
        self.values.get(key).copied()
    }

    fn required(&self, key: &str) -> Result<&'a str, Error> {
        self.optional(key)
            .ok_or_else(|| Error::missing_attribute(self.index, key))
    }

    fn u64(&self, key: &str) -> Result<u64, Error> {
        let raw = self.required(key)?;
        raw.parse()
            .map_err(|_| Error::parse(self.index, key, format!("is not an integer: {:?}", raw)))
    }

    fn bytes(&self, hex_key: &str, text_key: &str) -> Result<Vec<u8>, Error> {
        match (self.optional(hex_key), self.optional(text_key)) {
            (Some(encoded), _) => hex::decode(encoded)
                .map_err(|e| Error::parse(self.index, hex_key, format!("is not hex: {}", e))),
            (None, Some(text)) => Ok(text.as_bytes().to_vec()),
            (None, None) => Err(Error::missing_attribute(self.index, hex_key)),
        }
    }

    fn packet(&self) -> Result<Packet, Error> {
        let sequence = self.u64(PKT_SEQ_ATTRIBUTE_KEY)?;
        let source_port = self.required(PKT_SRC_PORT_ATTRIBUTE_KEY)?.to_string();
        let source_channel = self.required(PKT_SRC_CHANNEL_ATTRIBUTE_KEY)?.to_string();
        let destination_port = self.required(PKT_DST_PORT_ATTRIBUTE_KEY)?.to_string();
        let destination_channel = self.required(PKT_DST_CHANNEL_ATTRIBUTE_KEY)?.to_string();
        let data = self.bytes(PKT_DATA_HEX_ATTRIBUTE_KEY, PKT_DATA_ATTRIBUTE_KEY)?;
        let timeout_height =
            parse_height_attribute(Some(self.required(PKT_TIMEOUT_HEIGHT_ATTRIBUTE_KEY)?));
        let timeout_timestamp = match self.u64(PKT_TIMEOUT_TIMESTAMP_ATTRIBUTE_KEY)? {
            0 => None,
            nanos => Some(nanos),
        };
        Ok(Packet {
            sequence,
            source_port,
            source_channel,
            destination_port,
            destination_channel,
            data,
            timeout_height,
            timeout_timestamp,
        })
    }
}

fn expect_kind(index: usize, event: &Event, kind: &str) -> Result<(), Error> {
    if event.kind == kind {
        Ok(())
    } else {
        Err(Error::parse(
            index,
            "type",
            format!("is {:?}, expected {:?}", event.kind, kind),
        ))
    }
}

pub fn parse_send_packet_event(index: usize, event: &Event) -> Result<SendPacketEvent, Error> {
    expect_kind(index, event, SEND_PACKET_EVENT)?;
    let attributes = Attributes::new(index, event);
    let channel_ordering = attributes
        .required(PKT_CHANNEL_ORDERING_ATTRIBUTE_KEY)?
        .to_string();
    let connection_id = attributes.required(PKT_CONNECTION_ATTRIBUTE_KEY)?.to_string();
    Ok(SendPacketEvent {
        packet: attributes.packet()?,
        connection_id,
        channel_ordering,
    })
}

pub fn parse_write_ack_event(index: usize, event: &Event) -> Result<Ack, Error> {
    expect_kind(index, event, WRITE_ACK_EVENT)?;
    let attributes = Attributes::new(index, event);
    Ok(Ack {
        original_packet: attributes.packet()?,
        acknowledgement: attributes.bytes(PKT_ACK_HEX_ATTRIBUTE_KEY, PKT_ACK_ATTRIBUTE_KEY)?,
    })
}

/// All `send_packet` events in order, with their connection and ordering.
pub fn parse_send_packet_events(events: &[Event]) -> Result<Vec<SendPacketEvent>, Error> {
    events
        .iter()
        .enumerate()
        .filter(|(_, event)| event.kind == SEND_PACKET_EVENT)
        .map(|(index, event)| parse_send_packet_event(index, event))
        .collect()
}

pub fn parse_packets_from_events(events: &[Event]) -> Result<Vec<Packet>, Error> {
    Ok(parse_send_packet_events(events)?
        .into_iter()
        .map(|event| event.packet)
        .collect())
}

/// Same as [`parse_packets_from_events`] over the events of every message in the log.
pub fn parse_packets_from_logs(logs: &[TxLog]) -> Result<Vec<Packet>, Error> {
    parse_packets_from_events(&flatten_logs(logs))
}

pub fn parse_acks_from_events(events: &[Event]) -> Result<Vec<Ack>, Error> {
    events
        .iter()
        .enumerate()
        .filter(|(_, event)| event.kind == WRITE_ACK_EVENT)
        .map(|(index, event)| parse_write_ack_event(index, event))
        .collect()
}

pub fn parse_acks_from_logs(logs: &[TxLog]) -> Result<Vec<Ack>, Error> {
    parse_acks_from_events(&flatten_logs(logs))
}
