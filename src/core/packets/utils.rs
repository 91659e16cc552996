use super::types::{Packet, PacketWithMetadata};
use crate::core::height::Height;
use tendermint::Time;

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Is `candidate` strictly greater than `reference`? An absent candidate means
/// "no timeout" and is always greater.
pub fn height_greater(candidate: Option<&Height>, reference: &Height) -> bool {
    match candidate {
        None => true,
        Some(candidate) => candidate > reference,
    }
}

/// Is the nanosecond timestamp `candidate` strictly later than `reference` seconds?
/// An absent candidate is always greater. Equality is not greater: a timeout
/// is exclusive.
pub fn time_greater(candidate: Option<u64>, reference: u64) -> bool {
    match candidate {
        None => true,
        Some(candidate) => candidate as u128 > reference as u128 * NANOS_PER_SECOND,
    }
}

/// Whole seconds since the unix epoch, clamped at zero.
pub fn seconds_from_time(time: &Time) -> u64 {
    u64::try_from(time.unix_timestamp()).unwrap_or_default()
}

/// Nanoseconds since the unix epoch, clamped at zero.
pub fn nanos_from_time(time: &Time) -> u64 {
    u64::try_from(time.unix_timestamp_nanos()).unwrap_or_default()
}

/// A packet is expired once every timeout axis it carries has elapsed on the
/// destination chain. Packets without any timeout never expire, and a packet with
/// both axes stays pending while either one is still open.
pub fn is_expired(packet: &Packet, current_height: &Height, current_time: u64) -> bool {
    let timeout_height = packet.timeout_height.filter(|height| !height.is_zero());
    let timeout_timestamp = packet.timeout_timestamp.filter(|nanos| *nanos != 0);
    match (timeout_height, timeout_timestamp) {
        (None, None) => false,
        (height, timestamp) => {
            let height_elapsed = height
                .map(|height| !height_greater(Some(&height), current_height))
                .unwrap_or(true);
            let time_elapsed = timestamp
                .map(|nanos| !time_greater(Some(nanos), current_time))
                .unwrap_or(true);
            height_elapsed && time_elapsed
        }
    }
}

/// Splits packets into those still relayable and those that can only be timed out,
/// preserving order within each group.
pub fn split_expired(
    packets: Vec<PacketWithMetadata>,
    current_height: &Height,
    current_time: u64,
) -> (Vec<PacketWithMetadata>, Vec<PacketWithMetadata>) {
    packets
        .into_iter()
        .partition(|p| !is_expired(&p.packet, current_height, current_time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nanos(time: &str) -> u64 {
        nanos_from_time(&Time::parse_from_rfc3339(time).unwrap())
    }

    fn secs(time: &str) -> u64 {
        seconds_from_time(&Time::parse_from_rfc3339(time).unwrap())
    }

    fn packet(timeout_height: Option<Height>, timeout_timestamp: Option<u64>) -> Packet {
        Packet {
            sequence: 1,
            source_port: "transfer".into(),
            source_channel: "channel-0".into(),
            destination_port: "transfer".into(),
            destination_channel: "channel-7".into(),
            data: b"{}".to_vec(),
            timeout_height,
            timeout_timestamp,
        }
    }

    #[test]
    fn time_based_timeouts_properly() {
        let time1 = "2021-03-12T12:34:56.123456789Z";
        let time2 = "2021-03-12T12:36:56.543543543Z";
        let time3 = "2021-03-12T12:36:13Z";

        assert!(time_greater(None, secs(time1)));
        assert!(time_greater(Some(nanos(time2)), secs(time1)));
        assert!(!time_greater(Some(nanos(time1)), secs(time2)));

        // nanoseconds beat seconds if present
        assert!(time_greater(Some(nanos(time1)), secs(time1)));
        assert!(!time_greater(Some(nanos(time3)), secs(time3)));
    }

    #[test]
    fn height_based_timeouts_properly() {
        let height1a = Height::new(1, 12345);
        let height1b = Height::new(1, 14000);
        let height2a = Height::new(2, 600);

        assert!(height_greater(Some(&height1b), &height1a));
        assert!(height_greater(Some(&height2a), &height1b));
        assert!(height_greater(None, &height2a));

        assert!(!height_greater(Some(&height1b), &height1b));
        assert!(!height_greater(Some(&height1a), &height1b));
    }

    #[test]
    fn packets_without_timeouts_never_expire() {
        let current = Height::new(u64::MAX, u64::MAX);
        assert!(!is_expired(&packet(None, None), &current, u64::MAX / NANOS_PER_SECOND as u64));
        assert!(!is_expired(&packet(Some(Height::new(1, 0)), Some(0)), &current, 10));
    }

    #[test]
    fn single_axis_packets_are_judged_on_that_axis() {
        let now = secs("2022-10-19T09:43:20Z");
        let current = Height::new(1, 500);

        let by_height = packet(Some(Height::new(1, 500)), None);
        assert!(is_expired(&by_height, &current, now));
        assert!(!is_expired(&by_height, &Height::new(1, 499), now));

        let by_time = packet(None, Some(nanos("2022-10-19T09:43:20Z")));
        assert!(is_expired(&by_time, &current, now));
        assert!(!is_expired(&by_time, &current, now - 1));
    }

    #[test]
    fn any_open_axis_keeps_a_packet_pending() {
        let now = secs("2022-10-19T09:43:20Z");
        let height_elapsed_time_open = packet(
            Some(Height::new(1, 100)),
            Some(nanos("2022-10-19T10:00:00Z")),
        );
        assert!(!is_expired(&height_elapsed_time_open, &Height::new(1, 200), now));

        let time_elapsed_height_open = packet(
            Some(Height::new(1, 300)),
            Some(nanos("2022-10-19T09:00:00Z")),
        );
        assert!(!is_expired(&time_elapsed_height_open, &Height::new(1, 200), now));

        let both_elapsed = packet(
            Some(Height::new(1, 100)),
            Some(nanos("2022-10-19T09:00:00Z")),
        );
        assert!(is_expired(&both_elapsed, &Height::new(1, 200), now));
    }

    #[test]
    fn split_keeps_order() {
        let now = secs("2022-10-19T09:43:20Z");
        let packets = vec![
            (packet(None, Some(nanos("2022-10-19T09:00:00Z"))), 10),
            (packet(None, None), 11),
            (packet(Some(Height::new(1, 5)), None), 12),
            (packet(Some(Height::new(1, 900)), None), 13),
        ]
        .into_iter()
        .map(|(packet, height)| PacketWithMetadata { packet, height })
        .collect();
        let (pending, expired) = split_expired(packets, &Height::new(1, 200), now);
        assert_eq!(
            pending.iter().map(|p| p.height).collect::<Vec<_>>(),
            vec![11, 13]
        );
        assert_eq!(
            expired.iter().map(|p| p.height).collect::<Vec<_>>(),
            vec![10, 12]
        );
    }
}
