use super::{endpoint::Endpoint, summary::RelaySummary};
use crate::{
    core::{
        error::Error,
        height::Height,
        packets::utils::{is_expired, seconds_from_time, split_expired},
    },
    primitives::{funcs, Chain},
};
use std::time::Duration;

/// When a client on `holder` (tracking `tracked`) must be brought forward.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ClientRefresh {
    /// Lowest tracked-chain height the client must know about
    pub min_height: Height,
    pub max_age: Option<Duration>,
    pub force: bool,
}

/// Brings the client on `holder` forward to the latest header of `tracked` when it is below
/// `min_height`, older than `max_age`, or when forced. Returns the client height to prove
/// against and whether an update was submitted.
pub(crate) async fn refresh_client<H: Chain, T: Chain>(
    holder: &Endpoint<H>,
    tracked: &Endpoint<T>,
    refresh: ClientRefresh,
) -> Result<(Height, bool), Error> {
    let _guard = holder.lock_updates().await;
    let (_, tracked_time) = tracked.latest_height_and_timestamp().await?;
    let status = holder.query_client_status(tracked_time).await?;

    let mut needed = refresh.force || status.height < refresh.min_height;
    if let Some(max_age) = refresh.max_age {
        if let Err(e) = status.ensure_fresh(holder.chain_id(), &holder.client_id, max_age) {
            log::info!(target: "packet-relayer", "⏳ {}", e);
            needed = true;
        }
    }
    if !needed {
        return Ok((status.height, false));
    }
    if status.is_expired() {
        log::warn!(
            target: "packet-relayer",
            "⚠️ Client {} on {} is past its trusting period, update may be refused",
            holder.client_id,
            holder.chain_id()
        );
    }

    let header = tracked.query_header(status.height).await?;
    if header.height <= status.height {
        log::debug!(target: "packet-relayer", "No header newer than {} on {} yet", status.height, tracked.chain_id());
        return Ok((status.height, false));
    }
    let height = header.height;
    let msg = holder.build_update_client_message(header);
    match holder.submit(vec![msg]).await {
        Ok(_) => {}
        Err(e) if e.is_reject() => {
            log::info!(target: "packet-relayer", "🔁 Client update on {} refused: {}", holder.chain_id(), e);
            let status = holder.query_client_status(tracked_time).await?;
            return Ok((status.height, false));
        }
        Err(e) => return Err(e),
    }
    log::info!(
        target: "packet-relayer",
        "🛰️ Updated client {} on {} to {}",
        holder.client_id,
        holder.chain_id(),
        height
    );
    Ok((height, true))
}

/// Lowest height among `heights`, if any.
fn lowest(heights: impl Iterator<Item = u64>) -> Option<u64> {
    heights.min()
}

/// Relays in one direction: packets sent on `src` go to `dst`, acknowledgements written
/// on `dst` come back to `src`, and packets that expired on `dst` are timed out on `src`.
pub struct RelayPath<'a, S: Chain, D: Chain> {
    src: &'a Endpoint<S>,
    dst: &'a Endpoint<D>,
    /// Max age of the client on `src` tracking `dst`
    src_client_max_age: Duration,
    /// Max age of the client on `dst` tracking `src`
    dst_client_max_age: Duration,
}

impl<'a, S: Chain, D: Chain> RelayPath<'a, S, D> {
    pub fn new(
        src: &'a Endpoint<S>,
        dst: &'a Endpoint<D>,
        src_client_max_age: Duration,
        dst_client_max_age: Duration,
    ) -> Self {
        Self {
            src,
            dst,
            src_client_max_age,
            dst_client_max_age,
        }
    }

    /// Submits `MsgRecvPacket` to `dst` for every pending packet that is still live and
    /// provable. The packet cursor of `src` stops at the first packet left behind.
    pub async fn relay_packets(&self) -> Result<RelaySummary, Error> {
        let mut summary = RelaySummary::default();
        let (src_height, _) = self.src.latest_height_and_timestamp().await?;
        let until = src_height.revision_height;
        let since = self.src.packet_cursor();
        if since > until {
            return Ok(summary);
        }

        let packets = self.src.query_pending_packets(since, until).await?;
        let packets = self.src.query_undelivered_packets(self.dst, packets).await?;
        if packets.is_empty() {
            self.src.set_packet_cursor(until + 1);
            return Ok(summary);
        }

        let (dst_height, dst_time) = self.dst.latest_height_and_timestamp().await?;
        let (pending, expired) = split_expired(packets, &dst_height, seconds_from_time(&dst_time));
        if !expired.is_empty() {
            log::debug!(target: "packet-relayer", "{} packets from {} expired on {}", expired.len(), self.src.chain_id(), self.dst.chain_id());
        }
        let mut held_back = lowest(expired.iter().map(|p| p.height));

        if let Some(highest) = pending.iter().map(|p| p.height).max() {
            let (proof_height, updated) = refresh_client(
                self.dst,
                self.src,
                ClientRefresh {
                    min_height: src_height.with_revision_height(highest + 1),
                    max_age: Some(self.dst_client_max_age),
                    force: false,
                },
            )
            .await?;
            summary.client_updates += usize::from(updated);

            // state committed at height h is provable from h + 1 on
            let (provable, deferred): (Vec<_>, Vec<_>) = pending
                .into_iter()
                .partition(|p| src_height.with_revision_height(p.height) < proof_height);
            if !deferred.is_empty() {
                log::debug!(target: "packet-relayer", "Deferring {} packets above proof height {}", deferred.len(), proof_height);
            }
            held_back = held_back.into_iter().chain(lowest(deferred.iter().map(|p| p.height))).min();

            let provable_from = lowest(provable.iter().map(|p| p.height));
            let signer = self.dst.signer();
            let mut msgs = Vec::with_capacity(provable.len());
            for p in provable {
                let proof = self
                    .src
                    .query_packet_commitment_proof(&p.packet, proof_height)
                    .await?;
                log::trace!(target: "packet-relayer", "Relaying packet {} from {}", p.packet.sequence, self.src.chain_id());
                msgs.push(funcs::recv_packet_message(p.packet, proof, proof_height, signer.clone()));
            }
            let outcome = self.dst.submit_batch(msgs).await?;
            summary.packets += outcome.submitted;
            summary.rejected += outcome.rejected;
            if outcome.rejected > 0 {
                // refused packets are looked at again next pass
                held_back = held_back.into_iter().chain(provable_from).min();
            }
        }

        self.src.set_packet_cursor(held_back.unwrap_or(until + 1));
        Ok(summary)
    }

    /// Submits `MsgAcknowledgement` to `src` for acknowledgements written on `dst`.
    pub async fn relay_acks(&self) -> Result<RelaySummary, Error> {
        let mut summary = RelaySummary::default();
        let (dst_height, _) = self.dst.latest_height_and_timestamp().await?;
        let until = dst_height.revision_height;
        let since = self.dst.ack_cursor();
        if since > until {
            return Ok(summary);
        }

        let acks = self.dst.query_pending_acks(since, until).await?;
        let acks = self.src.query_undelivered_acks(acks).await?;
        let mut held_back = None;

        if let Some(highest) = acks.iter().map(|a| a.height).max() {
            let (proof_height, updated) = refresh_client(
                self.src,
                self.dst,
                ClientRefresh {
                    min_height: dst_height.with_revision_height(highest + 1),
                    max_age: Some(self.src_client_max_age),
                    force: false,
                },
            )
            .await?;
            summary.client_updates += usize::from(updated);

            let (provable, deferred): (Vec<_>, Vec<_>) = acks
                .into_iter()
                .partition(|a| dst_height.with_revision_height(a.height) < proof_height);
            held_back = lowest(deferred.iter().map(|a| a.height));
            let provable_from = lowest(provable.iter().map(|a| a.height));

            let signer = self.src.signer();
            let mut msgs = Vec::with_capacity(provable.len());
            for a in provable {
                let proof = self
                    .dst
                    .query_packet_acknowledgement_proof(&a.ack.original_packet, proof_height)
                    .await?;
                msgs.push(funcs::acknowledgement_message(
                    a.ack.original_packet,
                    a.ack.acknowledgement,
                    proof,
                    proof_height,
                    signer.clone(),
                ));
            }
            let outcome = self.src.submit_batch(msgs).await?;
            summary.acks += outcome.submitted;
            summary.rejected += outcome.rejected;
            if outcome.rejected > 0 {
                held_back = held_back.into_iter().chain(provable_from).min();
            }
        }

        self.dst.set_ack_cursor(held_back.unwrap_or(until + 1));
        Ok(summary)
    }

    /// Submits `MsgTimeout` to `src` for packets that can no longer be received on `dst`.
    pub async fn timeout_packets(&self) -> Result<RelaySummary, Error> {
        let mut summary = RelaySummary::default();
        let (src_height, _) = self.src.latest_height_and_timestamp().await?;
        let since = self.src.packet_cursor();
        if since > src_height.revision_height {
            return Ok(summary);
        }

        let packets = self
            .src
            .query_pending_packets(since, src_height.revision_height)
            .await?;
        let packets = self.src.query_undelivered_packets(self.dst, packets).await?;
        let (dst_height, dst_time) = self.dst.latest_height_and_timestamp().await?;
        let (_, expired) = split_expired(packets, &dst_height, seconds_from_time(&dst_time));
        if expired.is_empty() {
            return Ok(summary);
        }

        // the client on src must know a dst height at which every packet had expired
        let (proof_height, updated) = refresh_client(
            self.src,
            self.dst,
            ClientRefresh {
                min_height: dst_height,
                max_age: Some(self.src_client_max_age),
                force: false,
            },
        )
        .await?;
        summary.client_updates += usize::from(updated);
        let proof_time = self.src.query_consensus_state_time(proof_height).await?;

        let signer = self.src.signer();
        let mut msgs = Vec::with_capacity(expired.len());
        let mut deferred = None;
        for p in expired {
            if !is_expired(&p.packet, &proof_height, seconds_from_time(&proof_time)) {
                if proof_height >= dst_height {
                    return Err(Error::TimeoutPolicyViolation(format!(
                        "packet {} on {}/{} expired at {} but not at later proof height {}",
                        p.packet.sequence,
                        p.packet.source_port,
                        p.packet.source_channel,
                        dst_height,
                        proof_height
                    )));
                }
                // the client has not caught up with the height the packet expired at
                log::debug!(target: "packet-relayer", "Deferring timeout of packet {} until {} proves it", p.packet.sequence, self.src.client_id);
                deferred = deferred.into_iter().chain(Some(p.height)).min();
                continue;
            }
            let (proof, next_sequence_recv) = self
                .dst
                .query_packet_receipt_proof(&p.packet, proof_height)
                .await?;
            log::debug!(target: "packet-relayer", "⌛ Timing out packet {} from {}", p.packet.sequence, self.src.chain_id());
            msgs.push(funcs::timeout_message(
                p.packet,
                proof,
                next_sequence_recv,
                proof_height,
                signer.clone(),
            ));
        }
        if let Some(height) = deferred {
            self.src.set_packet_cursor(self.src.packet_cursor().min(height));
        }
        if msgs.is_empty() {
            return Ok(summary);
        }
        let outcome = self.src.submit_batch(msgs).await?;
        summary.timeouts += outcome.submitted;
        summary.rejected += outcome.rejected;
        Ok(summary)
    }

    /// Packets, then acknowledgements, then timeouts.
    pub async fn relay_all(&self) -> Result<RelaySummary, Error> {
        let mut summary = self.relay_packets().await?;
        summary += self.relay_acks().await?;
        summary += self.timeout_packets().await?;
        Ok(summary)
    }
}
