use super::{error::Error, retry::BackoffConfig};
use crate::{
    link::{Link, RelaySummary},
    primitives::Chain,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::{sync::watch, task::JoinHandle};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelayMode {
    /// Relay everything pending once, then stop
    Once,
    /// Poll until cancelled
    Continuous,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayOptions {
    pub mode: RelayMode,
    pub poll_interval: Duration,
    pub backoff: BackoffConfig,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            mode: RelayMode::Continuous,
            poll_interval: Duration::from_secs(5),
            backoff: BackoffConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Polling,
    Relaying,
    Sleeping,
    Stopped,
}

/// Drives a link cycle by cycle. Cancellation is observed before every cycle and while
/// sleeping; a cycle that has started always runs to completion.
pub struct RelayLoop<'a, A: Chain, B: Chain> {
    link: &'a Link<A, B>,
    options: RelayOptions,
    state: LoopState,
    cycles: u64,
}

impl<'a, A: Chain, B: Chain> RelayLoop<'a, A, B> {
    pub fn new(link: &'a Link<A, B>, options: RelayOptions) -> Self {
        Self {
            link,
            options,
            state: LoopState::Idle,
            cycles: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    fn transition(&mut self, state: LoopState) {
        log::trace!(target: "packet-relayer", "Relay loop {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Runs until cancelled (continuous mode) or for exactly one cycle (once mode) and
    /// returns what was relayed in total.
    pub async fn run(
        &mut self,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<RelaySummary, Error> {
        let mut total = RelaySummary::default();
        loop {
            if *shutdown.borrow() {
                log::info!(target: "packet-relayer", "🛑 Relay loop cancelled after {} cycles", self.cycles);
                self.transition(LoopState::Stopped);
                return Ok(total);
            }

            match self.cycle_with_backoff(&mut shutdown).await {
                Ok(Some(summary)) => total += summary,
                Ok(None) => {
                    self.transition(LoopState::Stopped);
                    return Ok(total);
                }
                Err(e) if e.is_fatal() => {
                    log::error!(target: "packet-relayer", "❌ Stopping relay loop: {}", e);
                    self.transition(LoopState::Stopped);
                    return Err(e);
                }
                Err(e) => match self.options.mode {
                    RelayMode::Once => {
                        self.transition(LoopState::Stopped);
                        return Err(e);
                    }
                    RelayMode::Continuous => {
                        log::error!(target: "packet-relayer", "❌ Relay cycle failed, continuing: {}", e);
                    }
                },
            }
            self.cycles += 1;

            if self.options.mode == RelayMode::Once {
                self.transition(LoopState::Stopped);
                return Ok(total);
            }
            self.transition(LoopState::Sleeping);
            if sleep_or_cancel(self.options.poll_interval, &mut shutdown).await {
                self.transition(LoopState::Stopped);
                return Ok(total);
            }
            self.transition(LoopState::Idle);
        }
    }

    async fn cycle(&mut self) -> Result<RelaySummary, Error> {
        self.transition(LoopState::Polling);
        let mut summary = self.link.update_clients_if_stale().await?;
        self.transition(LoopState::Relaying);
        summary += self.link.check_and_relay_packets_and_acks().await?;
        log::debug!(target: "packet-relayer", "Cursors after cycle {}: {:?}", self.cycles, self.link.relayed_heights());
        Ok(summary)
    }

    /// One cycle, repeated after a backoff while it fails transiently. `None` when
    /// cancelled during a backoff.
    async fn cycle_with_backoff(
        &mut self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<Option<RelaySummary>, Error> {
        let mut delays = self.options.backoff.delays();
        loop {
            match self.cycle().await {
                Ok(summary) => return Ok(Some(summary)),
                Err(e) if e.is_transient() => match delays.next() {
                    Some(delay) => {
                        log::warn!(target: "packet-relayer", "⚠️ {}, retrying in {:?}", e, delay);
                        self.transition(LoopState::Sleeping);
                        if sleep_or_cancel(delay, shutdown).await {
                            return Ok(None);
                        }
                    }
                    None => return Err(e),
                },
                Err(e) => return Err(e),
            }
        }
    }
}

/// Sleeps for `duration`; returns true as soon as cancellation is requested.
async fn sleep_or_cancel(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return true;
    }
    let sleep = tokio::time::sleep(duration);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            _ = &mut sleep => return false,
            changed = shutdown.changed() => match changed {
                Ok(()) if *shutdown.borrow() => return true,
                Ok(()) => continue,
                // nobody can cancel anymore
                Err(_) => {
                    (&mut sleep).await;
                    return false;
                }
            },
        }
    }
}

/// Core relayer loop for one link.
pub async fn relay<A, B>(
    link: &Link<A, B>,
    options: &RelayOptions,
    shutdown: watch::Receiver<bool>,
) -> Result<RelaySummary, Error>
where
    A: Chain,
    B: Chain,
{
    log::info!(
        target: "packet-relayer",
        "🚀 Relaying {} <=> {} ({:?}, poll every {:?})",
        link.end_a.chain_id(),
        link.end_b.chain_id(),
        options.mode,
        options.poll_interval
    );
    RelayLoop::new(link, options.clone()).run(shutdown).await
}

/// Relays `link` on its own task. Links spawned this way share nothing but the request
/// budgets of their endpoints.
pub fn spawn_relay<A, B>(
    link: Link<A, B>,
    options: RelayOptions,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<Result<RelaySummary, Error>>
where
    A: Chain + 'static,
    B: Chain + 'static,
{
    tokio::spawn(async move { relay(&link, &options, shutdown).await })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sleep_is_cut_short_by_cancellation() {
        let (tx, mut rx) = watch::channel(false);
        let sleeper = tokio::spawn(async move {
            sleep_or_cancel(Duration::from_secs(3600), &mut rx).await
        });
        tx.send(true).unwrap();
        assert!(sleeper.await.unwrap());
    }

    #[tokio::test]
    async fn sleep_finishes_without_cancellation() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);
        assert!(!sleep_or_cancel(Duration::from_millis(5), &mut rx).await);
    }
}
