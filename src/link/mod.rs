//! A link binds two chains through a pair of connections and relays packets across it in
//! both directions.

pub mod endpoint;
pub mod relay_path;
pub mod summary;

use crate::{
    core::{error::Error, height::Height},
    primitives::{Chain, ConnectionHandshake, RequestBudget},
};
use endpoint::{Endpoint, EndpointHeights};
use relay_path::{refresh_client, ClientRefresh, RelayPath};
use serde::{Deserialize, Serialize};
use std::time::Duration;
pub use summary::RelaySummary;

/// Default max age of a client's latest consensus state.
pub const DEFAULT_MAX_CLIENT_AGE: Duration = Duration::from_secs(86400);

/// One end of a link. The client on a side tracks the other side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    AtoB,
    BtoA,
}

/// Relay cursors of both ends, for persisting between runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayedHeights {
    pub a: EndpointHeights,
    pub b: EndpointHeights,
}

pub struct Link<A: Chain, B: Chain> {
    pub end_a: Endpoint<A>,
    pub end_b: Endpoint<B>,
    max_age_a: Duration,
    max_age_b: Duration,
}

impl<A: Chain, B: Chain> Link<A, B> {
    pub fn new(end_a: Endpoint<A>, end_b: Endpoint<B>) -> Result<Self, Error> {
        if end_a.chain_id() == end_b.chain_id() {
            return Err(Error::Config(format!(
                "both ends of the link are {}",
                end_a.chain_id()
            )));
        }
        Ok(Self {
            end_a,
            end_b,
            max_age_a: DEFAULT_MAX_CLIENT_AGE,
            max_age_b: DEFAULT_MAX_CLIENT_AGE,
        })
    }

    /// Runs the connection handshake between the two chains and links them through the
    /// fresh connections.
    pub async fn create_with_new_connections<H>(
        chain_a: A,
        chain_b: B,
        handshake: &H,
        budgets: (RequestBudget, RequestBudget),
    ) -> Result<Self, Error>
    where
        H: ConnectionHandshake<A, B>,
    {
        if chain_a.chain_id() == chain_b.chain_id() {
            return Err(Error::Config(format!(
                "cannot connect {} to itself",
                chain_a.chain_id()
            )));
        }
        let (connection_a, connection_b) = handshake
            .create_connection_pair(&chain_a, &chain_b)
            .await
            .map_err(|e| match e {
                Error::Handshake { .. } => e,
                other => Error::Handshake {
                    chain_a: chain_a.chain_id().to_string(),
                    chain_b: chain_b.chain_id().to_string(),
                    reason: other.to_string(),
                },
            })?;
        log::info!(
            target: "packet-relayer",
            "🤝 Created connections {} ({}) <=> {} ({})",
            connection_a,
            chain_a.chain_id(),
            connection_b,
            chain_b.chain_id()
        );
        Self::create_with_existing_connections(chain_a, chain_b, &connection_a, &connection_b, budgets)
            .await
    }

    /// Links the chains through connections that already exist, after checking that the
    /// two connection ends and their clients point at each other.
    pub async fn create_with_existing_connections(
        chain_a: A,
        chain_b: B,
        connection_a: &str,
        connection_b: &str,
        budgets: (RequestBudget, RequestBudget),
    ) -> Result<Self, Error> {
        if chain_a.chain_id() == chain_b.chain_id() {
            return Err(Error::Config(format!(
                "cannot link {} to itself",
                chain_a.chain_id()
            )));
        }
        let mismatch = |reason: String| {
            Error::Config(format!(
                "{} on {} and {} on {} do not form a connection: {}",
                connection_a,
                chain_a.chain_id(),
                connection_b,
                chain_b.chain_id(),
                reason
            ))
        };

        let conn_a = chain_a.query_connection(connection_a).await?;
        let conn_b = chain_b.query_connection(connection_b).await?;
        if conn_a.counterparty_connection_id != connection_b {
            return Err(mismatch(format!(
                "counterparty of {} is {}",
                connection_a, conn_a.counterparty_connection_id
            )));
        }
        if conn_b.counterparty_connection_id != connection_a {
            return Err(mismatch(format!(
                "counterparty of {} is {}",
                connection_b, conn_b.counterparty_connection_id
            )));
        }
        if conn_a.counterparty_client_id != conn_b.client_id
            || conn_b.counterparty_client_id != conn_a.client_id
        {
            return Err(mismatch(format!(
                "clients {} and {} are not counterparties",
                conn_a.client_id, conn_b.client_id
            )));
        }

        let client_a = chain_a.query_client_state(&conn_a.client_id).await?;
        if client_a.chain_id != chain_b.chain_id() {
            return Err(mismatch(format!(
                "client {} tracks {}",
                conn_a.client_id, client_a.chain_id
            )));
        }
        let client_b = chain_b.query_client_state(&conn_b.client_id).await?;
        if client_b.chain_id != chain_a.chain_id() {
            return Err(mismatch(format!(
                "client {} tracks {}",
                conn_b.client_id, client_b.chain_id
            )));
        }

        let (budget_a, budget_b) = budgets;
        Self::new(
            Endpoint::new(chain_a, conn_a.client_id, connection_a.to_string(), budget_a),
            Endpoint::new(chain_b, conn_b.client_id, connection_b.to_string(), budget_b),
        )
    }

    /// Max age of the client held on `side`.
    pub fn with_max_client_age(mut self, side: Side, max_age: Duration) -> Self {
        match side {
            Side::A => self.max_age_a = max_age,
            Side::B => self.max_age_b = max_age,
        }
        self
    }

    pub fn max_client_age(&self, side: Side) -> Duration {
        match side {
            Side::A => self.max_age_a,
            Side::B => self.max_age_b,
        }
    }

    fn path_a_to_b(&self) -> RelayPath<'_, A, B> {
        RelayPath::new(&self.end_a, &self.end_b, self.max_age_a, self.max_age_b)
    }

    fn path_b_to_a(&self) -> RelayPath<'_, B, A> {
        RelayPath::new(&self.end_b, &self.end_a, self.max_age_b, self.max_age_a)
    }

    async fn refresh(&self, side: Side, refresh: ClientRefresh) -> Result<(Height, bool), Error> {
        match side {
            Side::A => refresh_client(&self.end_a, &self.end_b, refresh).await,
            Side::B => refresh_client(&self.end_b, &self.end_a, refresh).await,
        }
    }

    /// Updates the client on `side` to the latest header of the other side.
    pub async fn update_client(&self, side: Side) -> Result<Height, Error> {
        let (height, _) = self
            .refresh(
                side,
                ClientRefresh {
                    min_height: Height::default(),
                    max_age: None,
                    force: true,
                },
            )
            .await?;
        Ok(height)
    }

    /// Updates the client on `side` only if its latest consensus state is older than
    /// `max_age`. Returns the new client height when an update was submitted.
    pub async fn update_client_if_stale(
        &self,
        side: Side,
        max_age: Duration,
    ) -> Result<Option<Height>, Error> {
        let (height, updated) = self
            .refresh(
                side,
                ClientRefresh {
                    min_height: Height::default(),
                    max_age: Some(max_age),
                    force: false,
                },
            )
            .await?;
        Ok(updated.then_some(height))
    }

    /// Refreshes both clients against their configured max ages.
    pub async fn update_clients_if_stale(&self) -> Result<RelaySummary, Error> {
        let (a, b) = futures::join!(
            self.update_client_if_stale(Side::A, self.max_age_a),
            self.update_client_if_stale(Side::B, self.max_age_b)
        );
        Ok(RelaySummary {
            client_updates: usize::from(a?.is_some()) + usize::from(b?.is_some()),
            ..Default::default()
        })
    }

    pub async fn relay_packets(&self, direction: Direction) -> Result<usize, Error> {
        let summary = match direction {
            Direction::AtoB => self.path_a_to_b().relay_packets().await?,
            Direction::BtoA => self.path_b_to_a().relay_packets().await?,
        };
        Ok(summary.packets)
    }

    /// Relays acknowledgements of packets sent in `direction` back to their source.
    pub async fn relay_acks(&self, direction: Direction) -> Result<usize, Error> {
        let summary = match direction {
            Direction::AtoB => self.path_a_to_b().relay_acks().await?,
            Direction::BtoA => self.path_b_to_a().relay_acks().await?,
        };
        Ok(summary.acks)
    }

    pub async fn timeout_packets(&self, direction: Direction) -> Result<usize, Error> {
        let summary = match direction {
            Direction::AtoB => self.path_a_to_b().timeout_packets().await?,
            Direction::BtoA => self.path_b_to_a().timeout_packets().await?,
        };
        Ok(summary.timeouts)
    }

    /// Relays packets, acknowledgements and timeouts in both directions. The two directions
    /// run concurrently and both finish before an error is returned.
    pub async fn check_and_relay_packets_and_acks(&self) -> Result<RelaySummary, Error> {
        let (path_ab, path_ba) = (self.path_a_to_b(), self.path_b_to_a());
        let (a_to_b, b_to_a) = futures::join!(path_ab.relay_all(), path_ba.relay_all());
        let summary = a_to_b? + b_to_a?;
        if !summary.is_empty() {
            log::info!(target: "packet-relayer", "📦 Relayed {} <=> {}: {}", self.end_a.chain_id(), self.end_b.chain_id(), summary);
        }
        Ok(summary)
    }

    pub fn relayed_heights(&self) -> RelayedHeights {
        RelayedHeights {
            a: self.end_a.heights(),
            b: self.end_b.heights(),
        }
    }

    pub fn resume_from(&self, heights: RelayedHeights) {
        self.end_a.resume_from(heights.a);
        self.end_b.resume_from(heights.b);
    }
}

