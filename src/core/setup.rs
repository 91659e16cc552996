use super::{config::AppConfig, error::Error};
use crate::{
    link::{Link, Side},
    primitives::{Chain, ConnectionHandshake, RequestBudget},
};

/// Builds the link described by `config`. Configured connections are reused; otherwise a
/// new connection pair is created and recorded in `config`, which the caller persists.
pub async fn prepare_link<A, B, H>(
    config: &mut AppConfig,
    chain_a: A,
    chain_b: B,
    handshake: &H,
) -> Result<Link<A, B>, Error>
where
    A: Chain,
    B: Chain,
    H: ConnectionHandshake<A, B>,
{
    config.validate()?;
    if chain_a.chain_id() != config.src || chain_b.chain_id() != config.dest {
        return Err(Error::Config(format!(
            "configured for {} -> {} but got {} -> {}",
            config.src,
            config.dest,
            chain_a.chain_id(),
            chain_b.chain_id()
        )));
    }
    let budgets = (
        RequestBudget::new(config.rpc_concurrency),
        RequestBudget::new(config.rpc_concurrency),
    );

    let link = match config.connections() {
        Some((connection_a, connection_b)) => {
            log::info!(target: "packet-relayer", "🔗 Using existing connections {} <=> {}", connection_a, connection_b);
            Link::create_with_existing_connections(chain_a, chain_b, connection_a, connection_b, budgets)
                .await?
        }
        None => {
            let link =
                Link::create_with_new_connections(chain_a, chain_b, handshake, budgets).await?;
            *config = config
                .clone()
                .with_connections(link.end_a.connection_id.clone(), link.end_b.connection_id.clone());
            link
        }
    };

    let (max_age_a, max_age_b) = config.max_client_ages();
    Ok(link
        .with_max_client_age(Side::A, max_age_a)
        .with_max_client_age(Side::B, max_age_b))
}
