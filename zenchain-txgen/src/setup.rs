use thiserror::Error;
use tracing::{info, warn};

use crate::{
    accounts::{AccountPool, PoolError},
    client::{ChainClient, ClientError},
    config::{AccountEntry, ConfigSource},
    CHAIN_ID,
};

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to connect to the Zenchain testnet at {rpc_url}: {source}")]
    Unreachable {
        rpc_url: String,
        #[source]
        source: ClientError,
    },

    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Startup checks. Nothing here is retried: any error is fatal.
pub async fn prepare(
    client: &impl ChainClient,
    rpc_url: &str,
    accounts: &[AccountEntry],
    source: &impl ConfigSource,
) -> Result<AccountPool, SetupError> {
    // eth_chainId doubles as the connectivity probe
    let chain_id = client
        .chain_id()
        .await
        .map_err(|source| SetupError::Unreachable {
            rpc_url: rpc_url.to_string(),
            source,
        })?;
    if chain_id != CHAIN_ID {
        warn!(
            expected = CHAIN_ID,
            reported = chain_id,
            "Endpoint reports a different chain id, transactions are still signed for {CHAIN_ID}"
        );
    }
    info!(rpc_url, "Connected to the Zenchain testnet");

    Ok(AccountPool::load(accounts, source)?)
}
