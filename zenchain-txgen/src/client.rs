//! JSON-RPC facade over the chain endpoint.

use std::{str::FromStr, time::Duration};

use alloy_json_rpc::{RpcError, RpcParam, RpcReturn};
use alloy_primitives::{Address, Bytes, TxHash, U128, U256, U64};
use alloy_rpc_client::{ClientBuilder, ReqwestClient};
use alloy_transport::TransportError;
use thiserror::Error;
use tracing::{debug, trace};
use url::Url;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{method} timed out after {timeout:?}")]
    Timeout {
        method: &'static str,
        timeout: Duration,
    },

    #[error("node rejected request ({code}): {message}")]
    Rejected { code: i64, message: String },

    #[error(transparent)]
    Transport(TransportError),

    #[error("invalid address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: &'static str },
}

impl From<TransportError> for ClientError {
    fn from(error: TransportError) -> Self {
        match error {
            RpcError::ErrorResp(payload) => ClientError::Rejected {
                code: payload.code,
                message: payload.message.to_string(),
            },
            other => ClientError::Transport(other),
        }
    }
}

/// Chain operations needed to originate plain value transfers.
pub trait ChainClient {
    async fn is_connected(&self) -> bool;
    async fn chain_id(&self) -> Result<u64, ClientError>;
    /// Balance in wei.
    async fn get_balance(&self, address: Address) -> Result<U256, ClientError>;
    /// Next nonce, i.e. the account's transaction count at the latest block.
    async fn get_nonce(&self, address: Address) -> Result<u64, ClientError>;
    /// Suggested gas price in wei, fetched fresh on every call.
    async fn get_gas_price(&self) -> Result<u128, ClientError>;
    /// Broadcasts a signed, EIP-2718 encoded transaction. Does not wait for inclusion.
    async fn submit_raw_transaction(&self, raw: Bytes) -> Result<TxHash, ClientError>;
}

/// [`ChainClient`] over HTTP JSON-RPC, with every call bounded by `request_timeout`.
#[derive(Clone)]
pub struct RpcChainClient {
    client: ReqwestClient,
    request_timeout: Duration,
}

impl RpcChainClient {
    pub fn new(rpc_url: Url, request_timeout: Duration) -> Self {
        Self {
            client: ClientBuilder::default().http(rpc_url),
            request_timeout,
        }
    }

    async fn call<Params: RpcParam, Resp: RpcReturn>(
        &self,
        method: &'static str,
        params: Params,
    ) -> Result<Resp, ClientError> {
        trace!(method, "Sending rpc request");
        match tokio::time::timeout(
            self.request_timeout,
            self.client.request::<Params, Resp>(method, params),
        )
        .await
        {
            Ok(result) => result.map_err(ClientError::from),
            Err(_) => Err(ClientError::Timeout {
                method,
                timeout: self.request_timeout,
            }),
        }
    }
}

impl ChainClient for RpcChainClient {
    async fn is_connected(&self) -> bool {
        match self.chain_id().await {
            Ok(_) => true,
            Err(e) => {
                debug!("Connectivity probe failed: {e}");
                false
            }
        }
    }

    async fn chain_id(&self) -> Result<u64, ClientError> {
        let chain_id: U64 = self.call("eth_chainId", ()).await?;
        Ok(chain_id.to())
    }

    async fn get_balance(&self, address: Address) -> Result<U256, ClientError> {
        self.call("eth_getBalance", (address, "latest")).await
    }

    async fn get_nonce(&self, address: Address) -> Result<u64, ClientError> {
        let nonce: U64 = self
            .call("eth_getTransactionCount", (address, "latest"))
            .await?;
        Ok(nonce.to())
    }

    async fn get_gas_price(&self) -> Result<u128, ClientError> {
        let gas_price: U128 = self.call("eth_gasPrice", ()).await?;
        Ok(gas_price.to())
    }

    async fn submit_raw_transaction(&self, raw: Bytes) -> Result<TxHash, ClientError> {
        self.call("eth_sendRawTransaction", [raw]).await
    }
}

/// Validates `raw` and returns the address it names.
///
/// Accepts an optional `0x`/`0X` prefix and surrounding whitespace. Letter case is
/// ignored, so a stale or wrong checksum still normalizes. The returned address
/// displays in checksum form.
pub fn to_checksum_address(raw: &str) -> Result<Address, ClientError> {
    let invalid = |reason| ClientError::InvalidAddress {
        input: raw.to_string(),
        reason,
    };

    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.len() != 40 {
        return Err(invalid("expected 40 hex digits"));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid("non-hex character"));
    }

    Address::from_str(&digits.to_ascii_lowercase()).map_err(|_| invalid("non-hex character"))
}
