use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{utils::format_ether, Address, Bytes, TxHash, TxKind, U256};
use rand::{CryptoRng, RngCore};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    accounts::{Account, AccountKey},
    client::{ChainClient, ClientError},
    outcome::{OutcomeKind, TransferOutcome},
    private_key::PrivateKey,
    receiver::ReceiverGenerator,
    CHAIN_ID, TRANSFER_GAS_LIMIT,
};

/// Per-transfer failure. Never escapes [`Dispatcher::dispatch`].
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{stage} failed: {source}")]
    Client {
        stage: &'static str,
        #[source]
        source: ClientError,
    },

    #[error("signing failed: {0}")]
    Signing(#[from] alloy_signer::Error),

    #[error("malformed signing key: {0}")]
    MalformedKey(String),
}

impl DispatchError {
    fn client(stage: &'static str) -> impl FnOnce(ClientError) -> Self {
        move |source| DispatchError::Client { stage, source }
    }
}

/// Everything needed to build one plain value transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    pub sender: Address,
    pub receiver: Address,
    pub amount: U256,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub chain_id: u64,
}

impl TransferRequest {
    pub fn to_transaction(&self) -> TxLegacy {
        TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.receiver),
            value: self.amount,
            input: Bytes::new(),
        }
    }

    pub fn sign(&self, key: &PrivateKey) -> Result<SignedTransfer, DispatchError> {
        let tx = self.to_transaction();
        let signature = key.sign_transaction(&tx)?;
        let envelope = TxEnvelope::from(tx.into_signed(signature));

        Ok(SignedTransfer {
            tx_hash: *envelope.tx_hash(),
            raw: envelope.encoded_2718().into(),
        })
    }
}

/// EIP-2718 encoded transaction ready for `eth_sendRawTransaction`.
#[derive(Clone, Debug)]
pub struct SignedTransfer {
    pub tx_hash: TxHash,
    pub raw: Bytes,
}

pub struct Dispatcher<C, R> {
    client: C,
    receivers: ReceiverGenerator<R>,
}

impl<C, R> Dispatcher<C, R>
where
    C: ChainClient,
    R: RngCore + CryptoRng,
{
    pub fn new(client: C, receivers: ReceiverGenerator<R>) -> Self {
        Self { client, receivers }
    }

    /// Sends `amount` wei from `sender` to a fresh throwaway address.
    ///
    /// The balance is read first. If it cannot cover `amount`, or the sender's key is
    /// malformed, the attempt stops there: no nonce or gas price is fetched and nothing
    /// is submitted. Otherwise exactly one submission is attempted. Every failure is
    /// folded into the returned outcome.
    pub async fn dispatch(&mut self, sender: &Account, amount: U256) -> TransferOutcome {
        let receiver = self.receivers.generate_address();

        let (balance, kind) = match self.client.get_balance(sender.address).await {
            Err(e) => (
                None,
                OutcomeKind::Failed {
                    reason: DispatchError::client("balance lookup")(e).to_string(),
                },
            ),
            Ok(balance) if balance < amount => {
                (Some(balance), OutcomeKind::InsufficientBalance { balance })
            }
            Ok(balance) => {
                let kind = match self.transfer(sender, receiver, amount).await {
                    Ok(tx_hash) => OutcomeKind::Success { tx_hash },
                    Err(e) => OutcomeKind::Failed {
                        reason: e.to_string(),
                    },
                };
                (Some(balance), kind)
            }
        };

        let outcome = TransferOutcome::new(sender.address, receiver, amount, balance, kind);
        log_outcome(&outcome);
        outcome
    }

    async fn transfer(
        &self,
        sender: &Account,
        receiver: Address,
        amount: U256,
    ) -> Result<TxHash, DispatchError> {
        let key = match &sender.key {
            AccountKey::Ready(key) => key,
            AccountKey::Malformed { reason } => {
                return Err(DispatchError::MalformedKey(reason.clone()))
            }
        };

        let nonce = self
            .client
            .get_nonce(sender.address)
            .await
            .map_err(DispatchError::client("nonce lookup"))?;
        let gas_price = self
            .client
            .get_gas_price()
            .await
            .map_err(DispatchError::client("gas price lookup"))?;

        let request = TransferRequest {
            sender: sender.address,
            receiver,
            amount,
            nonce,
            gas_limit: TRANSFER_GAS_LIMIT,
            gas_price,
            chain_id: CHAIN_ID,
        };

        let signed = request.sign(key)?;
        debug!(
            sender = %request.sender,
            nonce,
            %gas_price,
            tx_hash = %signed.tx_hash,
            "Submitting transfer"
        );

        let tx_hash = self
            .client
            .submit_raw_transaction(signed.raw)
            .await
            .map_err(DispatchError::client("submission"))?;

        if tx_hash != signed.tx_hash {
            warn!(
                local = %signed.tx_hash,
                remote = %tx_hash,
                "Node returned a different transaction hash"
            );
        }

        Ok(tx_hash)
    }
}

fn log_outcome(outcome: &TransferOutcome) {
    let amount = format_ether(outcome.amount);
    match &outcome.kind {
        OutcomeKind::Success { tx_hash } => info!(
            sender = %outcome.sender,
            receiver = %outcome.receiver,
            %amount,
            %tx_hash,
            "Transfer submitted"
        ),
        OutcomeKind::InsufficientBalance { balance } => warn!(
            sender = %outcome.sender,
            %amount,
            balance = %format_ether(*balance),
            "Insufficient balance, skipping transfer"
        ),
        OutcomeKind::Failed { reason } => warn!(
            sender = %outcome.sender,
            receiver = %outcome.receiver,
            %amount,
            %reason,
            "Transfer failed"
        ),
    }
}
