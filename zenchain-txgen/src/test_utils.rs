use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use alloy_consensus::TxEnvelope;
use alloy_eips::eip2718::Decodable2718;
use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_transport::TransportErrorKind;

use crate::{
    client::{ChainClient, ClientError},
    display::DisplaySink,
    history::HistoryLedger,
    outcome::TransferOutcome,
    CHAIN_ID,
};

// Well known anvil/hardhat dev accounts
pub const ANVIL_KEY_0: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const ANVIL_ADDRESS_0: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const ANVIL_KEY_1: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const ANVIL_ADDRESS_1: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

pub const ONE_GWEI: u128 = 1_000_000_000;

struct MockState {
    connected: bool,
    chain_id: u64,
    gas_price: u128,
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    fail_balance_reads: bool,
    reject_submissions: Option<(i64, String)>,
    calls: HashMap<&'static str, usize>,
    submitted: Vec<TxEnvelope>,
}

/// In-memory chain. Submitted transactions are decoded, checked against the signer's
/// nonce and balance, and applied immediately.
#[derive(Clone)]
pub struct MockChainClient {
    state: Arc<Mutex<MockState>>,
}

impl MockChainClient {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                connected: true,
                chain_id: CHAIN_ID,
                gas_price: ONE_GWEI,
                balances: HashMap::new(),
                nonces: HashMap::new(),
                fail_balance_reads: false,
                reject_submissions: None,
                calls: HashMap::new(),
                submitted: Vec::new(),
            })),
        }
    }

    pub fn with_balance(self, address: Address, balance: U256) -> Self {
        self.state.lock().unwrap().balances.insert(address, balance);
        self
    }

    pub fn with_nonce(self, address: Address, nonce: u64) -> Self {
        self.state.lock().unwrap().nonces.insert(address, nonce);
        self
    }

    pub fn set_connected(&self, connected: bool) {
        self.state.lock().unwrap().connected = connected;
    }

    pub fn set_chain_id(&self, chain_id: u64) {
        self.state.lock().unwrap().chain_id = chain_id;
    }

    pub fn fail_balance_reads(&self) {
        self.state.lock().unwrap().fail_balance_reads = true;
    }

    pub fn reject_submissions(&self, code: i64, message: &str) {
        self.state.lock().unwrap().reject_submissions = Some((code, message.to_string()));
    }

    pub fn balance(&self, address: Address) -> U256 {
        let state = self.state.lock().unwrap();
        state.balances.get(&address).copied().unwrap_or_default()
    }

    pub fn nonce(&self, address: Address) -> u64 {
        let state = self.state.lock().unwrap();
        state.nonces.get(&address).copied().unwrap_or_default()
    }

    pub fn calls(&self, method: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.calls.get(method).copied().unwrap_or_default()
    }

    pub fn submitted(&self) -> Vec<TxEnvelope> {
        self.state.lock().unwrap().submitted.clone()
    }

    fn enter(&self, method: &'static str) -> std::sync::MutexGuard<'_, MockState> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(method).or_default() += 1;
        state
    }
}

impl ChainClient for MockChainClient {
    async fn is_connected(&self) -> bool {
        self.enter("is_connected").connected
    }

    async fn chain_id(&self) -> Result<u64, ClientError> {
        let state = self.enter("chain_id");
        if !state.connected {
            return Err(TransportErrorKind::custom_str("connection refused").into());
        }
        Ok(state.chain_id)
    }

    async fn get_balance(&self, address: Address) -> Result<U256, ClientError> {
        let state = self.enter("get_balance");
        if state.fail_balance_reads {
            return Err(ClientError::Timeout {
                method: "eth_getBalance",
                timeout: Duration::from_secs(30),
            });
        }
        Ok(state.balances.get(&address).copied().unwrap_or_default())
    }

    async fn get_nonce(&self, address: Address) -> Result<u64, ClientError> {
        let state = self.enter("get_nonce");
        Ok(state.nonces.get(&address).copied().unwrap_or_default())
    }

    async fn get_gas_price(&self) -> Result<u128, ClientError> {
        Ok(self.enter("get_gas_price").gas_price)
    }

    async fn submit_raw_transaction(&self, raw: Bytes) -> Result<TxHash, ClientError> {
        let mut state = self.enter("submit_raw_transaction");
        let rejected = |message: &str| ClientError::Rejected {
            code: -32000,
            message: message.to_string(),
        };

        if let Some((code, message)) = state.reject_submissions.clone() {
            return Err(ClientError::Rejected { code, message });
        }

        let envelope =
            TxEnvelope::decode_2718(&mut raw.as_ref()).map_err(|_| rejected("invalid rlp"))?;
        let TxEnvelope::Legacy(signed) = &envelope else {
            return Err(rejected("unsupported transaction type"));
        };
        let sender = signed
            .recover_signer()
            .map_err(|_| rejected("invalid signature"))?;
        let tx = signed.tx();

        let nonce = state.nonces.get(&sender).copied().unwrap_or_default();
        if tx.nonce != nonce {
            return Err(rejected("nonce mismatch"));
        }

        let cost = tx.value + U256::from(tx.gas_limit) * U256::from(tx.gas_price);
        let balance = state.balances.get(&sender).copied().unwrap_or_default();
        if balance < cost {
            return Err(rejected("insufficient funds for gas * price + value"));
        }

        let tx_hash = *signed.hash();
        state.balances.insert(sender, balance - cost);
        state.nonces.insert(sender, nonce + 1);
        if let Some(to) = tx.to.to() {
            *state.balances.entry(*to).or_default() += tx.value;
        }
        state.submitted.push(envelope.clone());

        Ok(tx_hash)
    }
}

#[derive(Clone, Debug)]
pub struct Report {
    pub outcome: TransferOutcome,
    pub history_len: usize,
}

/// Captures everything handed to the display.
#[derive(Clone, Default)]
pub struct RecordingSink {
    reports: Arc<Mutex<Vec<Report>>>,
}

impl RecordingSink {
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }
}

impl DisplaySink for RecordingSink {
    fn report(&mut self, outcome: &TransferOutcome, history: &HistoryLedger) {
        self.reports.lock().unwrap().push(Report {
            outcome: outcome.clone(),
            history_len: history.len(),
        });
    }
}
