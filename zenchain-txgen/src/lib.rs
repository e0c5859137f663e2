#![allow(async_fn_in_trait)]

//! Continuous native-token transfer generator for the Zenchain testnet.
//!
//! A fixed pool of funded accounts is walked in order, forever. For every account a
//! small transfer to a freshly generated throwaway address is signed and broadcast,
//! and the outcome is recorded in a bounded history that is shown after each step.

use std::time::Duration;

pub mod accounts;
pub mod cli;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod display;
pub mod history;
pub mod outcome;
pub mod private_key;
pub mod receiver;
pub mod scheduler;
pub mod setup;

#[cfg(test)]
pub(crate) mod test_utils;

pub use accounts::{Account, AccountKey, AccountPool, PoolError};
pub use client::{to_checksum_address, ChainClient, ClientError, RpcChainClient};
pub use config::{ConfigError, ConfigSource, EnvSource, RecordPolicy, TxGenConfig};
pub use dispatcher::{DispatchError, Dispatcher, SignedTransfer, TransferRequest};
pub use display::{ConsoleDisplay, DisplaySink};
pub use history::HistoryLedger;
pub use outcome::{OutcomeKind, TransferOutcome};
pub use private_key::{KeyError, PrivateKey};
pub use receiver::ReceiverGenerator;
pub use scheduler::{Scheduler, SchedulerConfig};
pub use setup::{prepare, SetupError};

/// Zenchain testnet chain id, embedded in every signed transaction.
pub const CHAIN_ID: u64 = 8408;

/// Gas used by a plain value transfer with no call data.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

pub const DEFAULT_RPC_URL: &str = "https://zenchain-testnet.api.onfinality.io/public";
pub const DEFAULT_AMOUNT: &str = "0.1";
pub const DEFAULT_TX_DELAY: Duration = Duration::from_secs(15);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CURRENCY_SYMBOL: &str = "ZCX";

/// Default number of outcomes kept in the history ledger.
pub const MAX_HISTORY: usize = 10;
