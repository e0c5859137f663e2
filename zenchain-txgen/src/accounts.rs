use alloy_primitives::Address;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    client::{to_checksum_address, ClientError},
    config::{AccountEntry, ConfigSource},
    private_key::PrivateKey,
};

pub const SENDER_ADDRESS_PREFIX: &str = "SENDER_ADDRESS_";
pub const PRIVATE_KEY_PREFIX: &str = "PRIVATE_KEY_";

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("no sender accounts configured")]
    NoAccountsConfigured,

    #[error("account {index} has a malformed address: {source}")]
    InvalidAddress {
        index: usize,
        #[source]
        source: ClientError,
    },
}

#[derive(Clone, Debug)]
pub enum AccountKey {
    Ready(PrivateKey),
    /// Key could not be parsed. Every transfer from this account fails.
    Malformed { reason: String },
}

#[derive(Clone, Debug)]
pub struct Account {
    pub address: Address,
    pub key: AccountKey,
}

impl Account {
    /// `index` is 1-based and only used for diagnostics.
    fn load(index: usize, address: &str, private_key: &str) -> Result<Self, PoolError> {
        let address = to_checksum_address(address)
            .map_err(|source| PoolError::InvalidAddress { index, source })?;

        let key = match PrivateKey::parse(private_key) {
            Ok((derived, key)) => {
                if derived != address {
                    warn!(
                        index,
                        %address,
                        %derived,
                        "Private key does not match configured address"
                    );
                }
                AccountKey::Ready(key)
            }
            Err(e) => {
                warn!(index, %address, "Malformed private key, transfers will fail: {e}");
                AccountKey::Malformed {
                    reason: e.to_string(),
                }
            }
        };

        Ok(Self { address, key })
    }
}

/// Fixed, ordered, non-empty set of sender accounts.
#[derive(Debug)]
pub struct AccountPool {
    accounts: Vec<Account>,
}

// never empty once constructed
#[allow(clippy::len_without_is_empty)]
impl AccountPool {
    /// Uses `entries` when non-empty, otherwise discovers indexed pairs in `source`.
    pub fn load(entries: &[AccountEntry], source: &impl ConfigSource) -> Result<Self, PoolError> {
        if entries.is_empty() {
            Self::discover(source)
        } else {
            Self::from_entries(entries)
        }
    }

    pub fn from_entries(entries: &[AccountEntry]) -> Result<Self, PoolError> {
        let accounts = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| Account::load(i + 1, &entry.address, &entry.private_key))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(accounts)
    }

    /// Reads `SENDER_ADDRESS_n` / `PRIVATE_KEY_n` for n = 1, 2, ... and stops at the first
    /// index where either value is missing or blank.
    pub fn discover(source: &impl ConfigSource) -> Result<Self, PoolError> {
        let lookup = |key: String| source.get(&key).filter(|v| !v.trim().is_empty());

        let mut accounts = Vec::new();
        for index in 1.. {
            let (Some(address), Some(private_key)) = (
                lookup(format!("{SENDER_ADDRESS_PREFIX}{index}")),
                lookup(format!("{PRIVATE_KEY_PREFIX}{index}")),
            ) else {
                break;
            };
            accounts.push(Account::load(index, &address, &private_key)?);
        }

        Self::new(accounts)
    }

    fn new(accounts: Vec<Account>) -> Result<Self, PoolError> {
        if accounts.is_empty() {
            return Err(PoolError::NoAccountsConfigured);
        }
        info!(accounts = accounts.len(), "Loaded account pool");
        Ok(Self { accounts })
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Wraps around the pool.
    pub fn get(&self, index: usize) -> &Account {
        &self.accounts[index % self.accounts.len()]
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.accounts.iter().any(|a| a.address == *address)
    }
}
