use std::{collections::HashMap, fmt, path::PathBuf, time::Duration};

use alloy_primitives::{utils::parse_ether, U256};
use clap::ValueEnum;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::{
    cli::Cli, outcome::TransferOutcome, DEFAULT_AMOUNT, DEFAULT_CURRENCY_SYMBOL,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_RPC_URL, DEFAULT_TX_DELAY, MAX_HISTORY,
};

pub const RPC_URL_KEY: &str = "RPC_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid rpc url {value:?}: {source}")]
    InvalidRpcUrl {
        value: String,
        source: url::ParseError,
    },

    #[error("invalid transfer amount {value:?}: {reason}")]
    InvalidAmount { value: String, reason: String },

    #[error("{name} must be a finite number of seconds, got {value}")]
    InvalidDuration { name: &'static str, value: f64 },

    #[error("history capacity must be at least 1")]
    ZeroHistoryCapacity,
}

/// Key-value lookup for settings that traditionally live in the environment.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Which dispatch outcomes are persisted to the history ledger. Every outcome is
/// reported to the display regardless.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RecordPolicy {
    #[default]
    All,
    SuccessOnly,
}

impl RecordPolicy {
    pub fn should_record(self, outcome: &TransferOutcome) -> bool {
        match self {
            RecordPolicy::All => true,
            RecordPolicy::SuccessOnly => outcome.is_success(),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountEntry {
    pub address: String,
    pub private_key: String,
}

impl fmt::Debug for AccountEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountEntry")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// On-disk TOML settings. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub rpc_url: Option<Url>,
    pub amount: Option<String>,
    pub delay_secs: Option<f64>,
    pub history_capacity: Option<usize>,
    pub request_timeout_secs: Option<f64>,
    pub record_policy: Option<RecordPolicy>,
    pub currency_symbol: Option<String>,
    #[serde(default)]
    pub accounts: Vec<AccountEntry>,
}

impl FileConfig {
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

/// Fully resolved and validated generator settings.
#[derive(Clone, Debug)]
pub struct TxGenConfig {
    pub rpc_url: Url,
    /// Wei sent per transfer, always > 0.
    pub amount: U256,
    pub delay: Duration,
    pub history_capacity: usize,
    pub request_timeout: Duration,
    pub record_policy: RecordPolicy,
    pub currency_symbol: String,
    /// Accounts listed in the config file. Empty means discover from the key-value source.
    pub accounts: Vec<AccountEntry>,
}

impl TxGenConfig {
    /// Precedence is CLI flag, then config file, then `RPC_URL` from `source`, then the
    /// built-in default.
    pub fn resolve(cli: &Cli, source: &impl ConfigSource) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path.clone())?,
            None => FileConfig::default(),
        };
        Self::from_parts(cli, file, source)
    }

    pub fn from_parts(
        cli: &Cli,
        file: FileConfig,
        source: &impl ConfigSource,
    ) -> Result<Self, ConfigError> {
        let rpc_url = match cli.rpc_url.clone().or(file.rpc_url) {
            Some(url) => url,
            None => {
                let value = source
                    .get(RPC_URL_KEY)
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
                Url::parse(value.trim())
                    .map_err(|source| ConfigError::InvalidRpcUrl { value, source })?
            }
        };

        let amount = cli
            .amount
            .as_deref()
            .or(file.amount.as_deref())
            .unwrap_or(DEFAULT_AMOUNT);
        let amount = parse_amount(amount)?;

        let delay = match cli.delay_secs.or(file.delay_secs) {
            Some(secs) => secs_to_duration("delay", secs)?,
            None => DEFAULT_TX_DELAY,
        };

        let request_timeout = match cli.request_timeout_secs.or(file.request_timeout_secs) {
            Some(secs) => secs_to_duration("request timeout", secs)?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };
        if request_timeout.is_zero() {
            return Err(ConfigError::InvalidDuration {
                name: "request timeout",
                value: 0.,
            });
        }

        let history_capacity = cli
            .history_capacity
            .or(file.history_capacity)
            .unwrap_or(MAX_HISTORY);
        if history_capacity == 0 {
            return Err(ConfigError::ZeroHistoryCapacity);
        }

        Ok(Self {
            rpc_url,
            amount,
            delay,
            history_capacity,
            request_timeout,
            record_policy: cli.record_policy.or(file.record_policy).unwrap_or_default(),
            currency_symbol: cli
                .currency_symbol
                .clone()
                .or(file.currency_symbol)
                .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string()),
            accounts: file.accounts,
        })
    }
}

/// Parses a whole-currency decimal (18 decimals) into wei. Must be strictly positive.
pub fn parse_amount(value: &str) -> Result<U256, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidAmount {
        value: value.to_string(),
        reason,
    };

    let trimmed = value.trim();
    if trimmed.starts_with('-') {
        return Err(invalid("must not be negative".to_string()));
    }

    let wei = parse_ether(trimmed).map_err(|e| invalid(e.to_string()))?;
    if wei.is_zero() {
        return Err(invalid("must be greater than zero".to_string()));
    }
    Ok(wei)
}

fn secs_to_duration(name: &'static str, secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidDuration { name, value: secs })
}
