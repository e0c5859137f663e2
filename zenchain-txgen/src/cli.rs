use std::path::PathBuf;

use clap::Parser;
use url::Url;

use crate::config::RecordPolicy;

#[derive(Debug, Default, Parser)]
#[command(name = "zenchain-txgen", about, long_about = None)]
pub struct Cli {
    /// TOML file with generator settings and an optional `[[accounts]]` list
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON-RPC endpoint. Falls back to `RPC_URL`, then the public testnet endpoint
    #[arg(long)]
    pub rpc_url: Option<Url>,

    /// Native amount sent per transfer, in whole ZCX (e.g. "0.1")
    #[arg(long)]
    pub amount: Option<String>,

    /// Pause after every account, in seconds
    #[arg(long)]
    pub delay_secs: Option<f64>,

    /// Number of recent outcomes kept and displayed
    #[arg(long)]
    pub history_capacity: Option<usize>,

    /// Upper bound on every JSON-RPC call, in seconds
    #[arg(long)]
    pub request_timeout_secs: Option<f64>,

    /// Which outcomes are kept in the history
    #[arg(long, value_enum)]
    pub record_policy: Option<RecordPolicy>,

    /// Symbol shown next to native amounts
    #[arg(long)]
    pub currency_symbol: Option<String>,

    /// Dotenv file loaded into the environment before accounts are discovered
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,

    /// Writes `DEBUG` logs to ./debug.log
    #[arg(long, default_value_t = false)]
    pub debug_log_file: bool,
}
