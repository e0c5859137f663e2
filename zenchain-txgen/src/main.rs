use std::path::Path;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, error, info};
use tracing_subscriber::util::SubscriberInitExt;
use zenchain_txgen::{
    cli::Cli, prepare, ConsoleDisplay, Dispatcher, EnvSource, HistoryLedger, ReceiverGenerator,
    RpcChainClient, Scheduler, SchedulerConfig, TxGenConfig,
};

fn main() {
    let cli = Cli::parse();

    // before logging so RUST_LOG can come from the file
    let env_loaded = load_env_file(&cli.env_file);

    if let Err(e) = setup_logging(cli.debug_log_file) {
        eprintln!("failed to set up logging: {e:?}");
        std::process::exit(1);
    }

    match env_loaded {
        Ok(true) => debug!(path = ?cli.env_file, "Loaded env file"),
        Ok(false) => debug!(path = ?cli.env_file, "No env file found"),
        Err(e) => {
            error!("failed to load env file {:?}: {e}", cli.env_file);
            std::process::exit(1);
        }
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to build runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli)) {
        error!("{e:?}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = TxGenConfig::resolve(&cli, &EnvSource).wrap_err("invalid configuration")?;
    debug!(?config, "Resolved configuration");

    let client = RpcChainClient::new(config.rpc_url.clone(), config.request_timeout);
    let pool = prepare(&client, config.rpc_url.as_str(), &config.accounts, &EnvSource)
        .await
        .wrap_err("startup failed")?;

    let dispatcher = Dispatcher::new(client, ReceiverGenerator::from_os_rng());
    let mut scheduler = Scheduler::new(
        SchedulerConfig {
            amount: config.amount,
            delay: config.delay,
            record_policy: config.record_policy,
        },
        pool,
        dispatcher,
        HistoryLedger::new(config.history_capacity),
        ConsoleDisplay::stdout(config.currency_symbol),
    );

    tokio::select! {
        () = scheduler.run() => {}
        signal = tokio::signal::ctrl_c() => {
            signal.wrap_err("failed to listen for ctrl-c")?;
            info!("Interrupted, stopping");
        }
    }

    Ok(())
}

/// Returns whether the file existed. A missing file is not an error.
fn load_env_file(path: &Path) -> Result<bool, dotenvy::Error> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

fn setup_logging(debug_log_file: bool) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer};

    let debug_layer = if debug_log_file {
        Some(
            fmt::layer()
                .with_writer(std::fs::File::create("debug.log")?)
                .with_ansi(false)
                .with_filter(EnvFilter::new("zenchain_txgen=debug")),
        )
    } else {
        None
    };

    // stdout belongs to the transfer report
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("zenchain_txgen=info")),
    );

    tracing_subscriber::registry()
        .with(debug_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(Into::into)
}
