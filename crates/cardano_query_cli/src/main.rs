//! cardano-query CLI: utxos, balance, params.

use cardano_query::currency::format_ada;
use cardano_query::{
    BalanceReport, Config, FetchConfig, QueryApi, QueryClient, RemoteData, Value,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let config = resolve_config(&cli.backend)?;
    let fetch = FetchConfig {
        timeout: cli.backend.timeout_secs.map(Duration::from_secs),
        ..Default::default()
    };
    let client = QueryClient::from_config(&config, fetch)?;
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    match cli.command {
        Command::Utxos(args) => rt.block_on(run_utxos(&client, args)),
        Command::Balance(args) => rt.block_on(run_balance(&client, &config, args)),
        Command::Params => rt.block_on(run_params(&client)),
    }
}

#[derive(Parser)]
#[command(name = "cardano-query")]
#[command(author = "gorusys <goru.connector@outlook.com>")]
#[command(about = "Balance and protocol parameters of Cardano addresses (GraphQL or Blockfrost)")]
struct Cli {
    #[command(flatten)]
    backend: BackendArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct BackendArgs {
    /// JSON config file. Without it the environment is read.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, conflicts_with = "config")]
    testnet: bool,
    /// Use this cardano-graphql endpoint.
    #[arg(long, conflicts_with = "blockfrost")]
    graphql: Option<String>,
    /// Use this Blockfrost-style base URL.
    #[arg(long)]
    blockfrost: Option<String>,
    #[arg(long, requires = "blockfrost")]
    project_id: Option<String>,
    /// Request timeout in seconds. Unset waits forever.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// List UTxOs at an address.
    Utxos(UtxosArgs),
    /// Total balance of one or more addresses.
    Balance(BalanceArgs),
    /// Current protocol parameters.
    Params,
}

#[derive(Parser)]
struct UtxosArgs {
    #[arg(long)]
    address: String,
}

#[derive(Parser)]
struct BalanceArgs {
    #[arg(long, required = true)]
    address: Vec<String>,
    /// Use the indexer's per-address summaries (GraphQL only).
    #[arg(long)]
    summary: bool,
    /// Plain text instead of JSON.
    #[arg(long)]
    human: bool,
}

fn resolve_config(args: &BackendArgs) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => {
            let testnet = args.testnet;
            Config::from_lookup(|key| {
                if testnet && key == "CARDANO_TESTNET" {
                    return Some("1".to_string());
                }
                std::env::var(key).ok()
            })?
        }
    };
    if let Some(uri) = &args.graphql {
        config.query_api = QueryApi::GraphQl { uri: uri.clone() };
    } else if let Some(base_url) = &args.blockfrost {
        config.query_api = QueryApi::Blockfrost {
            base_url: base_url.clone(),
            project_id: args.project_id.clone(),
        };
    }
    config.validate()?;
    Ok(config)
}

/// Unwrap a terminal state, or report the failure and exit non-zero.
fn settle<T>(state: RemoteData<T>) -> T {
    match state.into_result() {
        Some(Ok(data)) => data,
        Some(Err(e)) => {
            match e.status() {
                Some(status) => eprintln!("FAILED\tstatus={}\t{}", status, e),
                None => eprintln!("FAILED\t{}", e),
            }
            std::process::exit(1);
        }
        None => {
            eprintln!("FAILED\tquery did not complete");
            std::process::exit(1);
        }
    }
}

async fn run_utxos(client: &QueryClient, args: UtxosArgs) -> Result<(), Box<dyn std::error::Error>> {
    let utxos = settle(client.utxos(&args.address).await);
    info!(count = utxos.len(), backend = %client.backend(), "utxos");
    println!("{}", serde_json::to_string_pretty(&utxos)?);
    Ok(())
}

async fn run_balance(
    client: &QueryClient,
    config: &Config,
    args: BalanceArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let value = if args.summary {
        settle(client.balance_summary(&args.address).await)
    } else {
        let mut total = Value::default();
        for address in &args.address {
            let value = settle(client.utxo_balance(address).await);
            total = total.merge(&value);
        }
        total
    };
    let report = BalanceReport::new(config, args.address, &value);
    if args.human {
        println!("{}", format_ada(&value.lovelace, config.network));
        for line in &report.assets {
            println!("{}\t{}\t{}", line.quantity, line.display_name, line.policy_id);
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    info!(assets = report.assets.len(), "balance complete");
    Ok(())
}

async fn run_params(client: &QueryClient) -> Result<(), Box<dyn std::error::Error>> {
    let params = settle(client.protocol_parameters().await);
    println!("{}", serde_json::to_string_pretty(&params)?);
    Ok(())
}
