use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sponsor_relay::blockchain::{ChainRpcClient, FinalityWaiter, LocalWallet, TransactionState};
use sponsor_relay::config::{load_config, validate_client, ConfigError, RelayConfig};
use sponsor_relay::observability::init_logging;
use sponsor_relay::sponsorship::{HttpGateway, Network, SponsorOptions, SponsorshipClient};
use sponsor_relay::transaction::{build, InputSpec};

#[derive(Parser)]
#[command(name = "sponsor-cli")]
#[command(about = "Run gasless transactions through a sponsorship gateway", long_about = None)]
struct Cli {
    /// TOML configuration file ([client] section).
    #[arg(short, long, env = "SPONSOR_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides client.gateway_url.
    #[arg(long)]
    gateway: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a single move call, get it sponsored, sign, execute and wait for finality
    Call {
        /// Call target, package::module::function
        #[arg(long)]
        target: String,
        /// Call input as KIND:VALUE (object, shared, u8, u64, bool, address, string, hex);
        /// shared objects are written shared:ID@INITIAL_VERSION
        #[arg(long = "arg")]
        args: Vec<String>,
        /// Allowed move call target (repeatable)
        #[arg(long = "allow-target")]
        allow_targets: Vec<String>,
        /// Allowed counterparty address (repeatable)
        #[arg(long = "allow-address")]
        allow_addresses: Vec<String>,
        #[arg(long)]
        network: Option<String>,
        /// Chain id handed to the signer, defaults to sui:<network>
        #[arg(long)]
        chain: Option<String>,
    },
    /// Query the finality state of a digest once
    Status { digest: String },
    /// Print the address of the wallet key in SPONSOR_WALLET_PRIVATE_KEY
    Address {
        #[arg(long)]
        network: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(gateway) = cli.gateway {
        config.client.gateway_url = gateway;
    }
    init_logging(&config.observability);
    validate_client(&config).map_err(ConfigError::Validation)?;

    match cli.command {
        Commands::Call {
            target,
            args,
            allow_targets,
            allow_addresses,
            network,
            chain,
        } => {
            let network = resolve_network(&config, network.as_deref())?;
            let inputs = args
                .iter()
                .map(|a| InputSpec::from_str(a))
                .collect::<Result<Vec<_>, _>>()?;
            let intent = build(&target, inputs)?;

            let mut options = SponsorOptions::new(network);
            for t in allow_targets {
                options = options.allow_target(t);
            }
            for a in allow_addresses {
                options = options.allow_address(a);
            }
            if let Some(chain) = chain {
                options = options.with_chain(chain);
            }

            let wallet = LocalWallet::from_env(&options.chain())?;
            let client = sponsorship_client(&config, Arc::new(wallet))?;

            match client.sponsor_and_execute_with_receipt(intent, &options).await {
                Ok(receipt) => print_json(&json!({
                    "digest": receipt.digest,
                    "status": receipt.status,
                    "createdObjects": receipt.created_objects,
                }))?,
                Err(e) => {
                    eprintln!("{}", e.user_message());
                    return Err(e.into());
                }
            }
        }
        Commands::Status { digest } => {
            let waiter = finality_waiter(&config)?;
            let state = match waiter.check(&digest).await? {
                TransactionState::Pending => json!({ "digest": digest, "state": "pending" }),
                TransactionState::Final(receipt) => json!({ "state": "final", "receipt": receipt }),
            };
            print_json(&state)?;
        }
        Commands::Address { network } => {
            let network = resolve_network(&config, network.as_deref())?;
            let wallet = LocalWallet::from_env(&network.default_chain())?;
            println!("{}", wallet.address());
        }
    }

    Ok(())
}

fn resolve_network(config: &RelayConfig, flag: Option<&str>) -> Result<Network, String> {
    Network::from_str(flag.unwrap_or(&config.client.network))
}

fn finality_waiter(config: &RelayConfig) -> Result<FinalityWaiter, Box<dyn std::error::Error>> {
    let rpc = ChainRpcClient::new(&config.client)?;
    Ok(FinalityWaiter::new(Arc::new(rpc))
        .with_backoff(config.client.poll_base_delay_ms, config.client.poll_max_delay_ms))
}

fn sponsorship_client(
    config: &RelayConfig,
    wallet: Arc<LocalWallet>,
) -> Result<SponsorshipClient, Box<dyn std::error::Error>> {
    let flow_timeout = Duration::from_secs(config.client.flow_timeout_secs);
    let gateway = HttpGateway::new(&config.client.gateway_url, flow_timeout)?;
    let objects = ChainRpcClient::new(&config.client)?;
    Ok(
        SponsorshipClient::new(Arc::new(gateway), wallet, finality_waiter(config)?)
            .with_object_resolver(Arc::new(objects))
            .with_timeouts(
                flow_timeout,
                Duration::from_secs(config.client.finality_timeout_secs),
            ),
    )
}

fn print_json(value: &Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
