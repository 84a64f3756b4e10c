mod prompt;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use wallet_sync_core::display::{format_accounts, format_transactions, render};
use wallet_sync_core::sync::{FeedState, PagerState};
use wallet_sync_core::wallet::{Network, NetworkConfig, Wallet};
use wallet_sync_core::{
    Account, NetworkClient, Screen, SubmissionPhase, SyncConfig, WalletSession,
};
use zeroize::Zeroizing;

use crate::prompt::TerminalPrompt;

const MNEMONIC_ENV: &str = "WALLET_SYNC_MNEMONIC";

#[derive(Parser)]
#[command(
    name = "wallet-sync",
    about = "Live balances, history and transfers for a light wallet",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use testnet (default)
    #[arg(long, global = true)]
    testnet: bool,

    /// Use mainnet
    #[arg(long, global = true)]
    mainnet: bool,

    /// Use devnet
    #[arg(long, global = true)]
    devnet: bool,

    /// Custom node URL
    #[arg(long, global = true)]
    node: Option<String>,

    /// Allow connecting to non-HTTPS node URLs
    #[arg(long, global = true)]
    insecure: bool,

    /// Number of accounts to derive from the mnemonic
    #[arg(long, global = true, default_value_t = 1)]
    accounts: u64,

    /// Seconds between re-polls (overrides the config file)
    #[arg(long, global = true)]
    poll_interval: Option<u64>,

    /// Transactions per history page (overrides the config file)
    #[arg(long, global = true)]
    page_size: Option<u64>,

    /// Config file (default: <config dir>/wallet-sync/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the balance of every account
    Balances {
        /// Keep polling and print every update until Ctrl-C
        #[arg(long)]
        watch: bool,
    },
    /// Show transaction history for one address
    History {
        /// Address to show (default: first account)
        #[arg(long)]
        address: Option<String>,
        /// Load this many extra pages
        #[arg(long, default_value_t = 0)]
        more: u32,
        /// Keep polling and print every update until Ctrl-C
        #[arg(long)]
        watch: bool,
    },
    /// Send a transfer
    Send {
        /// Sending account index
        #[arg(long, default_value_t = 0)]
        from: usize,
        /// Recipient address (0x...)
        #[arg(long)]
        to: String,
        /// Amount in whole units, e.g. 1.5
        #[arg(long)]
        amount: String,
        /// Optional memo (max 128 bytes)
        #[arg(long, default_value = "")]
        memo: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

impl Cli {
    fn network_config(&self) -> NetworkConfig {
        if let Some(url) = &self.node {
            NetworkConfig {
                network: Network::Custom,
                custom_url: Some(url.clone()),
            }
        } else if self.mainnet {
            NetworkConfig {
                network: Network::Mainnet,
                custom_url: None,
            }
        } else if self.devnet {
            NetworkConfig {
                network: Network::Devnet,
                custom_url: None,
            }
        } else {
            NetworkConfig {
                network: Network::Testnet,
                custom_url: None,
            }
        }
    }

    fn has_explicit_network_flags(&self) -> bool {
        self.testnet || self.mainnet || self.devnet || self.node.is_some()
    }

    /// Validate that at most one network flag is set.
    fn validate_network_flags(&self) -> Result<()> {
        let count = self.testnet as u8
            + self.mainnet as u8
            + self.devnet as u8
            + self.node.is_some() as u8;
        if count > 1 {
            bail!(
                "Conflicting network flags. Use only one of --testnet, --mainnet, --devnet, or --node."
            );
        }
        Ok(())
    }

    /// Config file values, overridden by whatever was given on the command line.
    fn resolve_config(&self) -> Result<SyncConfig> {
        let mut config = match &self.config {
            Some(path) => SyncConfig::load(path)?,
            None => SyncConfig::load_default()?,
        };
        if self.has_explicit_network_flags() {
            let cli_config = self.network_config();
            if cli_config != config.network {
                debug!(
                    from = %config.network.network,
                    to = %cli_config.network,
                    "network flag overrides config file"
                );
            }
            config.network = cli_config;
        }
        if self.insecure {
            config.allow_insecure = true;
        }
        if let Some(secs) = self.poll_interval {
            config.poll_interval_secs = secs;
        }
        if let Some(size) = self.page_size {
            config.page_size = size;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_mnemonic() -> Result<Zeroizing<String>> {
    if let Ok(mnemonic) = std::env::var(MNEMONIC_ENV) {
        return Ok(Zeroizing::new(mnemonic));
    }
    Ok(Zeroizing::new(
        rpassword::prompt_password("Mnemonic: ").context("Failed to read mnemonic")?,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli.validate_network_flags()?;

    let config = cli.resolve_config()?;
    let mnemonic = read_mnemonic()?;
    let wallet = Wallet::from_mnemonic(&mnemonic, cli.accounts, config.network.clone())?;
    if wallet.is_mainnet() {
        warn!("connected to mainnet");
    }
    let network = NetworkClient::new(&config.network, config.allow_insecure)?;
    debug!(node = network.node_url(), network = %network.network(), "node client ready");

    let mut session = WalletSession::new(wallet, Arc::new(network), &config);
    let outcome = run(&cli.command, &mut session).await;
    session.close();
    outcome
}

async fn run(command: &Commands, session: &mut WalletSession) -> Result<()> {
    match command {
        Commands::Balances { watch } => {
            session.navigate(Screen::Accounts);
            let mut rx = session.accounts().subscribe();
            if *watch {
                watch_until_ctrl_c(&mut rx, print_accounts).await
            } else {
                let state = rx
                    .wait_for(|s| s.data.is_succeeded() || s.data.is_failed())
                    .await
                    .context("Accounts view closed")?
                    .clone();
                print_accounts(&state);
                if let Some(msg) = state.data.error() {
                    bail!("{msg}");
                }
                Ok(())
            }
        }
        Commands::History {
            address,
            more,
            watch,
        } => {
            session.navigate(Screen::Transactions);
            if let Some(address) = address {
                session.history().select_address(address).await;
            }
            let mut rx = session.history().subscribe();
            rx.wait_for(page_settled)
                .await
                .context("History view closed")?;
            for _ in 0..*more {
                session.history().load_more().await;
            }
            if *watch {
                watch_until_ctrl_c(&mut rx, print_history).await
            } else {
                let state = rx.borrow_and_update().clone();
                print_history(&state);
                if let Some(msg) = state.selected_page().and_then(|p| p.transactions.error()) {
                    bail!("{msg}");
                }
                Ok(())
            }
        }
        Commands::Send {
            from,
            to,
            amount,
            memo,
            yes,
        } => {
            session.navigate(Screen::Send);
            let form = session.send().form();
            form.select_account(*from)?;
            form.set_recipient(to)?;
            form.set_amount(amount)?;
            form.set_memo(memo)?;

            let prompt = TerminalPrompt::new(*yes);
            session.send().submit(&prompt).await;
            match session.send().form().phase() {
                SubmissionPhase::Failed => bail!("Transfer failed."),
                _ => Ok(()),
            }
        }
    }
}

fn page_settled(state: &PagerState) -> bool {
    state
        .selected_page()
        .is_some_and(|p| p.transactions.is_succeeded() || p.transactions.is_failed())
}

fn print_accounts(state: &FeedState<Vec<Account>>) {
    println!(
        "{}",
        render(&state.data, "Loading accounts…", |accounts| format_accounts(accounts))
    );
    if let Some(msg) = &state.stale_error {
        eprintln!("Refresh failed, showing last known balances: {msg}");
    }
}

fn print_history(state: &PagerState) {
    let Some(page) = state.selected_page() else {
        println!("No address selected.");
        return;
    };
    println!("Address: {}", page.address);
    println!(
        "{}",
        render(&page.transactions, "Loading…", |txs| format_transactions(page, txs))
    );
}

/// Print every published state until Ctrl-C.
async fn watch_until_ctrl_c<T>(rx: &mut watch::Receiver<T>, print: fn(&T)) -> Result<()> {
    print(&rx.borrow_and_update());
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                debug!("interrupted");
                return Ok(());
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                print(&rx.borrow_and_update());
            }
        }
    }
}
