//! CLI for the Kinetic news analytics server.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::missing_docs_in_private_items
)]

mod query;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use kinetic::{Client, ClientConfig, ErrorClass};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kinetic", version, about = "Query the Kinetic news analytics server")]
struct Cli {
    #[command(flatten)]
    connect: ConnectArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Connection options shared by every query command.
#[derive(clap::Args)]
struct ConnectArgs {
    /// JSON configuration file; flags override its values.
    #[arg(long, global = true, env = "KINETIC_CONFIG")]
    config: Option<PathBuf>,

    /// Server host.
    #[arg(long, global = true, env = "KINETIC_HOST")]
    host: Option<String>,

    /// Server port.
    #[arg(long, global = true, env = "KINETIC_PORT")]
    port: Option<u16>,

    /// Identifier sent in the handshake.
    #[arg(long, global = true, env = "KINETIC_CLIENT_ID")]
    client_id: Option<String>,

    /// Seconds allowed for the whole exchange.
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch raw chart data or articles.
    Fetch(query::FetchArgs),

    /// Show the positive/negative/normal breakdown of matching articles.
    Sentiment(query::SentimentArgs),

    /// Generate shell completion scripts.
    #[command(hide = true)]
    Completion {
        /// Target shell.
        shell: Shell,
    },
}

/// Output format for query results.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable table.
    #[default]
    Table,
    /// Machine-readable JSON.
    Json,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(parse_exit_code(&e));
        }
    };
    init_tracing(cli.verbose);
    if let Err(e) = cli.dispatch() {
        eprintln!("kinetic: {e:#}");
        std::process::exit(exit_code(&e));
    }
}

impl Cli {
    fn dispatch(self) -> Result<()> {
        match self.command {
            Command::Fetch(args) => args.run(&self.connect.client()?),
            Command::Sentiment(args) => args.run(&self.connect.client()?),
            Command::Completion { shell } => {
                clap_complete::generate(
                    shell,
                    &mut Self::command(),
                    "kinetic",
                    &mut std::io::stdout(),
                );
                Ok(())
            }
        }
    }
}

impl ConnectArgs {
    /// Layers flags over the config file over built-in defaults.
    fn config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)
                .with_context(|| format!("load config {}", path.display()))?,
            None => ClientConfig::default(),
        };
        if let Some(host) = &self.host {
            config = config.host(host.clone());
        }
        if let Some(port) = self.port {
            config = config.port(port);
        }
        if let Some(id) = &self.client_id {
            config = config.client_id(id.clone());
        }
        if let Some(secs) = self.timeout {
            config = config.deadline(Duration::from_secs(secs));
        }
        Ok(config)
    }

    fn client(&self) -> Result<Client> {
        let config = self.config()?;
        tracing::debug!(addr = %config.addr(), client_id = %config.client_id, "client configured");
        Ok(Client::new(config)?)
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kinetic={level},kinetic_proto={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Exit status for a command line clap refused: 0 for `--help` and
/// `--version`, otherwise 1 like any other caller error.
fn parse_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Maps the failure class to the process exit status.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<kinetic::Error>().map(kinetic::Error::class) {
        Some(ErrorClass::Network) => 2,
        Some(ErrorClass::Protocol) => 3,
        _ => 1,
    }
}
