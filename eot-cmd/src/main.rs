mod receive;

use std::fs::File;
use std::io::{stderr, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eot::{CancelToken, ReadSource, ZmqSource, DEFAULT_ENDPOINT};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Receive symbols from a running demodulator.
    ///
    /// The demodulator must publish symbols on a ZeroMQ PUB socket, one byte per
    /// symbol. Runs until interrupted.
    Listen {
        /// Demodulator ZeroMQ endpoint.
        #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
        endpoint: String,

        #[command(flatten)]
        opts: receive::Opts,
    },
    /// Decode a capture of demodulator output, one byte per symbol.
    Replay {
        /// Input capture file
        input: PathBuf,

        #[command(flatten)]
        opts: receive::Opts,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("EOT_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || cancel.cancel()).context("installing interrupt handler")?;
    }

    match &cli.command {
        Commands::Listen { endpoint, opts } => {
            info!("listening on {endpoint}");
            let mut source = ZmqSource::connect(endpoint)
                .with_context(|| format!("failed to connect to {endpoint}"))?;
            receive::receive(&mut source, opts, &cancel)
        }
        Commands::Replay { input, opts } => {
            info!("replaying {input:?}");
            let file = File::open(input).with_context(|| format!("failed to open {input:?}"))?;
            let mut source = ReadSource::new(BufReader::new(file));
            receive::receive(&mut source, opts, &cancel)
        }
    }
}
