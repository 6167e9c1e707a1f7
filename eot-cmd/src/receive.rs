use std::io::stdout;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use eot::{
    CancelToken, ConsoleReport, CsvLog, Dispatcher, Format, SymbolFormat, SymbolSource,
    SyncOpts, DEFAULT_WINDOW,
};
use tracing::info;

#[derive(Debug, Clone)]
pub enum Symbols {
    Binary,
    Ascii,
}

impl clap::ValueEnum for Symbols {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Binary, Self::Ascii]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Binary => Some(
                clap::builder::PossibleValue::new("binary").help("0x00 and 0x01 bytes"),
            ),
            Self::Ascii => {
                Some(clap::builder::PossibleValue::new("ascii").help("'0' and '1' characters"))
            }
        }
    }
}

impl From<&Symbols> for SymbolFormat {
    fn from(value: &Symbols) -> Self {
        match value {
            Symbols::Binary => SymbolFormat::Binary,
            Symbols::Ascii => SymbolFormat::Ascii,
        }
    }
}

#[derive(Debug, Clone)]
pub enum OutputFormat {
    Text,
    Json,
}

impl clap::ValueEnum for OutputFormat {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Text, Self::Json]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Text => Some(clap::builder::PossibleValue::new("text")),
            Self::Json => Some(clap::builder::PossibleValue::new("json")),
        }
    }
}

impl From<&OutputFormat> for Format {
    fn from(value: &OutputFormat) -> Self {
        match value {
            OutputFormat::Text => Format::Text,
            OutputFormat::Json => Format::Json,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct Opts {
    /// Directory for the CSV packet log. A new log named for the start time is
    /// created on every run.
    #[arg(short, long, default_value = "logs", value_name = "path")]
    log_dir: PathBuf,

    /// Do not write a CSV packet log.
    #[arg(long, action)]
    no_log: bool,

    /// Number of symbols in the sync search window.
    #[arg(short, long, default_value_t = DEFAULT_WINDOW)]
    window: usize,

    /// Encoding of each symbol byte.
    #[arg(short, long, default_value = "binary")]
    symbols: Symbols,

    /// Console output format.
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

pub fn receive(source: &mut dyn SymbolSource, opts: &Opts, cancel: &CancelToken) -> Result<()> {
    let sync_opts = SyncOpts::new().with_window(opts.window);
    let mut dispatcher = Dispatcher::new(&sync_opts)
        .context("invalid sync options")?
        .with_symbol_format((&opts.symbols).into())
        .with_sink(Box::new(ConsoleReport::new(
            stdout(),
            (&opts.format).into(),
        )));

    if !opts.no_log {
        let log = CsvLog::create_in(&opts.log_dir)
            .with_context(|| format!("failed to create log in {:?}", opts.log_dir))?;
        info!("logging packets to {:?}", log.path());
        dispatcher = dispatcher.with_sink(Box::new(log));
    }

    let stats = dispatcher.run(source, cancel)?;
    info!(
        symbols = stats.symbols,
        packets = stats.packets,
        "receive finished"
    );
    Ok(())
}
