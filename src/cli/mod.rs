//! Command-line interface definitions.

pub mod check;
pub mod convert;
pub mod output;
pub mod scan;

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::domain::RecordView;
use crate::error::Result;

/// Surebet - Sports betting arbitrage detection and stake allocation.
#[derive(Parser, Debug)]
#[command(name = "surebet")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override log level (debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan an odds file for arbitrage opportunities
    Scan(ScanArgs),

    /// Convert an odds value between formats
    Convert(ConvertArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `surebet check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration file
    Config,
}

/// Layout of the file given to `scan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputKind {
    /// Manual upload, JSON
    Json,
    /// Manual upload, CSV
    Csv,
    /// Odds-feed event array
    Feed,
}

/// How `scan` renders results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

/// Which records `scan` shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ViewArg {
    #[default]
    All,
    Game,
    PlayerProp,
}

impl From<ViewArg> for RecordView {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::All => Self::All,
            ViewArg::Game => Self::Game,
            ViewArg::PlayerProp => Self::PlayerProp,
        }
    }
}

/// Arguments for the `scan` subcommand.
#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Odds file to scan
    pub file: PathBuf,

    /// Input layout; guessed from the file extension when omitted
    #[arg(long, value_enum)]
    pub input: Option<InputKind>,

    /// Override total stake per opportunity
    #[arg(long)]
    pub stake: Option<Decimal>,

    /// Override minimum profit percentage
    #[arg(long)]
    pub min_profit: Option<Decimal>,

    /// Records to show
    #[arg(long, value_enum, default_value_t = ViewArg::All)]
    pub view: ViewArg,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Write csv or json output to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Re-scan the file every SECS seconds until interrupted
    #[arg(long, value_name = "SECS")]
    pub watch: Option<u64>,
}

/// Arguments for the `convert` subcommand.
#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Odds in decimal (2.10), American (+150, -110) or fractional (5/2) form
    #[arg(allow_hyphen_values = true)]
    pub odds: String,
}

/// Load configuration, initialise logging and run the selected command.
///
/// # Errors
///
/// Returns the failing command's error.
pub async fn run(cli: Cli) -> Result<()> {
    let config = match cli.command {
        Commands::Check(_) => Config::load(&cli.config)?,
        _ => Config::load_or_default(&cli.config)?,
    };
    config
        .logging
        .clone()
        .with_overrides(cli.log_level.as_deref(), cli.json_logs)
        .init();

    match cli.command {
        Commands::Scan(args) => scan::execute(&args, &config).await,
        Commands::Convert(args) => convert::execute(&args.odds),
        Commands::Check(CheckCommand::Config) => check::config::execute(&cli.config, &config),
    }
}
