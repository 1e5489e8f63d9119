//! barwalk CLI - Paginated minute-bar downloader and opening-range monitor.

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;
mod display;

use barwalk_lib::{BarSize, DataKind};
use display::Format;

#[derive(Parser)]
#[command(name = "barwalk")]
#[command(about = "Paginated minute-bar downloader and opening-range monitor", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download minute bars over a date range, one window per request
    Fetch(FetchArgs),

    /// Compute the opening range of a session and report breakouts
    Orb(OrbArgs),
}

/// Arguments for the fetch command.
#[derive(Args)]
pub(crate) struct FetchArgs {
    /// Symbols to download (e.g., AAPL MSFT SPY)
    #[arg(required = true)]
    pub(crate) symbols: Vec<String>,

    /// Range start in exchange time (YYYY-MM-DD or YYYY-MM-DD HH:MM[:SS])
    #[arg(short, long)]
    pub(crate) start: String,

    /// Range end in exchange time. Defaults to now.
    #[arg(short, long)]
    pub(crate) end: Option<String>,

    /// Calendar days per request
    #[arg(long, default_value = "1", conflicts_with = "window_sessions")]
    pub(crate) window_days: u32,

    /// Trading sessions per request (uses the exchange calendar)
    #[arg(long)]
    pub(crate) window_sessions: Option<u32>,

    /// Bar size requested from the provider
    #[arg(short, long, default_value = "m1")]
    pub(crate) bar_size: BarSize,

    /// Resample fetched bars to a coarser size before writing
    #[arg(long)]
    pub(crate) resample: Option<BarSize>,

    /// Price series to build bars from
    #[arg(long, value_enum, default_value = "trades")]
    pub(crate) what: What,

    /// Output directory. Files named <symbol>_<start>_<end>.<format>
    #[arg(short, long, default_value = ".")]
    pub(crate) output_dir: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub(crate) format: Format,

    /// Maximum symbols fetched concurrently
    #[arg(long, default_value = "4")]
    pub(crate) concurrency: usize,

    /// Keep bars that fail price validation
    #[arg(long)]
    pub(crate) no_validate: bool,

    /// Bars shown from each end of every series
    #[arg(long, default_value = "2")]
    pub(crate) preview: usize,

    #[command(flatten)]
    pub(crate) source: SourceArgs,
}

/// Arguments for the orb command.
#[derive(Args)]
pub(crate) struct OrbArgs {
    /// Symbols to monitor
    #[arg(required = true)]
    pub(crate) symbols: Vec<String>,

    /// Session date (YYYY-MM-DD). Defaults to today in exchange time.
    #[arg(short, long)]
    pub(crate) date: Option<String>,

    /// Opening range length in minutes
    #[arg(short, long, default_value = "15")]
    pub(crate) minutes: usize,

    /// Keep polling for breakouts until the session closes or Ctrl-C
    #[arg(short, long)]
    pub(crate) watch: bool,

    /// Seconds between polls in watch mode
    #[arg(long, default_value = "60")]
    pub(crate) poll_secs: u64,

    /// Maximum symbols fetched concurrently
    #[arg(long, default_value = "4")]
    pub(crate) concurrency: usize,

    #[command(flatten)]
    pub(crate) source: SourceArgs,
}

/// Data source and request settings shared by all commands.
#[derive(Args)]
pub(crate) struct SourceArgs {
    /// Where bars come from
    #[arg(long, value_enum, default_value = "gateway")]
    pub(crate) provider: ProviderKind,

    /// Gateway API base URL
    #[arg(long, env = "BARWALK_GATEWAY_URL", default_value = barwalk_lib::DEFAULT_GATEWAY_URL)]
    pub(crate) gateway: String,

    /// Accept the gateway's self-signed certificate
    #[arg(long)]
    pub(crate) insecure: bool,

    /// Exchange timezone for parsing and rendering times
    #[arg(long, env = "BARWALK_TZ", default_value = "America/New_York")]
    pub(crate) tz: String,

    /// Include bars outside regular trading hours
    #[arg(long)]
    pub(crate) outside_rth: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "60")]
    pub(crate) timeout: u64,

    /// Retries per request for transient failures
    #[arg(long, default_value = "3")]
    pub(crate) retries: u32,
}

/// Bar data sources.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum ProviderKind {
    /// Brokerage Client Portal gateway
    Gateway,
    /// Deterministic generated bars (offline)
    Synthetic,
}

/// Price series selector.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum What {
    Trades,
    Midpoint,
    Bid,
    Ask,
}

impl From<What> for DataKind {
    fn from(what: What) -> Self {
        match what {
            What::Trades => Self::Trades,
            What::Midpoint => Self::Midpoint,
            What::Bid => Self::Bid,
            What::Ask => Self::Ask,
        }
    }
}

/// Installs the log subscriber. `RUST_LOG` overrides the flag-derived level.
fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,barwalk={level},barwalk_plan={level},barwalk_fetch={level}"
        ))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Fetch(args) => commands::fetch::fetch(args, cli.quiet).await,
        Commands::Orb(args) => commands::orb::orb(args, cli.quiet).await,
    }
}
