mod check;
mod report;
mod scrape;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use pricewatch_core::FailurePolicy;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pricewatch")]
#[command(about = "Scrape product prices from storefront pages and report them with and without VAT")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch every configured endpoint and print one line per extracted price
    Scrape(ScrapeArgs),
    /// Load the targets file and check every method and selector without fetching
    Check {
        /// Targets file to load instead of `PRICEWATCH_TARGETS_PATH`
        #[arg(long)]
        targets: Option<PathBuf>,
    },
    /// List the built-in extraction methods
    Methods,
}

#[derive(Debug, Default, clap::Args)]
pub(crate) struct ScrapeArgs {
    /// Targets file to load instead of `PRICEWATCH_TARGETS_PATH`
    #[arg(long)]
    pub targets: Option<PathBuf>,

    /// Output format written to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// What to do when an endpoint fails (isolate or fail-fast)
    #[arg(long)]
    pub policy: Option<FailurePolicy>,

    /// Upper bound on simultaneous fetches
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// Fractional VAT rate, e.g. 0.2 for 20%
    #[arg(long, value_parser = pricewatch_core::parse_vat_rate)]
    pub vat_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// `name,price_excl_vat,price_incl_vat,group`
    #[default]
    Csv,
    /// One JSON object per line
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = pricewatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Scrape(args)) => scrape::run_scrape(&config, &args).await,
        Some(Commands::Check { targets }) => check::run_check(&config, targets.as_deref()),
        Some(Commands::Methods) => {
            check::run_methods();
            Ok(())
        }
        None => scrape::run_scrape(&config, &ScrapeArgs::default()).await,
    }
}
