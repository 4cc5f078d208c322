use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use workhealth_core::CoreError;

mod commands;

#[derive(Parser)]
#[command(name = "workhealth", version, about = "Work health scoring for a calendar day")]
struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a day and print the metrics
    Analyze(commands::analyze::AnalyzeArgs),
    /// Score a day and explain it for one dashboard tab
    Report(commands::report::ReportArgs),
    /// Print the insight cache key for a day and tab
    CacheKey(commands::cache_key::CacheKeyArgs),
    /// Insight cache management
    Cache {
        #[command(subcommand)]
        action: commands::cache::CacheAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Report(args) => commands::report::run(args),
        Commands::CacheKey(args) => commands::cache_key::run(args),
        Commands::Cache { action } => commands::cache::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        if e.downcast_ref::<CoreError>().is_some_and(CoreError::is_retryable) {
            eprintln!("hint: the calendar provider is temporarily unavailable, retry later");
        }
        std::process::exit(1);
    }
}
