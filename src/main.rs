use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use acoustats::{
    cli::{self, AnalyzeOptions},
    config, error,
    stats::Timeframe,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Analyze the listening history for a timeframe
    Analyze(AnalyzeArgs),

    /// List timeframes and the dates they cover
    Timeframes,

    /// Manage the response cache
    Cache(CacheOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Timeframe to analyze, e.g. "this week" or LAST_MONTH [default: $TIMEFRAME or "this week"]
    #[clap(long, short)]
    pub timeframe: Option<Timeframe>,

    /// Number of concurrent workers per stage [default: $ANALYZER_WORKERS or 5]
    #[clap(long, short)]
    pub workers: Option<usize>,

    /// Print bare values instead of sentences
    #[clap(long)]
    pub raw: bool,

    /// Show per-worker and cache diagnostics
    #[clap(long, short)]
    pub verbose: bool,

    /// Also write the full history as tracks_<user>.csv
    #[clap(long)]
    pub history: bool,

    /// Report path [default: user_output_<user>.json]
    #[clap(long, short)]
    pub output: Option<PathBuf>,

    /// Hide progress bars
    #[clap(long)]
    pub no_progress: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CacheOptions {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CacheSubcommand {
    /// Remove expired responses
    Purge,

    /// Remove all cached responses
    Clear,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Analyze(opt) => {
            cli::analyze(AnalyzeOptions {
                timeframe: opt.timeframe,
                workers: opt.workers,
                raw: opt.raw,
                verbose: opt.verbose,
                history: opt.history,
                output: opt.output,
                no_progress: opt.no_progress,
            })
            .await
        }
        Command::Timeframes => cli::list_timeframes(),
        Command::Cache(opt) => match opt.command {
            CacheSubcommand::Purge => cli::purge_cache().await,
            CacheSubcommand::Clear => cli::clear_cache().await,
        },
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
