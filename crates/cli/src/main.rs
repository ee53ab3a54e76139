use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use scribe_pipeline::{classify_paths, classify_tree, SyncConfig};
use scribe_staleness::ChangeLevel;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scribe")]
#[command(about = "Keep design documents in sync with the source tree", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every eligible file under a project root (no writes)
    Status(StatusArgs),

    /// Classify explicit files (no writes)
    Check(CheckArgs),
}

#[derive(Args)]
struct StatusArgs {
    /// Project root
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Print every file, not only the stale ones
    #[arg(long)]
    all: bool,
}

#[derive(Args)]
struct CheckArgs {
    /// Project root
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Files to classify
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Status(args) => status(args).await,
        Commands::Check(args) => check(args).await,
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

async fn status(args: StatusArgs) -> Result<()> {
    let config = SyncConfig::new(&args.path);
    let results = classify_tree(&config).await?;

    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for (path, level) in &results {
        *counts.entry(level.as_str()).or_insert(0) += 1;
        if args.all || *level != ChangeLevel::Unchanged {
            println!("{:18} {path}", level.as_str());
        }
    }

    println!();
    for (level, count) in counts {
        println!("{level:18} {count}");
    }
    println!("{:18} {}", "total", results.len());
    Ok(())
}

async fn check(args: CheckArgs) -> Result<()> {
    let config = SyncConfig::new(&args.root);
    let results = classify_paths(&config, &args.files).await?;

    if results.is_empty() {
        log::warn!("No eligible files among the given paths");
        return Ok(());
    }
    for (path, level) in results {
        println!("{:18} {path}", level.as_str());
    }
    Ok(())
}
