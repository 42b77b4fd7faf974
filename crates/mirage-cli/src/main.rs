mod commands;
mod config;
mod gif;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mirage", about = "Compare predicted GIF sequences against a ground truth")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show GIF metadata
    Info(commands::info::InfoArgs),
    /// Compute similarity metrics between two GIFs
    Compare(commands::compare::CompareArgs),
    /// Rank several candidate GIFs against one ground truth
    Rank(commands::rank::RankArgs),
    /// Export a visualization overlay of two GIFs
    Overlay(commands::overlay::OverlayArgs),
    /// Print or save the default tool configuration
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Compare(args) => commands::compare::run(args),
        Commands::Rank(args) => commands::rank::run(args),
        Commands::Overlay(args) => commands::overlay::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
