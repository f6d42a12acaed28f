//! gmix CLI - fit online mixture models to recorded observation streams.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser)]
#[command(name = "gmix")]
#[command(author, version, about = "gmix - Online Gaussian mixture regression", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default gmix.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Print the effective configuration
    Config,

    /// Fit a model to a JSON-lines observation stream
    Fit {
        /// Input file, one observation object per line
        input: String,

        /// Model name (default: from gmix.toml)
        #[arg(short, long)]
        name: Option<String>,

        /// Write a JSON snapshot of the fitted model here
        #[arg(short, long)]
        snapshot: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Config => commands::config::run(),
        Commands::Fit {
            input,
            name,
            snapshot,
        } => commands::fit::run(&input, name, snapshot),
    }
}
