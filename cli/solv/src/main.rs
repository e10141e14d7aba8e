//! Solv CLI: inspect package repository metadata from the command line.

mod commands;
mod digest;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "solv", version, about = "Package repository metadata tools")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a susetags file and print its solvables
    Decode {
        /// Susetags file to decode (`-` for stdin)
        file: PathBuf,
        /// Decode options file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Vendor recorded on every solvable (overrides the options file)
        #[arg(long)]
        vendor: Option<String>,
        /// Skip descriptive attributes
        #[arg(long)]
        no_attributes: bool,
        /// Output format (human, json)
        #[arg(long)]
        format: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Decode {
            file,
            config,
            vendor,
            no_attributes,
            format,
        } => commands::decode::run(
            &file,
            config.as_deref(),
            vendor.as_deref(),
            no_attributes,
            format.as_deref(),
        ),
    }
}

/// Log to stderr. `RUST_LOG` takes precedence over `--verbose`.
fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
