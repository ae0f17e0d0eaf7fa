use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod error;
mod jwks2pem;
mod pem2jwks;
mod utils;

use error::Result;

#[derive(Parser)]
#[command(name = "kagi")]
#[command(version, about = "Convert keys between PEM and JSON Web Key Sets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert PEM keys, private keys or certificates to a JWKS
    Pem2jwks {
        #[command(flatten)]
        config: pem2jwks::Config,
    },
    /// Convert a JWKS to PEM keys
    Jwks2pem {
        #[command(flatten)]
        config: jwks2pem::Config,
    },
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only JSON or PEM.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Pem2jwks { config } => pem2jwks::execute(config),
        Commands::Jwks2pem { config } => jwks2pem::execute(config),
    }
}
