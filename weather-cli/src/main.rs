//! Binary crate for the `weather` command-line client.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Prompting for a city when none is given
//! - Human-friendly output formatting
//!
//! All weather logic lives behind the RPC service; this client only calls
//! it and prints the result.

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cmd = cli::Cli::parse();
    cmd.run().await
}
