//! `daydeck` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments, wire logging, config and storage, and print JSON.

mod cli;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
