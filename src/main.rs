//! Proxy and multisig transaction wrapping for Substrate wallets.

#![deny(missing_docs)]

mod cli;
use cli::Cli;

// crates.io
use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::fmt::init();

	Cli::parse().run().await
}
