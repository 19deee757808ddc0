//! murmur - command-line client for the murmur content API.
//!
//! A thin wrapper over `murmur-http`: every command loads the persisted
//! session, runs through the same dispatcher as any other client (so an
//! expired credential is renewed transparently), then saves the session
//! back.

mod cli;
mod commands;
mod output;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{auth, posts};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let api_url = cli.api_url.as_deref();
    match cli.command {
        Commands::Auth(cmd) => auth::handle(cmd, api_url).await,
        Commands::Posts(cmd) => posts::handle(cmd, api_url).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
