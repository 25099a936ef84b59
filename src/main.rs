//! sparrow-ride: rider and driver flows of the Sparrow backend from a terminal.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use sparrow_ride_client::{ClientConfig, ClientState, SparrowResult};
use tracing::Level;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e.banner_message(&e.to_string()));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> SparrowResult<()> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config = config.with_base_url(url.as_str());
    }
    let state = ClientState::new(config)?;
    commands::execute(cli, &state).await
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
