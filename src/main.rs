//! Starknet Buildpack
//!
//! Entry point for `bin/detect` and `bin/build`.

use clap::Parser;
use console::style;
use starknet_buildpack::cli::{lifecycle_args, Cli, Commands};
use starknet_buildpack::error::StarknetResult;
use starknet_buildpack::lifecycle;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::from(lifecycle::ERROR)
        }
    }
}

async fn run() -> StarknetResult<u8> {
    let cli = Cli::parse_from(lifecycle_args(std::env::args_os()));

    // 0 = warn, 1 = info, 2+ = debug; BP_LOG_LEVEL=DEBUG forces debug
    let debug = std::env::var("BP_LOG_LEVEL").is_ok_and(|level| level.eq_ignore_ascii_case("debug"));
    let filter = match (cli.verbose, debug) {
        (_, true) | (2.., _) => EnvFilter::new("starknet_buildpack=debug"),
        (1, _) => EnvFilter::new("starknet_buildpack=info"),
        _ => EnvFilter::new("starknet_buildpack=warn"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Detect(args) => starknet_buildpack::cli::commands::detect(args).await,
        Commands::Build(args) => starknet_buildpack::cli::commands::build(args).await,
    }
}
