use std::process;

use clap::Parser;
use coinstore::{
    cli,
    config::{CliArgs, Config, LoggingConfig},
    repository::Repositories,
};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli_args = CliArgs::parse();
    let config = Config::load(&cli_args);

    init_tracing(&config.logging);

    let repos = match Repositories::open(&config.store) {
        Ok(repos) => repos,
        Err(e) => {
            tracing::error!(error = %e, "Failed to open store");
            process::exit(1);
        }
    };

    match cli::run(&cli_args.command, &repos, &config.input) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            process::exit(1);
        }
    }
}

/// RUST_LOG takes precedence over the configured level. Logs go to stderr so
/// command output stays clean.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
