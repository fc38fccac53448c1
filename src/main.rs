//! call-handoff CLI entry point.

use anyhow::Result;
use clap::Parser;

use call_handoff::cli::{commands, handle_error, Cli, Commands};
use call_handoff::domain::models::Config;
use call_handoff::infrastructure::config::ConfigLoader;
use call_handoff::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli).await {
        handle_error(err, cli.json);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    let mut log_config = LogConfig::from(&config.logging);
    if cli.json {
        log_config = log_config.without_stdout();
    }
    let _logger = LoggerImpl::init(&log_config)?;

    match &cli.command {
        Commands::Simulate(args) => {
            commands::simulate::execute(args.clone(), &config, cli.json).await
        }
        Commands::Config => commands::config::execute(&config, cli.json),
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}
