use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use refund_watch::application::{Cli, CommandExecutor};
use refund_watch::shared::config::ConfigLoader;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ConfigLoader::load_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    CommandExecutor::execute(cli.command, config).await?;
    Ok(())
}
