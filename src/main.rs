use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use a3s_audit::cli::{Cli, Commands};
use a3s_audit::{AuditConfig, Exporter, HttpProvider, LogStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AuditConfig::load(&cli.config)?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let provider = Arc::new(HttpProvider::new(&config)?);
    let store = LogStore::with_config(provider, &config);

    match cli.command {
        Commands::List { filters, limit } => {
            a3s_audit::cli::list::execute(&store, &filters, limit, config.rate_window()).await?;
        }
        Commands::Export {
            filters,
            format,
            out,
        } => {
            let exporter = Exporter::from_config(&config);
            a3s_audit::cli::export::execute(&store, &exporter, &filters, &format, &out).await?;
        }
        Commands::Analyze => {
            a3s_audit::cli::analyze::execute(&store, config.analyze_limit).await?;
        }
    }

    Ok(())
}
