use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::app::{app, AppState};
use crate::config::AppConfig;
use crate::database::{manager, PgStore};
use crate::storage::LocalBlobStore;

#[derive(Parser)]
#[command(name = "portfolio-api")]
#[command(about = "Portfolio API - personal portfolio CMS backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env();
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Migrate => migrate(config).await,
    }
}

async fn migrate(config: AppConfig) -> anyhow::Result<()> {
    let pool = manager::connect(&config.database).await?;
    manager::migrate(&pool).await?;
    info!("Migrations applied");
    manager::close(pool).await;
    Ok(())
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting Portfolio API in {:?} mode", config.environment);

    let pool = manager::connect(&config.database).await?;
    if config.database.run_migrations {
        manager::migrate(&pool).await?;
    }

    let blobs = LocalBlobStore::new(&config.storage.root, config.storage.public_prefix.clone())
        .await
        .context("failed to prepare upload directory")?;

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let state = AppState::new(config, Arc::new(PgStore::new(pool.clone())), Arc::new(blobs))
        .context("invalid security configuration")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Portfolio API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    manager::close(pool).await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::parse_from(["portfolio-api"]);
        assert_eq!(cli.command, None);

        let cli = Cli::parse_from(["portfolio-api", "migrate", "--port", "9000"]);
        assert_eq!(cli.command, Some(Commands::Migrate));
        assert_eq!(cli.port, Some(9000));
    }
}
