mod api;
mod catalog;
mod config;
mod error;
mod fetcher;
mod fixtures;
mod types;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::routes::{router, ApiState};
use crate::catalog::FixtureCatalog;
use crate::config::Config;
use crate::error::Result;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let catalog = FixtureCatalog::from_config(&cfg)?;
    info!(
        sheet = %cfg.sheet_export_url(),
        merge_policy = %cfg.merge_policy,
        on_fetch_failure = %cfg.on_fetch_failure,
        fetch_timeout_secs = cfg.fetch_timeout_secs,
        "Odds API configured",
    );

    let bind_addr = cfg.bind_addr();
    let app = router(ApiState::new(cfg, catalog)?);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
