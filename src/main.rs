use flatkv::{web, Config, DataStore};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging (RUST_LOG overrides the default INFO level)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("FlatKV starting...");

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let store = match DataStore::open(&config.snapshot()) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!("Failed to load store from {:?}: {}", config.data_file, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = web::run_web_server(&config.web_addr, store).await {
        error!("Web server error: {:#}", e);
        std::process::exit(1);
    }
}
