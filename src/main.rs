// src/main.rs
use anyhow::Context;
use log::{info, warn};

use pallet_calc::api;
use pallet_calc::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_result = dotenvy::dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = dotenv_result {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            warn!("⚠️ Could not load .env: {}", err);
        }
    }

    let app_config = AppConfig::from_env();
    let api_config = app_config.api.clone();
    let calculator_config = app_config.calculator.clone();

    info!("🚀 Pallet calculator starting...");
    let addr = api_config.socket_addr();
    api::start_api_server(api_config, calculator_config)
        .await
        .with_context(|| format!("API server on {} terminated with an error", addr))
}
