mod migrate;
mod problem;
mod products;
mod router;
mod service;
mod telemetry;

use std::net::SocketAddr;

use product_catalog_storage::Database;
use product_catalog_util::{load_env_file, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_env_file();
    let config = AppConfig::from_env()?;

    telemetry::init_tracing(&config)?;
    let metrics = telemetry::init_metrics()?;

    info!(stage = "storage", database_url = %config.database.masked_url(), "connecting to database");
    let database = Database::connect(config.database.url()).await?;
    migrate::run_with_retry(&database, config.migrations).await?;

    let state = router::AppState::new(metrics, database);

    let addr: SocketAddr = config.bind_addr;
    info!(stage = "app", %addr, env = %config.environment.as_str(), "starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router::app_router(state))
        .await
        .map_err(|err| err.into())
}
