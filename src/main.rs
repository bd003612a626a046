use std::net::SocketAddr;

use authorlist_web::{app, config::CliConfig};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = CliConfig::parse();
    let app = app(&config)?;

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!("Starting server with address http://{addr}", addr = addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
