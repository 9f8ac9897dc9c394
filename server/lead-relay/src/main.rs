//! Binary entrypoint for the lead relay.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, routing::post, Router};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use lead_relay::{AppState, RelayConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let config = RelayConfig::from_env()?;
  let port = config.port;
  let state = Arc::new(AppState::from_config(&config)?);

  let app = Router::new()
    .route("/health", get(lead_relay::health))
    .route("/submit", post(lead_relay::submit))
    .layer(CorsLayer::permissive())
    .with_state(state);

  let addr = SocketAddr::from(([127, 0, 0, 1], port));
  tracing::info!("lead-relay listening on http://{}", addr);

  let listener = tokio::net::TcpListener::bind(addr).await?;
  axum::serve(
    listener,
    app.into_make_service_with_connect_info::<SocketAddr>(),
  )
  .await?;

  Ok(())
}
