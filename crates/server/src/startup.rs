use std::{sync::Arc, time::Duration};

use axum::{
    http::{HeaderValue, Method},
    Router,
};
use configs::{AppConfig, CorsConfig};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;
use service::{
    file::resort_store::ResortStore,
    weather::{NwsForecastClient, WeatherClientConfig},
};

/// CORS for the single trusted web origin.
pub fn build_cors(cfg: &CorsConfig) -> Result<CorsLayer, StartupError> {
    let origin = HeaderValue::from_str(cfg.allowed_origin.trim())
        .map_err(|e| StartupError::InvalidConfig(format!("cors.allowed_origin: {e}")))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any))
}

/// Wire the concrete collaborators. The resort file is loaded here, so a
/// missing or malformed file stops startup.
pub async fn build_state(cfg: &AppConfig) -> Result<AppState, StartupError> {
    common::env::ensure_data_file(&cfg.storage.resorts_csv)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    let resorts = ResortStore::load(cfg.storage.resorts_csv.clone())
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    let weather = NwsForecastClient::new(WeatherClientConfig {
        base_url: cfg.weather.base_url.clone(),
        user_agent: cfg.weather.user_agent.clone(),
        timeout: Duration::from_secs(cfg.weather.timeout_secs),
    })
    .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    Ok(AppState { resorts, weather: Arc::new(weather) })
}

/// Public entry: build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg).await?;
    let cors = build_cors(&cfg.cors)?;
    let app: Router = routes::build_router(state, cors);

    let addr = cfg.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %listener.local_addr()?, origin = %cfg.cors.allowed_origin, "starting ski resort server");
    axum::serve(listener, app).await?;
    Ok(())
}
