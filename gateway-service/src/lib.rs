pub mod api_client;
pub mod cache;
pub mod config;
pub mod gemini;
pub mod handlers;
pub mod openapi;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api_client::WeatherApiClient;
use crate::cache::TtlCache;
use crate::config::Config;
use crate::gemini::GeminiClient;
use crate::handlers::AppState;

/// Construct the application state: one cache per endpoint, injected into
/// the upstream clients.
pub fn build_state(config: &Config) -> AppState {
    let forecast_cache = Arc::new(TtlCache::with_ttl(config.cache_ttl_seconds));
    let search_cache = Arc::new(TtlCache::with_ttl(config.cache_ttl_seconds));
    let activity_cache = Arc::new(TtlCache::with_ttl(config.cache_ttl_seconds));

    let weather = Arc::new(WeatherApiClient::new(
        forecast_cache,
        search_cache,
        config.weather_api_url.clone(),
        config.weather_api_key.clone(),
    ));
    let gemini = Arc::new(GeminiClient::new(
        activity_cache,
        config.gemini_api_url.clone(),
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    ));

    AppState { weather, gemini }
}

/// Build the gateway router over a prepared application state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/weather", get(handlers::get_weather))
        .route("/api/search", get(handlers::search_locations))
        .route("/api/gemini", post(handlers::suggest_activities))
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
