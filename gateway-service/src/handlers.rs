use axum::{
    extract::{Query, State},
    response::Json,
};
use common::errors::AppError;
use common::models::{Activity, ActivityRequest, SearchResults, WeatherData};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::api_client::WeatherApiClient;
use crate::gemini::GeminiClient;

/// Default location when the caller does not pass one; resolved by the
/// upstream API from the requesting IP.
pub const DEFAULT_LOCATION: &str = "auto:ip";

#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<WeatherApiClient>,
    pub gemini: Arc<GeminiClient>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health check")
    )
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "weather-gateway" }))
}

#[derive(Debug, Deserialize)]
pub struct WeatherParams {
    pub location: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/weather",
    params(
        ("location" = Option<String>, Query, description = "Location query, defaults to auto:ip")
    ),
    responses(
        (status = 200, description = "Three-day forecast for the location"),
        (status = "4XX", description = "Relayed upstream error"),
    ),
    tag = "weather"
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherParams>,
) -> Result<Json<WeatherData>, AppError> {
    let location = params
        .location
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

    info!(location = %location, "Weather request received");

    let data = state.weather.forecast(&location).await?;

    Ok(Json(data))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/search",
    params(
        ("q" = Option<String>, Query, description = "Partial location text")
    ),
    responses(
        (status = 200, description = "Matching locations, empty when q is absent"),
        (status = "4XX", description = "Relayed upstream error"),
    ),
    tag = "weather"
)]
pub async fn search_locations(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>, AppError> {
    let Some(query) = params.q.filter(|q| !q.is_empty()) else {
        return Ok(Json(serde_json::json!([])));
    };

    info!(query = %query, "Search request received");

    let data = state.weather.search(&query).await?;

    Ok(Json(data))
}

#[utoipa::path(
    post,
    path = "/api/gemini",
    request_body = ActivityRequest,
    responses(
        (status = 200, description = "Generated activity suggestions", body = [Activity]),
        (status = 500, description = "Missing credential, invalid model output, or model call failure"),
    ),
    tag = "activities"
)]
pub async fn suggest_activities(
    State(state): State<AppState>,
    Json(request): Json<ActivityRequest>,
) -> Result<Json<Vec<Activity>>, AppError> {
    info!(city = %request.city, "Activity suggestion request received");

    let activities = state.gemini.suggest_activities(&request).await?;

    Ok(Json(activities))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TtlCache;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    // Clients pointed at an unroutable address: these tests must not reach
    // any upstream.
    fn state() -> AppState {
        AppState {
            weather: Arc::new(WeatherApiClient::new(
                Arc::new(TtlCache::with_ttl(600)),
                Arc::new(TtlCache::with_ttl(600)),
                "http://127.0.0.1:9".to_string(),
                "test-key".to_string(),
            )),
            gemini: Arc::new(GeminiClient::new(
                Arc::new(TtlCache::with_ttl(600)),
                "http://127.0.0.1:9".to_string(),
                None,
                "gemini-2.0-flash".to_string(),
            )),
        }
    }

    #[tokio::test]
    async fn empty_search_query_short_circuits() {
        for uri in ["/api/search", "/api/search?q="] {
            let app = crate::router(state());
            let response = app
                .oneshot(Request::get(uri).body(Body::empty()).expect("valid request"))
                .await
                .expect("router response");

            assert_eq!(response.status(), StatusCode::OK);
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("body bytes");
            let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
            assert_eq!(body, serde_json::json!([]));
        }
    }

    #[tokio::test]
    async fn missing_model_credential_is_a_config_error() {
        let app = crate::router(state());
        let request = Request::post("/api/gemini")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"city":"Lisbon","tempMax":24.0,"tempMin":16.0,"humidity":60,"wind":12,"rain":10}"#,
            ))
            .expect("valid request");

        let response = app.oneshot(request).await.expect("router response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["error"], "API key not found");
    }
}
