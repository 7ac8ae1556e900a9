use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Forecast payload from the upstream weather API. The gateway relays the
/// body verbatim and does not interpret its internal structure.
pub type WeatherData = serde_json::Value;

/// Location suggestions from the upstream search API, relayed verbatim.
pub type SearchResults = serde_json::Value;

/// One generated activity suggestion.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct Activity {
    pub name: String,
    pub description: String,
    pub map_link: String,
}

/// Weather metrics posted by the client for activity generation.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRequest {
    pub city: String,
    pub temp_max: f64,
    pub temp_min: f64,
    pub humidity: f64,
    pub wind: f64,
    pub rain: f64,
}
