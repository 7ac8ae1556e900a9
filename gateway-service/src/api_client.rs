use crate::cache::TtlCache;
use common::errors::AppError;
use common::http_client::HttpClient;
use common::models::{SearchResults, WeatherData};
use std::sync::Arc;
use tracing::{info, instrument};

/// Forecast window requested from the upstream API, in days.
pub const FORECAST_DAYS: u8 = 3;

/// Cache key for forecast lookups. The location is kept as sent: no case or
/// whitespace normalization, so equivalent-but-differently-spelled locations
/// are cached separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForecastKey {
    pub location: String,
    pub days: u8,
}

/// Client for the upstream weather API, covering forecast lookups and
/// location search. Each path owns a dedicated cache.
pub struct WeatherApiClient {
    http_client: HttpClient,
    forecast_cache: Arc<TtlCache<ForecastKey, WeatherData>>,
    search_cache: Arc<TtlCache<String, SearchResults>>,
    base_url: String,
    api_key: String,
}

impl WeatherApiClient {
    pub fn new(
        forecast_cache: Arc<TtlCache<ForecastKey, WeatherData>>,
        search_cache: Arc<TtlCache<String, SearchResults>>,
        base_url: String,
        api_key: String,
    ) -> Self {
        Self {
            http_client: HttpClient::default(),
            forecast_cache,
            search_cache,
            base_url,
            api_key,
        }
    }

    #[instrument(skip(self), fields(location = %location))]
    pub async fn forecast(&self, location: &str) -> Result<WeatherData, AppError> {
        let key = ForecastKey {
            location: location.to_string(),
            days: FORECAST_DAYS,
        };

        if let Some(cached) = self.forecast_cache.get(&key).await {
            info!(location = %location, "Cache hit");
            return Ok(cached);
        }

        info!(location = %location, "Fetching forecast from API");

        let url = format!(
            "{}/forecast.json?key={}&q={}&days={}&aqi=no&alerts=no",
            self.base_url,
            self.api_key,
            urlencoding::encode(location),
            FORECAST_DAYS,
        );

        let data: WeatherData = self
            .http_client
            .get_json(&url)
            .await
            .map_err(|err| err.upstream_context("Error fetching weather data"))?;

        self.forecast_cache.set(key, data.clone()).await;

        Ok(data)
    }

    #[instrument(skip(self), fields(query = %query))]
    pub async fn search(&self, query: &str) -> Result<SearchResults, AppError> {
        if let Some(cached) = self.search_cache.get(query).await {
            info!(query = %query, "Cache hit");
            return Ok(cached);
        }

        info!(query = %query, "Fetching search suggestions from API");

        let url = format!(
            "{}/search.json?key={}&q={}",
            self.base_url,
            self.api_key,
            urlencoding::encode(query),
        );

        let data: SearchResults = self
            .http_client
            .get_json(&url)
            .await
            .map_err(|err| err.upstream_context("Error fetching search suggestions"))?;

        self.search_cache.set(query.to_string(), data.clone()).await;

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_keys_are_deterministic() {
        let a = ForecastKey {
            location: "London".to_string(),
            days: FORECAST_DAYS,
        };
        let b = ForecastKey {
            location: "London".to_string(),
            days: FORECAST_DAYS,
        };
        assert_eq!(a, b);
    }

    #[test]
    fn forecast_keys_do_not_normalize_case() {
        let a = ForecastKey {
            location: "London".to_string(),
            days: FORECAST_DAYS,
        };
        let b = ForecastKey {
            location: "london".to_string(),
            days: FORECAST_DAYS,
        };
        assert_ne!(a, b);
    }
}
