use crate::cache::TtlCache;
use common::errors::AppError;
use common::http_client::HttpClient;
use common::models::{Activity, ActivityRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Sampling temperature for activity generation. Kept low so the model stays
/// close to the requested JSON schema.
const GENERATION_TEMPERATURE: f64 = 0.5;

/// Cache key for activity suggestions: the six request metrics in fixed
/// order. Separate fields (rather than a delimiter-joined string) keep a
/// literal dash in the city name from colliding with field boundaries.
/// Numbers are keyed by their rendered form, so float-precision differences
/// in the request produce distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActivityKey {
    city: String,
    temp_max: String,
    temp_min: String,
    humidity: String,
    wind: String,
    rain: String,
}

impl From<&ActivityRequest> for ActivityKey {
    fn from(request: &ActivityRequest) -> Self {
        Self {
            city: request.city.clone(),
            temp_max: request.temp_max.to_string(),
            temp_min: request.temp_min.to_string(),
            humidity: request.humidity.to_string(),
            wind: request.wind.to_string(),
            rain: request.rain.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

/// Client for the generative-language API that turns weather metrics into
/// activity suggestions.
pub struct GeminiClient {
    http_client: HttpClient,
    cache: Arc<TtlCache<ActivityKey, Vec<Activity>>>,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(
        cache: Arc<TtlCache<ActivityKey, Vec<Activity>>>,
        base_url: String,
        api_key: Option<String>,
        model: String,
    ) -> Self {
        Self {
            http_client: HttpClient::default(),
            cache,
            base_url,
            api_key,
            model,
        }
    }

    /// Generate activity suggestions for the given weather metrics.
    ///
    /// Fails with [`AppError::MissingApiKey`] when no credential is
    /// configured, [`AppError::ModelCall`] when the call itself fails, and
    /// [`AppError::InvalidModelOutput`] when the model's text is not a valid
    /// activity array after cleanup. Only successful parses are cached.
    #[instrument(skip(self, request), fields(city = %request.city))]
    pub async fn suggest_activities(
        &self,
        request: &ActivityRequest,
    ) -> Result<Vec<Activity>, AppError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AppError::MissingApiKey);
        };

        let key = ActivityKey::from(request);

        if let Some(cached) = self.cache.get(&key).await {
            info!(city = %request.city, "Cache hit");
            return Ok(cached);
        }

        info!(city = %request.city, "Requesting activity suggestions from model");

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key,
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: build_prompt(request),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: GENERATION_TEMPERATURE,
            },
        };

        let response: GenerateContentResponse =
            self.http_client.post_json(&url, &body).await.map_err(|err| {
                error!(error = %err, "Model call failed");
                AppError::model_call(err.to_string())
            })?;

        let candidate = response
            .candidates
            .first()
            .ok_or_else(|| AppError::model_call("model response contained no candidates"))?;
        let raw: String = candidate
            .content
            .parts
            .iter()
            .map(|part| part.text.as_str())
            .collect();

        let cleaned = clean_model_text(&raw);
        let activities: Vec<Activity> = match serde_json::from_str(&cleaned) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(error = %err, raw = %raw, "Model returned unparseable activity JSON");
                return Err(AppError::InvalidModelOutput);
            }
        };

        self.cache.set(key, activities.clone()).await;

        Ok(activities)
    }
}

fn build_prompt(request: &ActivityRequest) -> String {
    format!(
        "Using the current weather data for {city} (including details such as max temperature: \
         {temp_max}, min temperature {temp_min}, humidity {humidity}, wind speed {wind}, \
         precipitation probability {rain}), please generate a list of engaging, locally-relevant \
         activities that would be ideal for today. Consider whether the weather favors outdoor \
         adventures, cultural or indoor experiences, and include any local events or attractions \
         that align with the current climate.\n    Return only 4 (FOUR) activities.\n\tFor each \
         activity, generate a valid Google Maps link in the format:\n\
         \"https://www.google.com/maps/search/{{Activity+Name}}+in+{{City}}\"\n\
         Return a pure JSON with this schema:\n\
         {{\n\
           \"type\": \"array\",\n\
           \"items\": {{\n\
             \"type\": \"object\",\n\
             \"properties\": {{\n\
               \"name\": {{ \"type\": \"string\" }},\n\
               \"description\": {{ \"type\": \"string\" }},\n\
               \"map_link\": {{ \"type\": \"string\", \"format\": \"uri\" }}\n\
             }}\n\
           }}\n\
         }}",
        city = request.city,
        temp_max = request.temp_max,
        temp_min = request.temp_min,
        humidity = request.humidity,
        wind = request.wind,
        rain = request.rain,
    )
}

/// Strip the wrapping artifacts models commonly add around JSON output:
/// code fences, null bytes, carriage returns, tabs.
pub fn clean_model_text(raw: &str) -> String {
    let trimmed = raw.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let unfenced = unfenced.strip_suffix("```").unwrap_or(unfenced);

    unfenced
        .replace('\u{0}', "")
        .replace('\r', "")
        .replace('\t', " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ActivityRequest {
        ActivityRequest {
            city: "Lisbon".to_string(),
            temp_max: 24.5,
            temp_min: 16.0,
            humidity: 60.0,
            wind: 12.0,
            rain: 10.0,
        }
    }

    #[test]
    fn strips_json_code_fence() {
        let cleaned = clean_model_text("```json\n[{\"a\":1}]\n```");
        assert_eq!(cleaned, "[{\"a\":1}]");
    }

    #[test]
    fn strips_bare_code_fence() {
        let cleaned = clean_model_text("```\n[]\n```");
        assert_eq!(cleaned, "[]");
    }

    #[test]
    fn strips_null_bytes() {
        let cleaned = clean_model_text("[\u{0}1,\u{0}2]");
        assert_eq!(cleaned, "[1,2]");
    }

    #[test]
    fn strips_carriage_returns() {
        let cleaned = clean_model_text("[1,\r\n2]");
        assert_eq!(cleaned, "[1,\n2]");
    }

    #[test]
    fn replaces_tabs_with_spaces() {
        let cleaned = clean_model_text("[1,\t2]");
        assert_eq!(cleaned, "[1, 2]");
    }

    #[test]
    fn leaves_clean_json_untouched() {
        let cleaned = clean_model_text("[{\"name\":\"x\"}]");
        assert_eq!(cleaned, "[{\"name\":\"x\"}]");
    }

    #[test]
    fn prompt_embeds_all_six_metrics() {
        let prompt = build_prompt(&request());

        assert!(prompt.contains("Lisbon"));
        assert!(prompt.contains("24.5"));
        assert!(prompt.contains("16"));
        assert!(prompt.contains("60"));
        assert!(prompt.contains("12"));
        assert!(prompt.contains("10"));
        assert!(prompt.contains("Return only 4 (FOUR) activities"));
    }

    #[test]
    fn identical_requests_share_a_key() {
        assert_eq!(ActivityKey::from(&request()), ActivityKey::from(&request()));
    }

    #[test]
    fn any_changed_metric_changes_the_key() {
        let mut other = request();
        other.humidity = 61.0;
        assert_ne!(ActivityKey::from(&request()), ActivityKey::from(&other));
    }

    #[test]
    fn city_containing_a_dash_cannot_collide_with_field_boundaries() {
        let mut dashed = request();
        dashed.city = "Lisbon-24.5".to_string();
        assert_ne!(ActivityKey::from(&request()), ActivityKey::from(&dashed));
    }
}
