use std::env;

pub struct Config {
    pub port: u16,
    pub weather_api_url: String,
    pub weather_api_key: String,
    pub gemini_api_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub cache_ttl_seconds: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            weather_api_url: env::var("WEATHER_API_URL")
                .unwrap_or_else(|_| "https://api.weatherapi.com/v1".to_string()),
            weather_api_key: env::var("WEATHER_API_KEY").unwrap_or_default(),
            gemini_api_url: env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            // An empty key counts as absent so the endpoint fails fast
            // instead of making a doomed upstream call.
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            cache_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(600), // 10 minutes default
        }
    }
}
