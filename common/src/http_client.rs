use crate::errors::AppError;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, instrument};

/// HTTP client with a request timeout. Failures are terminal per request:
/// no retry, no fallback.
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Fetch JSON from URL.
    #[instrument(skip(self, url))]
    pub async fn get_json<T>(&self, url: &str) -> Result<T, AppError>
    where
        T: serde::de::DeserializeOwned,
    {
        let request = self.client.get(url);
        let response = self.send_with_timeout(request, url).await?;
        info!("Request successful");
        Ok(response)
    }

    /// POST a JSON body and parse a JSON response.
    #[instrument(skip(self, url, body))]
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize,
        T: serde::de::DeserializeOwned,
    {
        let request = self.client.post(url).json(body);
        let response = self.send_with_timeout(request, url).await?;
        info!("Request successful");
        Ok(response)
    }

    async fn send_with_timeout<T>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<T, AppError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| AppError::timeout(format!("Request to {} timed out", url)))?
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::timeout(format!("Request to {} timed out", url))
                } else {
                    AppError::NetworkError(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(
                status.as_u16(),
                format!("HTTP error: {}", status),
            ));
        }

        let text = response.text().await.map_err(AppError::NetworkError)?;
        let json: T = serde_json::from_str(&text).map_err(AppError::ParseError)?;

        Ok(json)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(10)
    }
}
