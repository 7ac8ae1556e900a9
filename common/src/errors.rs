use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Structured error types for the gateway. Display strings double as the
/// caller-visible error messages, so changing them changes the wire contract.
#[derive(Error, Debug)]
pub enum AppError {
    /// The upstream API answered with a non-success status; the status is
    /// relayed to the caller unchanged.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("API key not found")]
    MissingApiKey,

    #[error("Invalid JSON returned from Gemini")]
    InvalidModelOutput,

    #[error("Error calling Gemini")]
    ModelCall(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Replace the caller-visible message on a relayed upstream-status error,
    /// leaving every other variant untouched. Lets each endpoint label the
    /// same transport failure with its own contract message.
    pub fn upstream_context(self, message: impl Into<String>) -> Self {
        match self {
            Self::Upstream { status, .. } => Self::Upstream {
                status,
                message: message.into(),
            },
            other => other,
        }
    }

    pub fn model_call(message: impl Into<String>) -> Self {
        Self::ModelCall(message.into())
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::TimeoutError(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Upstream { status, .. } => {
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::MissingApiKey | AppError::InvalidModelOutput | AppError::ModelCall(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::TimeoutError(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::NetworkError(_) => StatusCode::BAD_GATEWAY,
            AppError::ParseError(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_context_relabels_only_upstream_errors() {
        let err = AppError::upstream(404, "HTTP error: 404")
            .upstream_context("Error fetching weather data");
        assert_eq!(err.to_string(), "Error fetching weather data");

        let err = AppError::MissingApiKey.upstream_context("Error fetching weather data");
        assert_eq!(err.to_string(), "API key not found");
    }

    #[test]
    fn model_error_messages_match_the_wire_contract() {
        assert_eq!(AppError::MissingApiKey.to_string(), "API key not found");
        assert_eq!(
            AppError::InvalidModelOutput.to_string(),
            "Invalid JSON returned from Gemini"
        );
        assert_eq!(
            AppError::model_call("connection refused").to_string(),
            "Error calling Gemini"
        );
    }
}
