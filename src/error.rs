//! Error types and handling for the `TravelBuddy` application

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the `TravelBuddy` application
#[derive(Error, Debug)]
pub enum TravelBuddyError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// API communication errors (transport, decoding, auth)
    #[error("API error: {message}")]
    Api { message: String },

    /// Upstream service answered with an error status
    #[error("Upstream error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Language model returned something unusable
    #[error("LLM error: {message}")]
    Llm { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TravelBuddyError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new upstream status error
    pub fn upstream<S: Into<String>>(status: u16, body: S) -> Self {
        Self::Upstream {
            status,
            body: body.into(),
        }
    }

    /// Create a new LLM error
    pub fn llm<S: Into<String>>(message: S) -> Self {
        Self::Llm {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TravelBuddyError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TravelBuddyError::Api { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            TravelBuddyError::Upstream { status, .. } => {
                format!("The travel data service rejected the request (HTTP {status}).")
            }
            TravelBuddyError::Llm { .. } => {
                "The language model returned an unexpected answer. Please try again.".to_string()
            }
            TravelBuddyError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TravelBuddyError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
            TravelBuddyError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            TravelBuddyError::General { message } => message.clone(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            TravelBuddyError::Validation { .. } => StatusCode::BAD_REQUEST,
            TravelBuddyError::Api { .. }
            | TravelBuddyError::Upstream { .. }
            | TravelBuddyError::Llm { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for TravelBuddyError {
    fn from(err: reqwest::Error) -> Self {
        TravelBuddyError::api(err.to_string())
    }
}

impl From<reqwest_middleware::Error> for TravelBuddyError {
    fn from(err: reqwest_middleware::Error) -> Self {
        TravelBuddyError::api(err.to_string())
    }
}

impl From<serde_json::Error> for TravelBuddyError {
    fn from(err: serde_json::Error) -> Self {
        TravelBuddyError::api(format!("Failed to decode JSON: {err}"))
    }
}

impl IntoResponse for TravelBuddyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::warn!(%status, error = %self, "Request failed");
        let body = json!({
            "error": self.user_message(),
            "detail": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
