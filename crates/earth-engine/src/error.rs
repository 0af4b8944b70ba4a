//! Error types for imagery gateway calls.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors raised while talking to the imagery service.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("credentials file not found: {}", .0.display())]
    CredentialsMissing(PathBuf),

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Earth Engine API error {code} ({status}): {message}")]
    Api {
        code: u16,
        status: String,
        message: String,
    },

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Whether the failure happened before any imagery call, while
    /// establishing credentials.
    pub fn is_init_failure(&self) -> bool {
        matches!(
            self,
            GatewayError::CredentialsMissing(_)
                | GatewayError::InvalidCredentials(_)
                | GatewayError::Auth(_)
        )
    }

    /// Decode a non-2xx reply from the `{"error": {...}}` envelope the API
    /// uses, falling back to the raw body.
    pub fn from_api_body(http_status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct Envelope {
            error: ApiErrorBody,
        }

        #[derive(Deserialize)]
        struct ApiErrorBody {
            #[serde(default)]
            code: Option<u16>,
            #[serde(default)]
            message: String,
            #[serde(default)]
            status: String,
        }

        match serde_json::from_str::<Envelope>(body) {
            Ok(envelope) => GatewayError::Api {
                code: envelope.error.code.unwrap_or(http_status),
                status: envelope.error.status,
                message: envelope.error.message,
            },
            Err(_) => GatewayError::Api {
                code: http_status,
                status: String::new(),
                message: body.trim().to_string(),
            },
        }
    }
}
