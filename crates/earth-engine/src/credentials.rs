//! Service-account authentication.
//!
//! A service-account key file is turned into a short-lived bearer token with
//! the OAuth 2.0 JWT-bearer grant: an RS256-signed assertion is posted to the
//! key's `token_uri`.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

use crate::error::{GatewayError, GatewayResult};

/// OAuth scope granting access to the imagery API.
pub const EARTH_ENGINE_SCOPE: &str = "https://www.googleapis.com/auth/earthengine";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each signed assertion.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before they actually expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Fields of a service-account JSON key that authentication needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

impl ServiceAccountKey {
    /// Load a key file. A missing file is reported distinctly.
    pub fn from_file(path: impl AsRef<Path>) -> GatewayResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GatewayError::CredentialsMissing(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> GatewayResult<Self> {
        serde_json::from_str(json).map_err(|e| GatewayError::InvalidCredentials(e.to_string()))
    }

    /// Build the signed JWT assertion issued at `issued_at` (unix seconds).
    pub fn assertion(&self, issued_at: i64) -> GatewayResult<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        let claims = Claims {
            iss: &self.client_email,
            scope: EARTH_ENGINE_SCOPE,
            aud: &self.token_uri,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| GatewayError::InvalidCredentials(format!("private key: {}", e)))?;

        encode(&header, &claims, &key)
            .map_err(|e| GatewayError::InvalidCredentials(format!("signing assertion: {}", e)))
    }
}

/// A bearer token and the instant it stops being usable.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: Instant,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            value: value.into(),
            expires_at: Instant::now() + lifetime,
        }
    }

    /// Whether the token can still be sent at `now`.
    pub fn is_fresh(&self, now: Instant) -> bool {
        now + EXPIRY_MARGIN < self.expires_at
    }
}

/// Exchange a signed assertion for an access token.
#[instrument(skip(http, key), fields(client_email = %key.client_email))]
pub async fn exchange(http: &reqwest::Client, key: &ServiceAccountKey) -> GatewayResult<AccessToken> {
    let assertion = key.assertion(chrono::Utc::now().timestamp())?;

    let response = http
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GatewayError::Auth(format!("{}: {}", status, body.trim())));
    }

    let token: TokenResponse = response.json().await?;
    debug!(expires_in = token.expires_in, "Obtained access token");

    Ok(AccessToken::new(
        token.access_token,
        Duration::from_secs(token.expires_in),
    ))
}
