//! Amadeus Self-Service API client.
//!
//! Handles the OAuth2 client-credentials flow and exposes a single
//! authenticated `GET` that the endpoint modules build on.

pub mod airlines;
pub mod flights;
pub mod hotels;
pub mod models;
pub mod reference;

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::config::AmadeusConfig;
use crate::http::{USER_AGENT, build_url, retrying_client, truncate_body};
use crate::{Result, TravelBuddyError};

pub use airlines::{AirlineDirectory, title_case};
pub use flights::FlightQuery;
pub use hotels::HotelQuery;
pub use reference::{IataCodes, ReferenceResolver};

const TOKEN_PATH: &str = "/v1/security/oauth2/token";
const TOKEN_ATTEMPTS: u32 = 3;
/// Refresh this long before the advertised expiry
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(30);
const DEFAULT_EXPIRES_IN: u64 = 1799;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN < self.expires_at
    }
}

pub struct AmadeusClient {
    http: ClientWithMiddleware,
    token_http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    token: Mutex<Option<AccessToken>>,
    token_backoff: Duration,
}

impl AmadeusClient {
    /// Build a client from configuration. Fails when credentials are missing.
    pub fn new(config: &AmadeusConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| TravelBuddyError::config("Amadeus API key is missing"))?;
        let api_secret = config
            .api_secret
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| TravelBuddyError::config("Amadeus API secret is missing"))?;

        let timeout = Duration::from_secs(u64::from(config.timeout_seconds));
        let http = retrying_client(timeout, config.max_retries)?;
        let token_http = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            token_http,
            base_url: config.resolved_base_url(),
            api_key,
            api_secret,
            token: Mutex::new(None),
            token_backoff: Duration::from_secs(1),
        })
    }

    /// Initial delay between token attempts, doubled after each failure
    #[must_use]
    pub fn with_token_backoff(mut self, backoff: Duration) -> Self {
        self.token_backoff = backoff;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current bearer token, refreshing it when close to expiry
    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let token = self.refresh_token().await?;
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    #[instrument(skip(self))]
    async fn refresh_token(&self) -> Result<AccessToken> {
        let mut delay = self.token_backoff;
        let mut last_error = None;

        for attempt in 1..=TOKEN_ATTEMPTS {
            match self.request_token().await {
                Ok(token) => {
                    info!("Obtained Amadeus access token");
                    return Ok(token);
                }
                Err(e) => {
                    warn!("Token request attempt {attempt}/{TOKEN_ATTEMPTS} failed: {e}");
                    last_error = Some(e);
                    if attempt < TOKEN_ATTEMPTS {
                        tokio::time::sleep(delay).await;
                        delay = (delay * 2).min(Duration::from_secs(8));
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| TravelBuddyError::api("OAuth token request failed")))
    }

    async fn request_token(&self) -> Result<AccessToken> {
        let url = format!("{}{TOKEN_PATH}", self.base_url);
        let response = self
            .token_http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.api_key.as_str()),
                ("client_secret", self.api_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(TravelBuddyError::api(format!(
                "OAuth failed: {} {}",
                status.as_u16(),
                truncate_body(&body)
            )));
        }

        let payload: TokenResponse = serde_json::from_str(&body)?;
        let expires_in = payload.expires_in.unwrap_or(DEFAULT_EXPIRES_IN);
        Ok(AccessToken {
            value: payload.access_token,
            expires_at: Instant::now() + Duration::from_secs(expires_in),
        })
    }

    /// Authenticated `GET` decoding the JSON body into `T`.
    ///
    /// A 401 drops the cached token and retries once with a fresh one.
    /// Any other status >= 400 becomes [`TravelBuddyError::Upstream`].
    #[instrument(skip(self, params))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let url = build_url(&self.base_url, path, params);
        let started = Instant::now();

        let (mut status, mut body) = self.send_get(&url).await?;
        if status == StatusCode::UNAUTHORIZED {
            debug!("Token rejected, refreshing");
            self.invalidate_token().await;
            (status, body) = self.send_get(&url).await?;
        }

        debug!(
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis(),
            "GET {path}"
        );

        if status.as_u16() >= 400 {
            warn!("GET {path} failed with {status}");
            return Err(TravelBuddyError::upstream(
                status.as_u16(),
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            TravelBuddyError::api(format!("Failed to decode response of {path}: {e}"))
        })
    }

    async fn send_get(&self, url: &str) -> Result<(StatusCode, String)> {
        let token = self.access_token().await?;
        let response = self.http.get(url).bearer_auth(token).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}
