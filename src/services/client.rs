//! Signed, rate-limited HTTP client for the configservice API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::rate_limiter::RateLimiter;
use crate::services::signing::{RequestSigner, VeracodeHmacSigner};

/// Status and body of a completed request, whatever the status.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Deserialize a 200 body, or turn any other status into `AppError::Status`.
    pub fn into_json<T: DeserializeOwned>(self, context: impl Into<String>) -> Result<T, AppError> {
        if !self.is_success() {
            return Err(AppError::Status {
                context: context.into(),
                status: self.status,
            });
        }
        self.json()
    }
}

/// GET-only client. Every call consumes one unit of the shared rate budget.
pub struct ApiClient {
    http: Client,
    base_url: Url,
    user_agent: String,
    limiter: Arc<RateLimiter>,
    signer: Option<Arc<dyn RequestSigner>>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        user_agent: &str,
        limiter: Arc<RateLimiter>,
        signer: Option<Arc<dyn RequestSigner>>,
        timeout: Option<Duration>,
    ) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("invalid API base URL {base_url}: {e}")))?;
        if base_url.host_str().is_none() {
            return Err(AppError::Config(format!("API base URL {base_url} has no host")));
        }

        let mut builder = Client::builder().connect_timeout(Duration::from_secs(10));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
            user_agent: user_agent.to_string(),
            limiter,
            signer,
        })
    }

    /// Build the production client: HMAC signing plus the configured rate budget.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let signer = VeracodeHmacSigner::new(&config.api_key_id, &config.api_key_secret)?;
        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit_calls,
            config.rate_limit_period,
        ));
        Self::new(
            &config.api_base_url,
            &config.user_agent,
            limiter,
            Some(Arc::new(signer)),
            config.http_timeout,
        )
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Issue a GET for `path_and_query` relative to the base URL.
    ///
    /// No retries. Non-success statuses are returned, not raised; only
    /// transport and signing failures are errors.
    pub async fn get(&self, path_and_query: &str) -> Result<RawResponse, AppError> {
        let url = self
            .base_url
            .join(path_and_query)
            .map_err(|e| AppError::Config(format!("invalid request path {path_and_query}: {e}")))?;

        self.limiter.acquire().await;

        let mut request = self.http.get(url.clone()).header(USER_AGENT, &self.user_agent);
        if let Some(signer) = &self.signer {
            let host = host_header(&url);
            let signed_path = match url.query() {
                Some(query) => format!("{}?{query}", url.path()),
                None => url.path().to_string(),
            };
            request = request.header(AUTHORIZATION, signer.authorization(&host, &signed_path, "GET")?);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        tracing::debug!(url = %url, status, "GET completed");

        Ok(RawResponse { status, body })
    }
}

fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}
