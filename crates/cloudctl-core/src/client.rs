//! HTTP client for the load balancer endpoints of the control-plane API
//!
//! Base path: `/v2/`
//! Auth: `Authorization: Bearer <token>`
//!
//! The workflows only depend on the [`LoadBalancerApi`] trait so they can be
//! driven by a fake in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::RetryConfig;
use crate::error::{CoreError, Result};
use crate::load_balancer::{LoadBalancer, LoadBalancerEnvelope, LoadBalancerSpec};

/// Public API endpoint used when no URL is configured
pub const DEFAULT_API_URL: &str = "https://api.digitalocean.com";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Operations the create-and-wait workflow needs from the API
#[async_trait]
pub trait LoadBalancerApi: Send + Sync {
    /// Submit a creation request; returns the freshly created resource
    async fn create_load_balancer(&self, spec: &LoadBalancerSpec) -> Result<LoadBalancer>;

    /// Fetch the current state of a load balancer
    async fn get_load_balancer(&self, id: &str) -> Result<LoadBalancer>;
}

/// Everything needed to build an [`ApiClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub access_token: String,
    pub timeout: Duration,
    pub retry: RetryConfig,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: access_token.into(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
            user_agent: concat!("cloudctl/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

// Error body shape: {"id": "unauthorized", "message": "Unable to authenticate you"}
#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Which request a non-2xx answer belongs to
#[derive(Debug, Clone, Copy)]
enum Request {
    Create,
    Get,
}

/// Async client for the load balancer API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryConfig,
}

impl ApiClient {
    /// Build a client; the token is injected as a default header on every
    /// request.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.access_token))
            .map_err(|e| CoreError::Validation(format!("invalid access token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: Self::normalize_base_url(&config.base_url)?,
            retry: config.retry,
        })
    }

    /// `https://host` and `https://host/v2` both become `https://host/v2/`
    fn normalize_base_url(raw: &str) -> Result<Url> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/v2") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/v2/"));
        }

        Ok(url)
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Send a request, retrying transport failures with backoff
    ///
    /// Connect errors are always retried. Timeouts are only retried for
    /// idempotent requests, since the server may already have acted on a
    /// request that timed out.
    async fn send<F>(&self, build: F, idempotent: bool) -> Result<reqwest::Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let max_attempts = self.retry.attempts();
        let mut attempt = 1;

        loop {
            match build().send().await {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt < max_attempts && (e.is_connect() || (idempotent && e.is_timeout())) => {
                    let backoff = self.retry.backoff(attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn handle_response(&self, resp: reqwest::Response, request: Request) -> Result<LoadBalancer> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::parse_error(status, resp, request).await);
        }

        let body = resp.text().await?;
        serde_json::from_str::<LoadBalancerEnvelope>(&body)
            .map(|envelope| envelope.load_balancer)
            .map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                CoreError::Decode {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
    }

    async fn parse_error(status: StatusCode, resp: reqwest::Response, request: Request) -> CoreError {
        let raw = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|err| err.message)
            .unwrap_or_else(|| {
                if raw.trim().is_empty() {
                    status.to_string()
                } else {
                    raw.trim().to_string()
                }
            });
        let status = status.as_u16();

        match (status, request) {
            (401 | 403, _) => CoreError::Unauthorized { status, message },
            (_, Request::Create) => CoreError::CreationFailed { status, message },
            (_, Request::Get) => CoreError::Api { status, message },
        }
    }
}

#[async_trait]
impl LoadBalancerApi for ApiClient {
    async fn create_load_balancer(&self, spec: &LoadBalancerSpec) -> Result<LoadBalancer> {
        let url = self.url("load_balancers")?;
        debug!("POST {url}");

        let resp = self
            .send(|| self.http.post(url.clone()).json(spec), false)
            .await?;
        self.handle_response(resp, Request::Create).await
    }

    async fn get_load_balancer(&self, id: &str) -> Result<LoadBalancer> {
        let url = self.url(&format!("load_balancers/{id}"))?;
        debug!("GET {url}");

        let resp = self.send(|| self.http.get(url.clone()), true).await?;
        self.handle_response(resp, Request::Get).await
    }
}
