use std::collections::HashMap;
use std::time::Duration;

use rand::Rng;
use reqwest::Client;
use serde::Serialize;
use tokio::time::timeout;

use super::config::FetchConfig;
use super::errors::ResearchError;

/// One fetched page, owned by the caller for the duration of a single
/// extraction. HTTP error statuses are reported here, never raised;
/// only transport-level problems surface as errors.
#[derive(Debug, Clone, Serialize)]
pub struct FetchOutcome {
    pub url: String,
    pub final_url: String,
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status_code)
    }

    pub fn redirected(&self) -> bool {
        self.final_url != self.url
    }
}

/// Result of a lightweight HEAD probe against a URL.
#[derive(Debug, Clone, Serialize)]
pub struct UrlStatus {
    pub url: String,
    pub final_url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub server: Option<String>,
    pub redirected: bool,
}

/// HTTP fetch boundary for the pipeline.
///
/// Wraps a shared `reqwest::Client` with browser-like headers, a
/// per-request timeout and a small retry budget for transport failures.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self, ResearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(
                config.max_redirects as usize,
            ))
            .build()
            .map_err(|e| ResearchError::network("client", e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Fetch a URL with a GET request.
    ///
    /// Transport failures are retried up to the configured attempt count
    /// with a jittered delay; HTTP error statuses are returned as-is in
    /// the outcome.
    pub async fn get(&self, url: &str) -> Result<FetchOutcome, ResearchError> {
        let mut last_error = None;

        for attempt in 0..=self.config.retry_attempts {
            match self.try_get(url).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) => {
                    log::debug!("fetch attempt {} for {} failed: {}", attempt + 1, url, e);
                    last_error = Some(e);
                }
            }

            if attempt < self.config.retry_attempts {
                let jitter = rand::thread_rng().gen_range(0.8..1.2);
                let delay = (self.config.retry_delay_ms as f64 * jitter) as u64;
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| ResearchError::network(url, "unknown fetch error")))
    }

    async fn try_get(&self, url: &str) -> Result<FetchOutcome, ResearchError> {
        let request = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .header("Upgrade-Insecure-Requests", "1");

        let response = timeout(
            Duration::from_secs(self.config.timeout_seconds),
            request.send(),
        )
        .await
        .map_err(|_| ResearchError::Timeout {
            url: url.to_string(),
            timeout_ms: self.config.timeout_seconds * 1000,
        })?
        .map_err(|e| ResearchError::network(url, e.to_string()))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = collect_headers(response.headers());
        let content_type = headers.get("content-type").cloned();

        let body = response
            .text()
            .await
            .map_err(|e| ResearchError::network(url, e.to_string()))?;

        Ok(FetchOutcome {
            url: url.to_string(),
            final_url,
            status_code,
            headers,
            content_type,
            body,
        })
    }

    /// Probe a URL with a HEAD request, reporting reachability without
    /// downloading the body.
    pub async fn check(&self, url: &str) -> Result<UrlStatus, ResearchError> {
        let response = timeout(
            Duration::from_secs(self.config.timeout_seconds),
            self.client.head(url).send(),
        )
        .await
        .map_err(|_| ResearchError::Timeout {
            url: url.to_string(),
            timeout_ms: self.config.timeout_seconds * 1000,
        })?
        .map_err(|e| ResearchError::network(url, e.to_string()))?;

        let headers = collect_headers(response.headers());
        let final_url = response.url().to_string();

        Ok(UrlStatus {
            url: url.to_string(),
            redirected: final_url != url,
            final_url,
            status_code: response.status().as_u16(),
            content_type: headers.get("content-type").cloned(),
            server: headers.get("server").cloned(),
        })
    }
}

fn collect_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_lowercase(), v.to_string()))
        })
        .collect()
}
