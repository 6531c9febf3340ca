/// Steam Store catalog provider
///
/// Looks up a single app through `/appdetails?appids={id}`. Steam wraps the
/// payload in an envelope keyed by the requested id:
///
/// ```text
/// { "292030": { "success": true, "data": { "name": "...", ... } } }
/// ```
///
/// Every attempt is classified as found, permanently unavailable (unknown id,
/// region lock, `success: false`, 4xx) or transient (timeout, connection
/// failure, 429, 5xx). Only transient failures are retried, with exponential
/// backoff.
use crate::{
    error::AppResult,
    models::CatalogEntry,
    services::providers::{CatalogError, CatalogSource},
};
use reqwest::{Client as HttpClient, StatusCode};
use std::future::Future;
use std::time::Duration;

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for every further one
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Backoff after the given failed attempt (1-based): base, 2x base, 4x base, ...
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }
}

/// Outcome of a single catalog request
#[derive(Debug)]
pub(crate) enum FetchAttempt {
    Found(CatalogEntry),
    Permanent(String),
    Transient(String),
}

#[derive(Clone)]
pub struct SteamStoreCatalog {
    http_client: HttpClient,
    api_url: String,
    retry: RetryPolicy,
}

impl SteamStoreCatalog {
    pub fn new(api_url: String, timeout: Duration, retry: RetryPolicy) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_url,
            retry,
        })
    }

    /// Issues one `appdetails` request and classifies the result
    async fn attempt(&self, game_id: &str) -> FetchAttempt {
        let url = format!("{}/appdetails", self.api_url);

        let response = match self
            .http_client
            .get(&url)
            .query(&[("appids", game_id)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return FetchAttempt::Transient(format!("request failed: {}", e)),
        };

        let status = response.status();
        if !status.is_success() {
            return classify_status(status);
        }

        match response.text().await {
            Ok(body) => parse_app_details(game_id, &body),
            Err(e) => FetchAttempt::Transient(format!("failed to read body: {}", e)),
        }
    }
}

#[async_trait::async_trait]
impl CatalogSource for SteamStoreCatalog {
    async fn fetch_entry(&self, game_id: &str) -> Result<CatalogEntry, CatalogError> {
        fetch_with_retry(&self.retry, game_id, |_| self.attempt(game_id)).await
    }
}

/// Classifies a non-success HTTP status
fn classify_status(status: StatusCode) -> FetchAttempt {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        FetchAttempt::Transient(format!("status {}", status))
    } else {
        FetchAttempt::Permanent(format!("status {}", status))
    }
}

/// Unwraps the `appdetails` envelope for `game_id`
pub(crate) fn parse_app_details(game_id: &str, body: &str) -> FetchAttempt {
    let envelope: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => return FetchAttempt::Permanent(format!("undecodable response: {}", e)),
    };

    let Some(result) = envelope.get(game_id) else {
        return FetchAttempt::Permanent("no entry for requested id".to_string());
    };

    if !result["success"].as_bool().unwrap_or(false) {
        return FetchAttempt::Permanent("catalog reported success=false".to_string());
    }

    match result.get("data") {
        Some(data) if data.is_object() => match serde_json::from_value(data.clone()) {
            Ok(entry) => FetchAttempt::Found(entry),
            Err(e) => FetchAttempt::Permanent(format!("invalid entry data: {}", e)),
        },
        _ => FetchAttempt::Permanent("entry has no data".to_string()),
    }
}

/// Drives `attempt_fn` until it finds an entry, fails permanently, or the
/// policy's attempts run out. Sleeps only between transient failures.
pub(crate) async fn fetch_with_retry<F, Fut>(
    policy: &RetryPolicy,
    game_id: &str,
    mut attempt_fn: F,
) -> Result<CatalogEntry, CatalogError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = FetchAttempt>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match attempt_fn(attempt).await {
            FetchAttempt::Found(entry) => {
                tracing::debug!(game_id = %game_id, attempt, "Catalog entry fetched");
                return Ok(entry);
            }
            FetchAttempt::Permanent(reason) => {
                tracing::info!(
                    game_id = %game_id,
                    attempt,
                    reason = %reason,
                    "Catalog entry permanently unavailable"
                );
                return Err(CatalogError::NotAvailable(game_id.to_string()));
            }
            FetchAttempt::Transient(reason) if attempt < max_attempts => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    game_id = %game_id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    reason = %reason,
                    "Transient catalog failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            FetchAttempt::Transient(reason) => {
                tracing::warn!(
                    game_id = %game_id,
                    attempts = max_attempts,
                    reason = %reason,
                    "Catalog retries exhausted"
                );
            }
        }
    }

    Err(CatalogError::NotAvailable(game_id.to_string()))
}
