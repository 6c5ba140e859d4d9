//! HTTP client with rate limiting awareness.
//!
//! Provides a wrapper around reqwest with:
//! - Rate limit tracking from response headers, kept per service
//! - Refusing requests while that service's limit is exhausted
//! - Configurable timeouts
//! - User-agent management

use crate::config::NetworkConfig;
use crate::{ModSyncError, Result};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};

/// Rate limit state extracted from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimitState {
    /// Remaining requests allowed.
    pub remaining: Option<u64>,
    /// Unix timestamp when the rate limit resets.
    pub reset: Option<u64>,
}

impl RateLimitState {
    /// Whether the limit is used up and has not reset yet at `now`.
    pub fn is_exhausted(&self, now: u64) -> bool {
        match (self.remaining, self.reset) {
            (Some(0), Some(reset)) => reset > now,
            _ => false,
        }
    }

    /// Seconds until the limit resets, if known.
    pub fn secs_until_reset(&self, now: u64) -> Option<u64> {
        self.reset.filter(|reset| *reset > now).map(|reset| reset - now)
    }
}

/// HTTP client shared by every backend fetcher.
///
/// Rate limits are tracked per service name, so one exhausted API never
/// blocks requests to another.
pub struct HttpClient {
    client: Client,
    rate_limits: Mutex<HashMap<String, RateLimitState>>,
    timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_timeout(NetworkConfig::REQUEST_TIMEOUT)
    }

    /// Create a new HTTP client with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| ModSyncError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: None,
            })?;

        Ok(Self {
            client,
            rate_limits: Mutex::new(HashMap::new()),
            timeout,
        })
    }

    /// Get a reference to the underlying reqwest client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the last rate limit state seen for `service`.
    pub fn rate_limit_state(&self, service: &str) -> RateLimitState {
        self.rate_limits()
            .get(service)
            .cloned()
            .unwrap_or_default()
    }

    /// Overwrite the known rate limit state for `service`.
    pub fn set_rate_limit_state(&self, service: &str, state: RateLimitState) {
        self.rate_limits().insert(service.to_string(), state);
    }

    fn rate_limits(&self) -> MutexGuard<'_, HashMap<String, RateLimitState>> {
        self.rate_limits
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Send a request built from [`inner`](Self::inner).
    ///
    /// Returns `Ok(None)` for 404, the response for any 2xx, and an error
    /// for everything else.
    pub async fn send(&self, request: RequestBuilder, service: &str) -> Result<Option<Response>> {
        let state = self.rate_limit_state(service);
        let now = unix_now();
        if state.is_exhausted(now) {
            warn!("{} rate limit exhausted, not sending request", service);
            return Err(ModSyncError::RateLimited {
                service: service.to_string(),
                retry_after_secs: state.secs_until_reset(now),
            });
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ModSyncError::Timeout(self.timeout)
            } else {
                ModSyncError::Network {
                    message: format!("{} request failed: {}", service, e),
                    cause: e.url().map(|u| extract_domain(u.as_str())),
                }
            }
        })?;

        self.update_rate_limits(&response, service);
        self.check_response_status(response, service)
    }

    fn update_rate_limits(&self, response: &Response, service: &str) {
        let headers = response.headers();
        let remaining = header_number::<u64>(headers, "X-RateLimit-Remaining");
        let reset = header_number::<u64>(headers, "X-RateLimit-Reset");
        if remaining.is_none() && reset.is_none() {
            return;
        }

        let mut limits = self.rate_limits();
        let state = limits.entry(service.to_string()).or_default();
        if remaining.is_some() {
            state.remaining = remaining;
        }
        if reset.is_some() {
            state.reset = reset;
        }
        if let Some(remaining) = state.remaining {
            debug!("{} rate limit remaining: {}", service, remaining);
        }
    }

    fn check_response_status(&self, response: Response, service: &str) -> Result<Option<Response>> {
        let status = response.status();

        if status.is_success() {
            return Ok(Some(response));
        }
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let exhausted = response
            .headers()
            .get("X-RateLimit-Remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim() == "0");
        if status == StatusCode::TOO_MANY_REQUESTS || (status == StatusCode::FORBIDDEN && exhausted) {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());

            return Err(ModSyncError::RateLimited {
                service: service.to_string(),
                retry_after_secs: retry_after,
            });
        }

        Err(ModSyncError::Api {
            service: service.to_string(),
            message: format!("returned {}", status),
            status_code: Some(status.as_u16()),
        })
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("timeout", &self.timeout)
            .field("rate_limits", &*self.rate_limits())
            .finish()
    }
}

fn header_number<T: std::str::FromStr>(headers: &header::HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<T>().ok())
}

pub(crate) fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

/// Extract domain from a URL.
pub fn extract_domain(url: &str) -> String {
    url::Url::parse(url)
        .map(|u| u.host_str().unwrap_or("unknown").to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_exhaustion() {
        let state = RateLimitState {
            remaining: Some(0),
            reset: Some(1_000),
        };
        assert!(state.is_exhausted(900));
        assert_eq!(state.secs_until_reset(900), Some(100));
        assert!(!state.is_exhausted(1_000));

        let state = RateLimitState {
            remaining: Some(3),
            reset: Some(1_000),
        };
        assert!(!state.is_exhausted(900));
        assert!(!RateLimitState::default().is_exhausted(0));
    }

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            extract_domain("https://api.github.com/repos/foo/bar"),
            "api.github.com"
        );
        assert_eq!(
            extract_domain("https://api.nexusmods.com/v1/games/x/mods/1.json"),
            "api.nexusmods.com"
        );
        assert_eq!(extract_domain("invalid-url"), "unknown");
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = HttpClient::new().unwrap();
        let state = client.rate_limit_state("GitHub");
        assert!(state.remaining.is_none());
        assert!(state.reset.is_none());
    }

    #[tokio::test]
    async fn test_exhausted_limit_only_blocks_its_own_service() {
        let client = HttpClient::new().unwrap();
        client.set_rate_limit_state(
            "GitHub",
            RateLimitState {
                remaining: Some(0),
                reset: Some(unix_now() + 3600),
            },
        );

        let blocked = client
            .send(client.inner().get("http://127.0.0.1:1/"), "GitHub")
            .await
            .unwrap_err();
        assert!(matches!(blocked, ModSyncError::RateLimited { ref service, .. } if service == "GitHub"));

        // Steam has its own budget, so the request goes out and fails on the
        // closed port instead.
        let sent = client
            .send(client.inner().get("http://127.0.0.1:1/"), "Steam")
            .await
            .unwrap_err();
        assert!(matches!(sent, ModSyncError::Network { .. }));
        assert!(client.rate_limit_state("Steam").remaining.is_none());
    }
}
