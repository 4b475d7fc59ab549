//! Parallel HTTP fetch of orderbook endpoints.
//!
//! [`Fetcher::fetch_all`] takes a batch of URLs and returns one entry per URL,
//! in input order. `None` means the URL produced no usable JSON within the
//! retry budget (connection error, timeout, non-2xx status, undecodable
//! body). Individual failures never fail the batch; `Err` is reserved for
//! problems that prevent the batch from running at all.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use serde_json::Value;
use topbid_core::{TopBidError, config::RefreshConfig};
use tracing::debug;

/// Share of the refresh interval a batch may use before it is cut off.
const DEADLINE_NUMERATOR: u32 = 9;
const DEADLINE_DENOMINATOR: u32 = 10;

/// Retry, timeout and parallelism limits for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Attempts per URL (1 = no retry).
    pub max_tries: u32,
    /// Timeout of a single attempt.
    pub request_timeout: Duration,
    /// Hard limit for a URL including all of its retries.
    pub deadline: Duration,
    /// Upper bound on requests in flight.
    pub max_concurrency: usize,
}

impl FetchPolicy {
    /// Derive a policy for a refresh loop running every `interval`.
    ///
    /// The per-URL deadline is 90% of the interval so one slow batch cannot
    /// overlap the next tick; the attempt timeout is capped at that deadline.
    pub fn for_interval(refresh: &RefreshConfig, interval: Duration) -> Self {
        let deadline = interval * DEADLINE_NUMERATOR / DEADLINE_DENOMINATOR;
        Self {
            max_tries: refresh.max_tries,
            request_timeout: refresh.request_timeout().min(deadline),
            deadline,
            max_concurrency: refresh.max_concurrency,
        }
    }

    pub fn validate(&self) -> Result<(), TopBidError> {
        if self.max_tries == 0 || self.max_concurrency == 0 {
            return Err(TopBidError::Config(format!(
                "fetch policy needs max_tries > 0 and max_concurrency > 0 (got {} / {})",
                self.max_tries, self.max_concurrency
            )));
        }
        if self.request_timeout.is_zero() || self.deadline.is_zero() {
            return Err(TopBidError::Config("fetch policy timeouts must be non-zero".into()));
        }
        Ok(())
    }
}

/// Batch fetcher used by the refresh cycle.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch every URL concurrently. The result has the same length and
    /// order as `urls`.
    async fn fetch_all(&self, urls: &[String], policy: &FetchPolicy) -> Result<Vec<Option<Value>>, TopBidError>;
}

/// [`Fetcher`] backed by a shared `reqwest` client.
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    /// Build the HTTP client. Fails only if TLS initialisation fails.
    pub fn new(user_agent: Option<&str>) -> Result<Self, TopBidError> {
        let mut builder = reqwest::Client::builder();
        if let Some(ua) = user_agent {
            builder = builder.user_agent(ua.to_string());
        }
        let http = builder
            .build()
            .map_err(|e| TopBidError::Transport(format!("http client init failed: {e}")))?;
        Ok(Self { http })
    }

    async fn fetch_once(&self, url: &str, timeout: Duration) -> Result<Value, TopBidError> {
        let resp = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| TopBidError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| TopBidError::Transport(e.to_string()))?;

        resp.json::<Value>().await.map_err(|e| TopBidError::Parse(e.to_string()))
    }

    async fn fetch_with_retry(&self, url: &str, policy: &FetchPolicy) -> Option<Value> {
        for attempt in 1..=policy.max_tries {
            match self.fetch_once(url, policy.request_timeout).await {
                Ok(body) => return Some(body),
                Err(e) => debug!("[fetch] {url} attempt {attempt}/{} failed: {e}", policy.max_tries),
            }
        }
        None
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_all(&self, urls: &[String], policy: &FetchPolicy) -> Result<Vec<Option<Value>>, TopBidError> {
        policy.validate()?;
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        let deadline = tokio::time::Instant::now() + policy.deadline;
        let parallel = urls.len().min(policy.max_concurrency);

        let results = stream::iter(urls.iter().cloned())
            .map(move |url| async move {
                match tokio::time::timeout_at(deadline, self.fetch_with_retry(&url, policy)).await {
                    Ok(body) => body,
                    Err(_) => {
                        debug!("[fetch] {url} exceeded the {:?} batch deadline", policy.deadline);
                        None
                    }
                }
            })
            .buffered(parallel)
            .collect::<Vec<_>>()
            .await;

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_is_shorter_than_interval() {
        let refresh = RefreshConfig::default();
        let policy = FetchPolicy::for_interval(&refresh, Duration::from_secs(2));
        assert_eq!(policy.deadline, Duration::from_millis(1_800));
        assert_eq!(policy.request_timeout, Duration::from_secs(1));
        assert_eq!(policy.max_tries, 2);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn attempt_timeout_capped_by_deadline() {
        let refresh = RefreshConfig::default();
        let policy = FetchPolicy::for_interval(&refresh, Duration::from_millis(100));
        assert_eq!(policy.deadline, Duration::from_millis(90));
        assert_eq!(policy.request_timeout, Duration::from_millis(90));
    }

    #[test]
    fn zero_interval_policy_is_invalid() {
        let policy = FetchPolicy::for_interval(&RefreshConfig::default(), Duration::ZERO);
        assert!(matches!(policy.validate(), Err(TopBidError::Config(_))));
    }

    #[tokio::test]
    async fn empty_batch_returns_empty() {
        let fetcher = HttpFetcher::new(None).unwrap();
        let policy = FetchPolicy::for_interval(&RefreshConfig::default(), Duration::from_secs(1));
        assert!(fetcher.fetch_all(&[], &policy).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_url_yields_none() {
        let fetcher = HttpFetcher::new(None).unwrap();
        let policy = FetchPolicy {
            max_tries: 1,
            request_timeout: Duration::from_millis(200),
            deadline: Duration::from_millis(300),
            max_concurrency: 4,
        };
        // Port 9 (discard) on localhost is closed on test machines.
        let urls = vec!["http://127.0.0.1:9/depth".to_string()];
        let out = fetcher.fetch_all(&urls, &policy).await.unwrap();
        assert_eq!(out, vec![None]);
    }

    /// One-shot HTTP server answering every connection with `body`.
    async fn serve_json(body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                let mut buf = [0u8; 2048];
                let _ = sock.read(&mut buf).await;
                let resp = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
            }
        });
        format!("http://{addr}/depth")
    }

    #[tokio::test]
    async fn results_keep_input_order() {
        let fetcher = HttpFetcher::new(None).unwrap();
        let policy = FetchPolicy {
            max_tries: 1,
            request_timeout: Duration::from_millis(500),
            deadline: Duration::from_millis(800),
            max_concurrency: 4,
        };
        let live = serve_json(r#"{"lastUpdateId":1,"bids":[["1.5","2"]],"asks":[["1.6","3"]]}"#).await;
        let urls = vec!["http://127.0.0.1:9/depth".to_string(), live.clone(), live];
        let out = fetcher.fetch_all(&urls, &policy).await.unwrap();
        assert_eq!(out.len(), 3);
        assert!(out[0].is_none());
        assert_eq!(out[1].as_ref().and_then(|v| v.get("lastUpdateId")), Some(&serde_json::json!(1)));
        assert_eq!(out[1], out[2]);
    }

    #[tokio::test]
    async fn invalid_policy_fails_batch() {
        let fetcher = HttpFetcher::new(None).unwrap();
        let policy = FetchPolicy {
            max_tries: 0,
            request_timeout: Duration::from_millis(10),
            deadline: Duration::from_millis(10),
            max_concurrency: 1,
        };
        let urls = vec!["http://127.0.0.1:9/".to_string()];
        assert!(fetcher.fetch_all(&urls, &policy).await.is_err());
    }
}
