use crate::config::SourceConfig;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Why a single fetch attempt did not yield a usable payload.
///
/// Timeout and connection failures are retryable; an HTTP error means the
/// server explicitly answered and the request is never resubmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailureKind {
    Timeout,
    Connection,
    Http { status: u16 },
}

impl FetchFailureKind {
    pub fn retryable(&self) -> bool {
        matches!(self, FetchFailureKind::Timeout | FetchFailureKind::Connection)
    }
}

impl fmt::Display for FetchFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailureKind::Timeout => write!(f, "timeout"),
            FetchFailureKind::Connection => write!(f, "connection"),
            FetchFailureKind::Http { status } => write!(f, "http-error ({status})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: FetchFailureKind,
    /// Round trips made before giving up, including the failing one.
    pub attempts: u32,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fetch failed after {} attempt(s): {}", self.attempts, self.kind)
    }
}

impl std::error::Error for FetchFailure {}

/// Body and status of a 200 response.
#[derive(Debug, Clone)]
pub struct Payload {
    pub body: Vec<u8>,
    pub status: u16,
}

#[derive(Debug, Clone)]
pub struct FetchSuccess {
    pub body: Vec<u8>,
    pub status: u16,
    pub attempts: u32,
}

pub type FetchResult = Result<FetchSuccess, FetchFailure>;

/// One network round trip to the endpoint. Production uses [`HttpFetcher`];
/// tests substitute scripted doubles to drive the retry loop.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch_once(&self, url: &str, timeout: Duration) -> Result<Payload, FetchFailureKind>;
}

/// Runs the sequential retry loop over `fetch_once`.
///
/// Only timeout/connection failures are retried, up to `max_retries` extra
/// attempts, sleeping per the backoff policy between them. An exhausted loop
/// reports `max_retries + 1` attempts.
pub async fn fetch_with_retries(fetcher: &dyn Fetch, config: &SourceConfig) -> FetchResult {
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        match fetcher.fetch_once(&config.url, config.timeout).await {
            Ok(payload) => {
                return Ok(FetchSuccess {
                    body: payload.body,
                    status: payload.status,
                    attempts,
                })
            }
            Err(kind) => {
                if !kind.retryable() || attempts > config.max_retries {
                    return Err(FetchFailure { kind, attempts });
                }
                let delay = config.backoff.delay_for_attempt(attempts);
                warn!(
                    attempt = attempts,
                    delay_secs = delay.as_secs_f64(),
                    kind = %kind,
                    "fetch attempt failed, retrying"
                );
                sleep(delay).await;
            }
        }
    }
}

/// Issues real HTTP GET requests with a per-attempt timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch_once(&self, url: &str, timeout: Duration) -> Result<Payload, FetchFailureKind> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchFailureKind::Http {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(classify_error)?;
        Ok(Payload {
            body: body.to_vec(),
            status: status.as_u16(),
        })
    }
}

fn classify_error(error: reqwest::Error) -> FetchFailureKind {
    if error.is_timeout() {
        FetchFailureKind::Timeout
    } else {
        FetchFailureKind::Connection
    }
}
