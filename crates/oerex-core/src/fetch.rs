//! HTTP document fetching with retry, backoff, and rate-limit delays.
//!
//! Uses async reqwest internally through a shared tokio runtime, but
//! presents a sync interface: the pipeline is deliberately sequential and
//! the per-request delay is its throughput ceiling.

use std::sync::LazyLock;
use std::time::Duration;

use rand::Rng;

/// Connect timeout for all requests
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .expect("failed to build HTTP client")
});

/// Shared tokio runtime for HTTP operations.
static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Error from fetching a single document.
#[derive(Debug)]
pub enum FetchError {
    /// Terminal non-2xx status (403/404 and other non-retryable rejections)
    Rejected(u16),
    /// Retry budget exhausted on transient failures (5xx, 429, transport)
    Exhausted { attempts: u32 },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(status) => write!(f, "rejected with HTTP {status}"),
            Self::Exhausted { attempts } => write!(f, "exhausted after {attempts} attempts"),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// 403/404 (and any other `Rejected`) are terminal; everything else
    /// was already retried internally.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// A successfully fetched document: final URL plus raw body text.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub url: String,
    pub body: String,
}

/// Tunable fetch policy. Defaults mirror the polite-crawling settings
/// the source tolerates.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Base delay before each request, in seconds
    pub request_delay: Duration,
    /// Jitter fraction applied to the base delay (0.3 = +/-30%)
    pub jitter_frac: f64,
    /// Maximum attempts per URL for transient failures
    pub max_retries: u32,
    /// Base wait for linear backoff between transient-failure attempts
    pub backoff_base: Duration,
    /// Base wait after a 429, scaled by attempt number
    pub rate_limit_wait: Duration,
    /// Per-request read timeout
    pub timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_delay: Duration::from_millis(1500),
            jitter_frac: 0.3,
            max_retries: 3,
            backoff_base: Duration::from_secs(5),
            rate_limit_wait: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Synchronous HTTP fetcher enforcing delay and retry policy.
pub struct Fetcher {
    config: FetcherConfig,
}

impl Fetcher {
    pub fn new(config: FetcherConfig) -> Self {
        Self { config }
    }

    /// Randomized delay centered on the configured base, `+/- jitter_frac`.
    fn polite_delay(&self) {
        let base = self.config.request_delay.as_secs_f64();
        let jitter = self.config.jitter_frac;
        let secs = rand::thread_rng().gen_range(base * (1.0 - jitter)..=base * (1.0 + jitter));
        std::thread::sleep(Duration::from_secs_f64(secs));
    }

    /// Fetch a single URL, retrying transient failures.
    ///
    /// Policy:
    /// - delay with jitter before every attempt
    /// - 200 => `Ok(RawDocument)`
    /// - 403/404 => `FetchError::Rejected`, no retry
    /// - 429 => wait `rate_limit_wait * attempt`, retry
    /// - 5xx / transport error => wait `backoff_base * attempt`, retry
    /// - retries exhausted => `FetchError::Exhausted`
    pub fn fetch(&self, url: &str) -> Result<RawDocument, FetchError> {
        self.fetch_with(url, |u| self.get_once(u))
    }

    /// Retry loop over an injected attempt function (unit-testable without
    /// a network).
    fn fetch_with(
        &self,
        url: &str,
        mut attempt_fn: impl FnMut(&str) -> Result<RawDocument, Attempt>,
    ) -> Result<RawDocument, FetchError> {
        let max = self.config.max_retries;
        for attempt in 1..=max {
            self.polite_delay();

            match attempt_fn(url) {
                Ok(doc) => return Ok(doc),
                Err(Attempt::Terminal(status)) => {
                    log::warn!("HTTP {status} for {url}, not retrying");
                    return Err(FetchError::Rejected(status));
                }
                Err(Attempt::RateLimited) => {
                    let wait = self.config.rate_limit_wait * attempt;
                    log::warn!(
                        "rate limited (429) for {url}, attempt {attempt}/{max}, waiting {wait:?}"
                    );
                    std::thread::sleep(wait);
                }
                Err(Attempt::Transient(msg)) => {
                    log::warn!("transient failure for {url}, attempt {attempt}/{max}: {msg}");
                    if attempt < max {
                        std::thread::sleep(self.config.backoff_base * attempt);
                    }
                }
            }
        }
        log::error!("giving up on {url} after {max} attempts");
        Err(FetchError::Exhausted { attempts: max })
    }

    fn get_once(&self, url: &str) -> Result<RawDocument, Attempt> {
        let timeout = self.config.timeout;
        SHARED_RUNTIME.block_on(async {
            let response = SHARED_CLIENT
                .get(url)
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| Attempt::Transient(e.to_string()))?;

            let status = response.status().as_u16();
            match status {
                200..=299 => {
                    let final_url = response.url().to_string();
                    let body = response
                        .text()
                        .await
                        .map_err(|e| Attempt::Transient(e.to_string()))?;
                    Ok(RawDocument {
                        url: final_url,
                        body,
                    })
                }
                429 => Err(Attempt::RateLimited),
                403 | 404 => Err(Attempt::Terminal(status)),
                500..=599 => Err(Attempt::Transient(format!("HTTP {status}"))),
                other => Err(Attempt::Terminal(other)),
            }
        })
    }
}

/// Outcome of a single request attempt, before retry policy is applied.
enum Attempt {
    Transient(String),
    RateLimited,
    Terminal(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_not_retryable() {
        assert!(!FetchError::Rejected(403).is_retryable());
        assert!(!FetchError::Rejected(404).is_retryable());
    }

    #[test]
    fn exhausted_retryable() {
        assert!(FetchError::Exhausted { attempts: 3 }.is_retryable());
    }

    #[test]
    fn display_includes_status() {
        let msg = format!("{}", FetchError::Rejected(404));
        assert!(msg.contains("404"));
        let msg = format!("{}", FetchError::Exhausted { attempts: 3 });
        assert!(msg.contains('3'));
    }

    #[test]
    fn default_config_sane() {
        let c = FetcherConfig::default();
        assert!(c.jitter_frac < 1.0);
        assert!(c.max_retries >= 1);
        assert!(c.rate_limit_wait > c.request_delay);
    }

    fn fast_fetcher(max_retries: u32) -> Fetcher {
        Fetcher::new(FetcherConfig {
            request_delay: Duration::from_millis(1),
            jitter_frac: 0.0,
            max_retries,
            backoff_base: Duration::from_millis(1),
            rate_limit_wait: Duration::from_millis(1),
            timeout: Duration::from_secs(1),
        })
    }

    fn ok_doc() -> RawDocument {
        RawDocument {
            url: "http://example.test/a".into(),
            body: "body".into(),
        }
    }

    #[test]
    fn succeeds_after_three_rate_limits() {
        let fetcher = fast_fetcher(5);
        let mut calls = 0u32;
        let result = fetcher.fetch_with("http://example.test/a", |_| {
            calls += 1;
            if calls <= 3 {
                Err(Attempt::RateLimited)
            } else {
                Ok(ok_doc())
            }
        });
        assert!(result.is_ok());
        assert_eq!(calls, 4);
    }

    #[test]
    fn exhausts_on_persistent_rate_limit() {
        let fetcher = fast_fetcher(3);
        let result = fetcher.fetch_with("http://example.test/a", |_| {
            Err::<RawDocument, _>(Attempt::RateLimited)
        });
        assert!(matches!(result, Err(FetchError::Exhausted { attempts: 3 })));
    }

    #[test]
    fn terminal_status_stops_immediately() {
        let fetcher = fast_fetcher(3);
        let mut calls = 0u32;
        let result = fetcher.fetch_with("http://example.test/a", |_| {
            calls += 1;
            Err::<RawDocument, _>(Attempt::Terminal(404))
        });
        assert!(matches!(result, Err(FetchError::Rejected(404))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn transient_then_success() {
        let fetcher = fast_fetcher(3);
        let mut calls = 0u32;
        let result = fetcher.fetch_with("http://example.test/a", |_| {
            calls += 1;
            if calls == 1 {
                Err(Attempt::Transient("HTTP 503".into()))
            } else {
                Ok(ok_doc())
            }
        });
        assert!(result.is_ok());
        assert_eq!(calls, 2);
    }
}
