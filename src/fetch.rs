//! Booking-page fetching with identity rotation and retry backoff.
//!
//! Booking sites throttle and block scripted traffic, so the fetcher presents
//! a rotating browser identity and retries transient failures with
//! exponential backoff. Extraction itself never sees any of this: the driver
//! converts a fetch that still fails after retries into empty markup, which
//! extracts to an empty inventory.
//!
//! # Architecture
//!
//! - [`FetchPage`]: trait for fetching one page body
//! - [`HttpFetcher`]: reqwest-backed implementation with rotating headers
//! - [`RetryFetch`]: decorator adding bounded exponential backoff to any
//!   [`FetchPage`] implementation

use rand::{Rng, rng};
use reqwest::Client;
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};
use url::Url;

/// Browser identities presented on outgoing requests, one picked at random
/// per request so repeated runs don't share a stable fingerprint.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
];

const ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Trait for fetching one page body by URL.
///
/// Implementors return the response body text; any transport problem is an
/// error. Decorators like [`RetryFetch`] layer policy on top.
pub trait FetchPage {
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>>;
}

/// Reqwest-backed fetcher with a 30 second timeout and rotating identity
/// headers.
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let agent = USER_AGENTS[rng().random_range(0..USER_AGENTS.len())];
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .header("User-Agent", agent)
            .header("Accept", ACCEPT)
            .header("Referer", "https://www.google.com/")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await?;
        let body = response.text().await?;
        let dt = t0.elapsed();
        tracing::debug!(elapsed_ms = dt.as_millis() as u128, bytes = body.len(), "Fetched page");
        Ok(body)
    }
}

/// Decorator that adds exponential backoff retry logic to any [`FetchPage`]
/// implementation.
///
/// # Backoff Strategy
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: FetchPage,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> FetchPage for RetryFetch<T>
where
    T: FetchPage + fmt::Debug,
{
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(url).await {
                Ok(body) => {
                    return Ok(body);
                }
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_dt.as_millis() as u128,
                            error = %e,
                            "fetch() exhausted retries"
                        );
                        return Err(e);
                    }

                    // backoff calc
                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis() as u128,
                        ?delay,
                        error = %e,
                        "fetch() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Append the stay window to a target URL as `checkin`/`checkout` query
/// parameters, preserving whatever query the URL already carries.
pub fn stay_url(base: &str, checkin: &str, checkout: &str) -> Result<String, Box<dyn Error>> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut()
        .append_pair("checkin", checkin)
        .append_pair("checkout", checkout);
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_stay_url_appends_dates() {
        let url = stay_url(
            "https://www.booking.com/hotel/in/example.html",
            "2025-06-02",
            "2025-06-03",
        )
        .unwrap();
        assert!(url.contains("checkin=2025-06-02"));
        assert!(url.contains("checkout=2025-06-03"));
    }

    #[test]
    fn test_stay_url_preserves_existing_query() {
        let url = stay_url(
            "https://www.booking.com/hotel/in/example.html?lang=en",
            "2025-06-02",
            "2025-06-03",
        )
        .unwrap();
        assert!(url.contains("lang=en"));
        assert!(url.contains("checkin=2025-06-02"));
    }

    #[test]
    fn test_stay_url_rejects_garbage() {
        assert!(stay_url("not a url", "2025-06-02", "2025-06-03").is_err());
    }

    #[test]
    fn test_user_agents_look_like_browsers() {
        assert!(!USER_AGENTS.is_empty());
        for agent in USER_AGENTS {
            assert!(agent.starts_with("Mozilla/5.0"));
        }
    }

    /// Fails a fixed number of times, then succeeds.
    #[derive(Debug)]
    struct FlakyFetcher {
        failures: usize,
        calls: AtomicUsize,
    }

    impl FetchPage for FlakyFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, Box<dyn Error>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err("simulated transport failure".into())
            } else {
                Ok("<html></html>".to_string())
            }
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failures() {
        let flaky = FlakyFetcher {
            failures: 2,
            calls: AtomicUsize::new(0),
        };
        let fetcher = RetryFetch::new(flaky, 3, StdDuration::from_millis(1));
        let body = fetcher.fetch("https://example.com").await.unwrap();
        assert_eq!(body, "<html></html>");
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_retries() {
        let flaky = FlakyFetcher {
            failures: 10,
            calls: AtomicUsize::new(0),
        };
        let fetcher = RetryFetch::new(flaky, 2, StdDuration::from_millis(1));
        let result = fetcher.fetch("https://example.com").await;
        assert!(result.is_err());
        assert_eq!(fetcher.inner.calls.load(Ordering::SeqCst), 3);
    }
}
