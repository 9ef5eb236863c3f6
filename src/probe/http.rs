//! HTTP probing (component C3, `spec.md` §4.3 `probe_http`). Tries plain
//! HTTP then HTTPS, following redirects, with TLS verification disabled —
//! a live-but-mismatched certificate is itself evidence, not a reason to
//! fail the request.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use regex::Regex;
use reqwest::Client;

use crate::scheduler::rate_limiter::RateLimiter;

const MAX_BODY_BYTES: usize = 5 * 1024;
const MAX_TITLE_CHARS: usize = 100;

static TITLE_RE: once_cell::sync::Lazy<Regex> =
    once_cell::sync::Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());

/// Result of one scheme attempt (`http://` or `https://`).
#[derive(Debug, Clone)]
pub struct ProbeAttempt {
    pub url: String,
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub title: Option<String>,
    pub elapsed: Duration,
}

/// Outcome of `probe_http(host)`: the attempt(s) that produced a response.
/// `https_attempt` is `None` when the `http://` attempt already produced a
/// 2xx/3xx response and short-circuited the scheme walk.
#[derive(Debug, Clone, Default)]
pub struct HttpProbeOutcome {
    pub http_attempt: Option<ProbeAttempt>,
    pub https_attempt: Option<ProbeAttempt>,
}

impl HttpProbeOutcome {
    pub fn is_live(&self) -> bool {
        self.http_attempt.is_some() || self.https_attempt.is_some()
    }

    /// The attempt a detector should draw body/title/headers/TLS-target
    /// from: whichever scheme produced a live response, preferring the one
    /// that short-circuited (http) and falling back to https.
    pub fn primary(&self) -> Option<&ProbeAttempt> {
        self.http_attempt
            .iter()
            .chain(self.https_attempt.iter())
            .find(|a| (200..400).contains(&a.status))
            .or(self.https_attempt.as_ref())
            .or(self.http_attempt.as_ref())
    }
}

pub struct HttpProber {
    client: Client,
    limiter: Option<Arc<RateLimiter>>,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self, crate::error::DetectorError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .danger_accept_invalid_certs(true)
            .user_agent(concat!("subtakeover/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(crate::error::DetectorError::HttpClientBuild)?;
        Ok(Self { client, limiter: None })
    }

    /// Gates every attempt through `limiter` (`spec.md` §4.5: "a
    /// per-external-service limiter bounds calls/second... for... HTTP
    /// probes"). Built separately from [`Self::new`] so existing call
    /// sites and tests that don't care about rate limiting are unaffected.
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Attempts `http://host` then `https://host`; short-circuits on the
    /// first 2xx/3xx response (`spec.md` §4.3).
    pub async fn probe(&self, host: &str) -> HttpProbeOutcome {
        let http_attempt = self.attempt(&format!("http://{host}")).await;
        if let Some(ref a) = http_attempt {
            if (200..400).contains(&a.status) {
                return HttpProbeOutcome {
                    http_attempt,
                    https_attempt: None,
                };
            }
        }
        let https_attempt = self.attempt(&format!("https://{host}")).await;
        HttpProbeOutcome {
            http_attempt,
            https_attempt,
        }
    }

    async fn attempt(&self, url: &str) -> Option<ProbeAttempt> {
        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }
        let start = Instant::now();
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(_) => return None,
        };

        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value_str) = value.to_str() {
                headers.insert(name.to_string().to_ascii_lowercase(), value_str.to_string());
            }
        }

        let full_body = response.text().await.unwrap_or_default();
        let body = truncate_to_byte_boundary(&full_body, MAX_BODY_BYTES).to_string();
        let title = TITLE_RE
            .captures(&full_body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.chars().take(MAX_TITLE_CHARS).collect());

        Some(ProbeAttempt {
            url: final_url,
            status,
            headers,
            body,
            title,
            elapsed: start.elapsed(),
        })
    }
}

/// Truncates `s` to at most `max_bytes`, backing off to the nearest
/// preceding char boundary so multi-byte UTF-8 sequences never get split.
fn truncate_to_byte_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
