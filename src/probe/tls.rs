//! TLS certificate probe (component C3, `spec.md` §4.3 `probe_tls_cert`).
//! Opens a raw TLS handshake with hostname verification disabled — the
//! point is to see what certificate a host actually presents, including a
//! mismatched or self-signed one, since that mismatch is itself evidence
//! (Stage 7).

use std::net::ToSocketAddrs;
use std::sync::Arc;
use std::time::Duration;

use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode};
use openssl::x509::X509;
use tokio::net::TcpStream;
use tokio_openssl::SslStream;
use tracing::debug;

use crate::scheduler::rate_limiter::RateLimiter;

/// CN and SAN entries extracted from the leaf certificate, if a handshake
/// succeeded at all. Absence of a certificate is not itself a mismatch —
/// see `spec.md` §4.3: "Failure returns (none, false)".
#[derive(Debug, Clone, Default)]
pub struct TlsCertInfo {
    pub common_name: Option<String>,
    pub subject_alt_names: Vec<String>,
}

impl TlsCertInfo {
    /// All names this certificate claims to cover, CN first.
    pub fn all_names(&self) -> Vec<&str> {
        self.common_name
            .iter()
            .map(|s| s.as_str())
            .chain(self.subject_alt_names.iter().map(|s| s.as_str()))
            .collect()
    }
}

pub struct TlsProber {
    timeout: Duration,
    limiter: Option<Arc<RateLimiter>>,
}

impl TlsProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout, limiter: None }
    }

    /// Gates every handshake through `limiter`, same service class as the
    /// HTTP prober (`spec.md` §4.5).
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Connects to `host:port`, reads the peer leaf certificate, and
    /// reports whether `host` matches none of its names (`ssl_mismatch`).
    /// Returns `(None, false)` on any connection/handshake failure.
    pub async fn probe(&self, host: &str, port: u16) -> (Option<TlsCertInfo>, bool) {
        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }
        match tokio::time::timeout(self.timeout, self.handshake(host, port)).await {
            Ok(Ok(cert)) => {
                let mismatch = !matches_any_name(host, &cert.all_names());
                (Some(cert), mismatch)
            }
            Ok(Err(e)) => {
                debug!(%host, error = %e, "tls handshake failed");
                (None, false)
            }
            Err(_) => {
                debug!(%host, "tls handshake timed out");
                (None, false)
            }
        }
    }

    async fn handshake(&self, host: &str, port: u16) -> anyhow::Result<TlsCertInfo> {
        let addr = (host, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| anyhow::anyhow!("no address for {host}"))?;
        let tcp = TcpStream::connect(addr).await?;

        let mut builder = SslConnector::builder(SslMethod::tls())?;
        builder.set_verify(SslVerifyMode::NONE);
        let connector = builder.build();
        let ssl = connector.configure()?.into_ssl(host)?;

        let mut stream = SslStream::new(ssl, tcp)?;
        std::pin::Pin::new(&mut stream).connect().await?;

        let cert = stream
            .ssl()
            .peer_certificate()
            .ok_or_else(|| anyhow::anyhow!("no peer certificate presented"))?;

        Ok(extract_names(&cert))
    }
}

fn extract_names(cert: &X509) -> TlsCertInfo {
    let common_name = cert
        .subject_name()
        .entries_by_nid(openssl::nid::Nid::COMMONNAME)
        .next()
        .and_then(|entry| entry.data().as_utf8().ok())
        .map(|s| s.to_string());

    let subject_alt_names = cert
        .subject_alt_names()
        .map(|sans| {
            sans.iter()
                .filter_map(|name| name.dnsname().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default();

    TlsCertInfo {
        common_name,
        subject_alt_names,
    }
}

/// Wildcard-aware name match (`spec.md` §4.3): `*.foo.bar` matches any
/// single-label prefix of `foo.bar`, e.g. `app.foo.bar` but not
/// `a.b.foo.bar`.
pub fn matches_any_name(host: &str, names: &[&str]) -> bool {
    let host = host.to_ascii_lowercase();
    names.iter().any(|name| matches_name(&host, &name.to_ascii_lowercase()))
}

fn matches_name(host: &str, pattern: &str) -> bool {
    if let Some(suffix) = pattern.strip_prefix("*.") {
        match host.split_once('.') {
            Some((_, rest)) => rest == suffix,
            None => false,
        }
    } else {
        host == pattern
    }
}
