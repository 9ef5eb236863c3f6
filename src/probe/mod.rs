//! Probe Layer (component C3): HTTP(S) fetch and TLS certificate
//! extraction. Both probes disable verification/strictness that would
//! otherwise hide the very signal being looked for (a mismatched cert, a
//! non-2xx response) — see `spec.md` §4.3.

pub mod http;
pub mod tls;

pub use http::{HttpProbeOutcome, HttpProber, ProbeAttempt};
pub use tls::{TlsCertInfo, TlsProber};
