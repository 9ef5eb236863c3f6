//! Evidence string builders, one per signal kind named in `spec.md` §3's
//! Invariants list. Kept separate from the scoring arithmetic in
//! [`super::score`] so the human-readable wording can change without
//! touching the weight table.

pub fn ns_delegation(dangling_ns: &[String]) -> String {
    format!(
        "NS delegation to dead nameserver(s): {}",
        dangling_ns.join(", ")
    )
}

pub fn cname_nxdomain() -> String {
    "CNAME head resolves to NXDOMAIN".to_string()
}

pub fn chain_link_nxdomain(count: usize) -> String {
    format!("{count} intermediate CNAME chain link(s) are dangling (NXDOMAIN)")
}

pub fn expected_status(status: u16) -> String {
    format!("HTTP response status {status} matches provider's expected dangling-resource status")
}

pub fn error_pattern(pattern: &str) -> String {
    format!("response body contains provider error marker: \"{pattern}\"")
}

pub fn claimed_marker(marker: &str) -> String {
    format!("response body contains claimed-site marker: \"{marker}\"")
}

pub fn no_claimed_marker() -> String {
    "no claimed-site marker present in response body".to_string()
}

pub fn ssl_mismatch() -> String {
    "TLS certificate name does not match the hostname".to_string()
}

pub fn dangling_a_record() -> String {
    "A record resolves into a known cloud IP range and the host is unreachable".to_string()
}

pub fn no_http_and_nxdomain() -> String {
    "no HTTP response was obtained and the CNAME is NXDOMAIN".to_string()
}

pub fn wildcard_suppression() -> String {
    "confidence suppressed: apex domain has wildcard DNS".to_string()
}

pub fn cannot_take_over_cap() -> String {
    "confidence capped: identified provider does not allow third-party claiming without proof of ownership"
        .to_string()
}

pub fn header_fingerprint(provider: &str) -> String {
    format!("response headers independently fingerprint provider: {provider}")
}

pub fn no_relevant_dns_signals() -> String {
    "no takeover-relevant DNS signals".to_string()
}

pub fn analysis_error(message: &str) -> String {
    const MAX_LEN: usize = 200;
    let truncated: String = message.chars().take(MAX_LEN).collect();
    format!("Analysis error: {truncated}")
}

pub fn cancelled() -> String {
    "cancelled".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_error_truncates_long_messages() {
        let long = "x".repeat(500);
        let result = analysis_error(&long);
        assert!(result.len() < 220);
        assert!(result.starts_with("Analysis error:"));
    }
}
