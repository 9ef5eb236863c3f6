//! Verdict classification (`spec.md` §3 `Finding.verdict`, §4.4 Stage 9) and
//! the verification-step templates Stage 10 emits for non-safe verdicts.

use serde::{Deserialize, Serialize};

use crate::providers::RiskLevel;

/// The six-level verdict lattice plus the terminal `Error` state reached
/// when a detector pipeline aborts (`spec.md` §4.4 state machine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Confirmed,
    HighlyLikely,
    Likely,
    Possible,
    Unlikely,
    Safe,
    Error,
}

impl Verdict {
    /// Stage 9's threshold table. `provider_known` distinguishes the
    /// `Unlikely` row (`> 0 and provider known`) from plain `Safe`.
    pub fn threshold_bucket(confidence: u8, provider_known: bool) -> Verdict {
        match confidence {
            80..=100 => Verdict::Confirmed,
            60..=79 => Verdict::HighlyLikely,
            40..=59 => Verdict::Likely,
            20..=39 => Verdict::Possible,
            1..=19 if provider_known => Verdict::Unlikely,
            _ => Verdict::Safe,
        }
    }

    /// Risk level corresponding to this verdict (§4.4 Stage 9 table).
    /// `Error` has no defined risk row; callers display it separately.
    pub fn risk_level(self) -> RiskLevel {
        match self {
            Verdict::Confirmed => RiskLevel::Critical,
            Verdict::HighlyLikely => RiskLevel::High,
            Verdict::Likely => RiskLevel::Medium,
            Verdict::Possible => RiskLevel::Low,
            Verdict::Unlikely | Verdict::Safe | Verdict::Error => RiskLevel::Info,
        }
    }

    pub fn is_actionable(self) -> bool {
        matches!(self, Verdict::Confirmed | Verdict::HighlyLikely | Verdict::Likely)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Verdict::Confirmed => "CONFIRMED",
            Verdict::HighlyLikely => "HIGHLY_LIKELY",
            Verdict::Likely => "LIKELY",
            Verdict::Possible => "POSSIBLE",
            Verdict::Unlikely => "UNLIKELY",
            Verdict::Safe => "SAFE",
            Verdict::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Stage 10: ordered human instructions for reproducing/confirming the
/// takeover, specific to whether the finding is NS-delegation-based or a
/// dangling CNAME target.
pub fn verification_steps(ns_takeover: bool, provider_name: Option<&str>, cname_target: Option<&str>) -> Vec<String> {
    if ns_takeover {
        return vec![
            "Confirm the delegated nameserver's domain is unregistered at its registrar.".to_string(),
            "Register the dead nameserver's domain under your control.".to_string(),
            "Stand up authoritative DNS for that domain and add a zone for the victim hostname.".to_string(),
            "Verify resolution of the victim hostname now serves attacker-controlled records.".to_string(),
        ];
    }

    let target = cname_target.unwrap_or("the CNAME target");
    match provider_name {
        Some("aws_s3") => vec![
            format!("Create an S3 bucket named exactly `{target}` in the AWS console."),
            "Enable static website hosting on the bucket.".to_string(),
            "Confirm the hostname now serves the bucket's contents.".to_string(),
        ],
        Some("github") => vec![
            format!("Create a GitHub repository/Pages site matching `{target}`."),
            "Add a CNAME file with the victim hostname to the Pages branch.".to_string(),
            "Confirm the hostname now serves the new Pages site.".to_string(),
        ],
        Some(provider) => vec![
            format!("Create a resource on {provider} matching the dangling target `{target}`."),
            "Point the new resource at the same name the victim CNAME already targets.".to_string(),
            "Confirm the hostname now resolves to attacker-controlled content.".to_string(),
        ],
        None => vec![
            format!("Create a resource matching the dangling target `{target}` at the identified provider."),
            "Confirm the hostname now resolves to attacker-controlled content.".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_buckets_match_spec_table() {
        assert_eq!(Verdict::threshold_bucket(80, true), Verdict::Confirmed);
        assert_eq!(Verdict::threshold_bucket(60, true), Verdict::HighlyLikely);
        assert_eq!(Verdict::threshold_bucket(40, true), Verdict::Likely);
        assert_eq!(Verdict::threshold_bucket(20, true), Verdict::Possible);
        assert_eq!(Verdict::threshold_bucket(5, true), Verdict::Unlikely);
        assert_eq!(Verdict::threshold_bucket(0, true), Verdict::Safe);
        assert_eq!(Verdict::threshold_bucket(5, false), Verdict::Safe);
    }

    #[test]
    fn ns_takeover_steps_mention_registering_the_domain() {
        let steps = verification_steps(true, None, None);
        assert!(steps.iter().any(|s| s.contains("Register")));
    }

    #[test]
    fn s3_steps_name_the_console_resource() {
        let steps = verification_steps(false, Some("aws_s3"), Some("missing.s3.amazonaws.com"));
        assert!(steps[0].contains("S3 bucket"));
    }
}
