//! The hijack-prone service catalog (component C1).
//!
//! This is deliberately a static data table, not branching code — adding a
//! provider is a matter of appending a [`Provider`] literal below, never
//! touching the detector. Fields map directly onto `spec.md` §3/§4.1.

use crate::providers::RiskLevel;

/// One hijackable external service. All fields are immutable catalog data;
/// nothing here is computed at runtime.
#[derive(Debug, Clone, Copy)]
pub struct Provider {
    pub name: &'static str,
    /// CNAME suffix patterns, matched as case-insensitive substrings.
    /// Order matters only in that the first provider whose pattern matches
    /// wins (`identify_by_cname`); patterns within one provider are an OR.
    pub cname_patterns: &'static [&'static str],
    /// Substrings in the response body that indicate a dangling resource
    /// (e.g. "NoSuchBucket", "There isn't a GitHub Pages site here.").
    pub body_error_markers: &'static [&'static str],
    /// Substrings that indicate the resource is live and claimed by someone
    /// else — presence of one of these argues *against* a takeover.
    pub claimed_markers: &'static [&'static str],
    /// HTTP status codes this provider's dangling-resource error page uses.
    pub expected_status: &'static [u16],
    /// (header name, required substring) pairs; empty substring means
    /// "header present" is enough. Every pair must match for the provider
    /// to be identified via `identify_by_headers`.
    pub header_fingerprint: &'static [(&'static str, &'static str)],
    pub risk: RiskLevel,
    /// Whether an attacker can actually claim this resource and serve
    /// content under the victim's name. `false` for platforms that require
    /// proof of domain ownership before routing traffic to a new tenant —
    /// these still contribute evidence but their confidence is capped
    /// (`spec.md` §4.4 Stage 8, the `can_takeover` cap row).
    pub can_takeover: bool,
}

/// The full catalog, in priority order for `identify_by_cname`'s
/// first-match-wins scan.
pub static CATALOG: &[Provider] = &[
    Provider {
        name: "aws_s3",
        cname_patterns: &["s3.amazonaws.com", "s3-website", "s3.dualstack"],
        body_error_markers: &["NoSuchBucket", "The specified bucket does not exist"],
        claimed_markers: &[],
        expected_status: &[404],
        header_fingerprint: &[("server", "AmazonS3")],
        risk: RiskLevel::Critical,
        can_takeover: true,
    },
    Provider {
        name: "github",
        cname_patterns: &["github.io", "github.map.fastly.net"],
        body_error_markers: &[
            "There isn't a GitHub Pages site here.",
            "For more information, see",
        ],
        claimed_markers: &[],
        expected_status: &[404],
        header_fingerprint: &[("server", "GitHub.com")],
        risk: RiskLevel::High,
        can_takeover: true,
    },
    Provider {
        name: "heroku",
        cname_patterns: &["herokuapp.com", "herokussl.com", "herokudns.com"],
        body_error_markers: &["No such app", "herokucdn.com/error-pages/no-such-app.html"],
        claimed_markers: &[],
        expected_status: &[404],
        header_fingerprint: &[],
        risk: RiskLevel::High,
        can_takeover: true,
    },
    Provider {
        name: "vercel",
        cname_patterns: &["vercel.app", "vercel-dns.com", "now.sh"],
        body_error_markers: &["DEPLOYMENT_NOT_FOUND", "404: NOT_FOUND"],
        claimed_markers: &["Powered by Vercel"],
        expected_status: &[404],
        header_fingerprint: &[("server", "Vercel")],
        risk: RiskLevel::Medium,
        can_takeover: true,
    },
    Provider {
        name: "shopify",
        cname_patterns: &["myshopify.com"],
        body_error_markers: &["Sorry, this shop is currently unavailable."],
        claimed_markers: &[],
        expected_status: &[404],
        header_fingerprint: &[("x-shopify-stage", "")],
        risk: RiskLevel::Medium,
        can_takeover: true,
    },
    Provider {
        name: "fastly",
        cname_patterns: &["fastly.net", "global.fastly.net"],
        body_error_markers: &["Fastly error: unknown domain"],
        claimed_markers: &[],
        expected_status: &[404, 500],
        header_fingerprint: &[("fastly-debug-digest", "")],
        risk: RiskLevel::Medium,
        can_takeover: true,
    },
    Provider {
        name: "netlify",
        cname_patterns: &["netlify.app", "netlifyglobalcdn.com"],
        body_error_markers: &["Not Found - Request ID"],
        claimed_markers: &[],
        expected_status: &[404],
        header_fingerprint: &[("server", "Netlify")],
        risk: RiskLevel::High,
        can_takeover: true,
    },
    Provider {
        name: "cloudflare_pages",
        cname_patterns: &["pages.dev"],
        body_error_markers: &["error code: 1000", "project not found"],
        claimed_markers: &[],
        expected_status: &[404, 530],
        header_fingerprint: &[],
        risk: RiskLevel::Low,
        can_takeover: false,
    },
    Provider {
        name: "cloudflare_workers",
        cname_patterns: &["workers.dev"],
        body_error_markers: &["no-site-found", "error code: 1042"],
        claimed_markers: &[],
        expected_status: &[404],
        header_fingerprint: &[],
        risk: RiskLevel::Low,
        can_takeover: false,
    },
    Provider {
        name: "azure_traffic_manager",
        cname_patterns: &["trafficmanager.net"],
        body_error_markers: &["the profile has no enabled endpoints"],
        claimed_markers: &[],
        expected_status: &[404],
        header_fingerprint: &[],
        risk: RiskLevel::Low,
        can_takeover: false,
    },
    Provider {
        name: "azure_cloud_service",
        cname_patterns: &["cloudapp.net", "azurewebsites.net"],
        body_error_markers: &["404 Web Site not found"],
        claimed_markers: &[],
        expected_status: &[404],
        header_fingerprint: &[],
        risk: RiskLevel::High,
        can_takeover: true,
    },
    Provider {
        name: "pantheon",
        cname_patterns: &["pantheonsite.io"],
        body_error_markers: &["The gods are wise, but do not know of the site which you seek."],
        claimed_markers: &[],
        expected_status: &[404],
        header_fingerprint: &[],
        risk: RiskLevel::Medium,
        can_takeover: true,
    },
    Provider {
        name: "surge",
        cname_patterns: &["surge.sh"],
        body_error_markers: &["project not found"],
        claimed_markers: &[],
        expected_status: &[404],
        header_fingerprint: &[],
        risk: RiskLevel::Medium,
        can_takeover: true,
    },
    Provider {
        name: "unbounce",
        cname_patterns: &["unbouncepages.com"],
        body_error_markers: &["The requested URL was not found on this server."],
        claimed_markers: &[],
        expected_status: &[404],
        header_fingerprint: &[],
        risk: RiskLevel::Medium,
        can_takeover: true,
    },
    Provider {
        name: "tumblr",
        cname_patterns: &["tumblr.com"],
        body_error_markers: &["Whatever you were looking for doesn't currently exist at this address"],
        claimed_markers: &[],
        expected_status: &[404],
        header_fingerprint: &[],
        risk: RiskLevel::Medium,
        can_takeover: true,
    },
    Provider {
        name: "wordpress",
        cname_patterns: &["wordpress.com"],
        body_error_markers: &["Do you want to register"],
        claimed_markers: &[],
        expected_status: &[404],
        header_fingerprint: &[],
        risk: RiskLevel::Medium,
        can_takeover: true,
    },
    Provider {
        name: "zendesk",
        cname_patterns: &["zendesk.com"],
        body_error_markers: &["Help Center Closed"],
        claimed_markers: &[],
        expected_status: &[404],
        header_fingerprint: &[],
        risk: RiskLevel::Medium,
        can_takeover: true,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_non_empty_and_names_are_unique() {
        assert!(CATALOG.len() >= 10);
        let mut names: Vec<&str> = CATALOG.iter().map(|p| p.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CATALOG.len(), "duplicate provider name in catalog");
    }

    #[test]
    fn workers_dev_cannot_take_over() {
        let cf = CATALOG.iter().find(|p| p.name == "cloudflare_workers").unwrap();
        assert!(!cf.can_takeover);
    }

    #[test]
    fn s3_is_critical_and_can_take_over() {
        let s3 = CATALOG.iter().find(|p| p.name == "aws_s3").unwrap();
        assert_eq!(s3.risk, RiskLevel::Critical);
        assert!(s3.can_takeover);
    }
}
