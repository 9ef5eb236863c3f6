//! Cloud IP range catalog, used by `classify_ip` to flag A records that sit
//! in a transient cloud pool (`spec.md` §3 `CloudRange`, §4.4 Stage 4
//! `dangling_a_record`). This is illustrative coverage, not a maintained
//! up-to-date feed — keeping cloud ranges current is explicitly out of
//! scope (`spec.md` §9 Non-goals by extension of "long-term ... storage").

use ipnet::IpNet;
use once_cell::sync::Lazy;
use std::net::IpAddr;

pub struct CloudRange {
    pub name: &'static str,
    pub cidrs: &'static [&'static str],
}

pub static CLOUD_RANGES: &[CloudRange] = &[
    CloudRange {
        name: "aws",
        cidrs: &["3.0.0.0/8", "13.32.0.0/15", "52.0.0.0/8", "54.0.0.0/8"],
    },
    CloudRange {
        name: "gcp",
        cidrs: &["34.0.0.0/9", "35.184.0.0/13"],
    },
    CloudRange {
        name: "azure",
        cidrs: &["20.0.0.0/8", "40.64.0.0/10", "52.96.0.0/12"],
    },
    CloudRange {
        name: "cloudflare",
        cidrs: &["104.16.0.0/12", "172.64.0.0/13"],
    },
    CloudRange {
        name: "fastly",
        cidrs: &["151.101.0.0/16"],
    },
    CloudRange {
        name: "digitalocean",
        cidrs: &["138.68.0.0/16", "159.65.0.0/16", "167.99.0.0/16"],
    },
];

/// Parsed (name, net) pairs, built once from the string literals above.
static PARSED_RANGES: Lazy<Vec<(&'static str, IpNet)>> = Lazy::new(|| {
    CLOUD_RANGES
        .iter()
        .flat_map(|range| {
            range
                .cidrs
                .iter()
                .map(move |cidr| (range.name, cidr.parse::<IpNet>().expect("static CIDR literal")))
        })
        .collect()
});

/// Returns the cloud name owning `ip`, if any known range contains it.
pub fn classify_ip(ip: &str) -> Option<&'static str> {
    let addr: IpAddr = ip.parse().ok()?;
    PARSED_RANGES
        .iter()
        .find(|(_, net)| net.contains(&addr))
        .map(|(name, _)| *name)
}
