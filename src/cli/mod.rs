//! Thin example-runner CLI (`spec.md` §6). Retained from the teacher as the
//! manual way to exercise the engine — not the enumeration/report CLI the
//! spec excludes (`spec.md` §1 Non-goals: no subcommands for enumeration
//! sources or report formats). Accepts already-enumerated hostnames,
//! drives [`crate::run_scan`], and prints findings plus aggregate stats.

use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::error;

use crate::{run_scan, Finding, ScanConfig, ScanStats};

#[derive(Parser, Debug)]
#[command(
    name = "subtakeover",
    about = "Multi-signal subdomain takeover detection engine",
    version
)]
pub struct Args {
    /// Hostnames to analyze. Ignored when --file is given.
    hostnames: Vec<String>,

    /// Read hostnames from a file, one per line, instead of positional args.
    #[arg(long)]
    file: Option<String>,

    /// Apex domain the hostnames belong to; enables wildcard-DNS suppression.
    #[arg(long, default_value = "")]
    apex: String,

    #[arg(long, default_value_t = 50)]
    concurrency: usize,

    #[arg(long, default_value_t = 10)]
    rate_limit: u32,

    /// Per-HTTP-request timeout, in seconds.
    #[arg(long, default_value_t = 10)]
    http_timeout: u64,

    #[arg(long)]
    debug: bool,

    /// Suppress progress lines on stderr.
    #[arg(long)]
    quiet: bool,
}

pub struct Cli;

impl Cli {
    /// Parses `std::env::args` into [`Args`]. Split out from [`Self::run`]
    /// so a caller (namely `main()`) can inspect `--debug` and build its
    /// `tracing` subscriber *before* the subscriber is initialized — a
    /// filter built after `tracing_subscriber::fmt().init()` has already
    /// run has no effect on it.
    pub fn parse_args() -> Args {
        Args::parse()
    }

    /// Whether `--debug` was passed, i.e. whether `main()` should build an
    /// `EnvFilter` that unconditionally enables `debug` level regardless of
    /// `RUST_LOG`.
    pub fn debug_requested(args: &Args) -> bool {
        args.debug
    }

    /// Runs a scan from already-parsed `args`, prints findings and stats,
    /// and returns the process exit code (`spec.md` §7): 0 clean, 2 if any
    /// `CONFIRMED`/`HIGHLY_LIKELY` Finding was produced, 1 if the scan
    /// couldn't even start, 130 if a `SIGINT` cancelled it mid-run.
    pub async fn run(args: Args) -> anyhow::Result<i32> {
        let hostnames = match Self::collect_hostnames(&args) {
            Ok(h) if !h.is_empty() => h,
            Ok(_) => {
                eprintln!("no hostnames given; pass them as arguments or via --file");
                return Ok(1);
            }
            Err(e) => {
                eprintln!("failed to read hostname file: {e}");
                return Ok(1);
            }
        };

        let config = ScanConfig::new(args.apex.clone())
            .with_concurrency(args.concurrency)
            .with_rate_limit(args.rate_limit)
            .with_http_timeout(Duration::from_secs(args.http_timeout));

        let (cancel_tx, cancel_rx) = crate::cancel_token();
        let interrupted = Arc::new(AtomicBool::new(false));
        {
            let interrupted = Arc::clone(&interrupted);
            let cancel_tx = cancel_tx.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    interrupted.store(true, Ordering::SeqCst);
                    cancel_tx.cancel();
                }
            });
        }

        let progress = if args.quiet {
            None
        } else {
            let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
            tokio::spawn(async move {
                while let Some(line) = rx.recv().await {
                    eprintln!("{line}");
                }
            });
            Some(tx)
        };

        let (findings, stats) = match run_scan(&config, hostnames, progress, cancel_rx).await {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "scan failed to start");
                return Ok(1);
            }
        };

        let mut sorted = findings;
        sorted.sort_by(|a, b| a.subdomain.cmp(&b.subdomain));
        for finding in &sorted {
            Self::print_finding(finding);
        }
        Self::print_stats(&stats);

        if interrupted.load(Ordering::SeqCst) {
            return Ok(130);
        }

        Ok(crate::exit_code_for(&stats))
    }

    fn collect_hostnames(args: &Args) -> anyhow::Result<Vec<String>> {
        if let Some(path) = &args.file {
            let contents = fs::read_to_string(path)?;
            Ok(contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect())
        } else {
            Ok(args.hostnames.clone())
        }
    }

    fn print_finding(finding: &Finding) {
        println!(
            "{:<40} {:<14} confidence={:<3} provider={}",
            finding.subdomain,
            finding.verdict.to_string(),
            finding.confidence,
            finding.provider.as_deref().unwrap_or("-"),
        );
        for line in &finding.evidence {
            println!("    - {line}");
        }
    }

    fn print_stats(stats: &ScanStats) {
        let total: usize = stats.verdict_counts.values().sum();
        println!("\n{total} hostnames analyzed in {:.2?} ({} live)", stats.total_duration, stats.live_count);
        let mut counts: Vec<_> = stats.verdict_counts.iter().collect();
        counts.sort_by_key(|(verdict, _)| (*verdict).clone());
        for (verdict, count) in counts {
            println!("  {verdict}: {count}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn debug_requested_reflects_the_flag() {
        let plain = Args::parse_from(["subtakeover", "a.example.com"]);
        assert!(!Cli::debug_requested(&plain));

        let debug = Args::parse_from(["subtakeover", "--debug", "a.example.com"]);
        assert!(Cli::debug_requested(&debug));
    }

    #[test]
    fn positional_hostnames_are_collected_directly() {
        let args = Args::parse_from(["subtakeover", "a.example.com", "b.example.com"]);
        let hosts = Cli::collect_hostnames(&args).unwrap();
        assert_eq!(hosts, vec!["a.example.com", "b.example.com"]);
    }

    #[test]
    fn file_flag_overrides_positional_and_trims_blank_lines() {
        let mut path = std::env::temp_dir();
        path.push(format!("subtakeover-cli-test-{}.txt", std::process::id()));
        std::fs::write(&path, "a.example.com\n\nb.example.com\n").unwrap();

        let args = Args::parse_from(["subtakeover", "--file", path.to_str().unwrap()]);
        let hosts = Cli::collect_hostnames(&args).unwrap();
        assert_eq!(hosts, vec!["a.example.com", "b.example.com"]);

        std::fs::remove_file(&path).ok();
    }
}
