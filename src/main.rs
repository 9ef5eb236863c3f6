use subtakeover::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse_args();

    // `--debug` must win over (or substitute for) `RUST_LOG` before the
    // subscriber is built; setting the env var afterward would be a no-op.
    let filter = if Cli::debug_requested(&args) {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let code = Cli::run(args).await?;
    std::process::exit(code);
}
