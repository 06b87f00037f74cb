use std::process;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use superlog::{LOG_LEVEL_ENV, Listener, ListenerConfig, diagnostic_filter};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing with RUST_LOG or SUPERLOG_LOG support.
fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = std::env::var(LOG_LEVEL_ENV).ok();
        EnvFilter::new(diagnostic_filter(level.as_deref()))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn main() {
    init_tracing();

    let config = ListenerConfig::from_args(std::env::args().skip(1));
    tracing::info!(dev = config.dev, "superlog {VERSION}");

    if let Err(e) = run(&config) {
        tracing::error!("Listener stopped: {e:#}");
        process::exit(1);
    }
}

fn run(config: &ListenerConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    runtime.block_on(async {
        let mut listener = Listener::new(config);
        let Err(e) = listener
            .run(tokio::io::stdin(), tokio::io::stdout(), tokio::io::stderr())
            .await;
        Err(e).context("event loop terminated")
    })
}
