use color_eyre::Result;
use eyre::Context as _;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
};

pub fn init_errors() -> Result<()> {
    color_eyre::install()
}

/// `RUST_LOG` takes precedence over the verbosity flag.
pub fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "mortgage_rate_poller={level},rate_poller_store={level},rate_poller_config={level}"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(filter))
        .with(tracing_error::ErrorLayer::default())
        .try_init()
        .context("Failed to initialize tracing subscriber")
}
