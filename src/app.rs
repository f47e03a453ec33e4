use crate::{
    poller::Poller,
    source::{
        http_client,
        HttpRateSource,
        RateSource,
    },
};
use color_eyre::Result;
use eyre::Context as _;
use rate_poller_config::{
    Args,
    Config,
};
use rate_poller_store::InfluxStore;
use std::future::Future;
use tokio_util::sync::CancellationToken;

pub struct App {
    config: Config,
    once: bool,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let once = args.once;
        let config = Config::new(args).wrap_err("Failed to load configuration")?;
        config.validate()?;
        debug!(store = ?config.store, sources = config.sources.len(), "configuration loaded");
        Ok(Self { config, once })
    }

    /// Run until interrupted (or for a single cycle with `--once`).
    pub async fn run(self) -> Result<()> {
        let cancel = CancellationToken::new();
        tokio::spawn(cancel_on_interrupt(tokio::signal::ctrl_c(), cancel.clone()));
        self.run_until(cancel).await
    }

    pub async fn run_until(self, cancel: CancellationToken) -> Result<()> {
        let http = http_client().wrap_err("Failed to build the HTTP client")?;
        let sources = self
            .config
            .enabled_sources()
            .into_iter()
            .map(|source| {
                let name = source.name.clone();
                HttpRateSource::new(source, http.clone())
                    .map(|source| Box::new(source) as Box<dyn RateSource>)
                    .wrap_err_with(|| format!("Invalid extraction rule for source {name:?}"))
            })
            .collect::<Result<Vec<_>>>()?;

        let target = &self.config.store;
        let store = InfluxStore::connect(target)
            .await
            .wrap_err_with(|| format!("Failed to connect to {}", target.base_url()))?;
        info!(url = %target.base_url(), org = %target.org, "connected to InfluxDB");

        let poller = Poller::new(store, target.bucket.clone(), sources, self.config.poll_interval());
        let summary = if self.once {
            poller.run_once().await?
        } else {
            poller.run(cancel).await?
        };
        debug!(?summary, "done");
        Ok(())
    }
}

/// Cancel once `interrupt` fires. A listener that cannot be installed leaves the token untouched.
async fn cancel_on_interrupt(interrupt: impl Future<Output = std::io::Result<()>>, cancel: CancellationToken) {
    match interrupt.await {
        Ok(()) => {
            info!("interrupt received, stopping");
            cancel.cancel();
        }
        Err(err) => error!("Failed to listen for the interrupt signal, ctrl-c will not stop the poller: {err}"),
    }
}
