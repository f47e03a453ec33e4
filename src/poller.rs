use crate::{
    clock::{
        Clock,
        SystemClock,
    },
    provision::{
        ensure_bucket,
        ProvisioningError,
    },
    sample::RateSample,
    source::RateSource,
    writer::MeasurementWriter,
};
use rate_poller_store::TimeSeriesStore;
use std::time::Duration;
use strum::Display;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SchedulerState {
    Running,
    Stopping,
}

/// Counters of one poller run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub written: u64,
    pub missed: u64,
    pub failed_writes: u64,
}

/// Provisions the bucket, then polls every source once per interval until cancelled.
///
/// Owns the store session and closes it on every exit path.
pub struct Poller<S> {
    store: S,
    writer: MeasurementWriter,
    sources: Vec<Box<dyn RateSource>>,
    interval: Duration,
    clock: Box<dyn Clock>,
    summary: RunSummary,
}

impl<S: TimeSeriesStore> Poller<S> {
    pub fn new(store: S, bucket: impl Into<String>, sources: Vec<Box<dyn RateSource>>, interval: Duration) -> Self {
        Self {
            store,
            writer: MeasurementWriter::new(bucket),
            sources,
            interval,
            clock: Box::new(SystemClock),
            summary: RunSummary::default(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Poll until `cancel` fires. Cancellation is honored between cycles and while sleeping, never during a write.
    pub async fn run(self, cancel: CancellationToken) -> Result<RunSummary, ProvisioningError> {
        self.drive(cancel, false).await
    }

    /// Provision and run exactly one cycle.
    pub async fn run_once(self) -> Result<RunSummary, ProvisioningError> {
        self.drive(CancellationToken::new(), true).await
    }

    async fn drive(mut self, cancel: CancellationToken, once: bool) -> Result<RunSummary, ProvisioningError> {
        let result = self.poll_until_stopped(&cancel, once).await;
        self.store.close().await;

        match &result {
            Ok(()) => info!(
                cycles = self.summary.cycles,
                written = self.summary.written,
                missed = self.summary.missed,
                failed_writes = self.summary.failed_writes,
                "poller stopped"
            ),
            Err(err) => error!("poller aborted before the first cycle: {err}"),
        }
        result.map(|()| self.summary)
    }

    async fn poll_until_stopped(&mut self, cancel: &CancellationToken, once: bool) -> Result<(), ProvisioningError> {
        ensure_bucket(&self.store, self.writer.bucket()).await?;

        info!(
            sources = self.sources.len(),
            interval = %humantime::format_duration(self.interval),
            bucket = self.writer.bucket(),
            "polling"
        );

        let mut state = SchedulerState::Running;
        while state == SchedulerState::Running {
            if cancel.is_cancelled() {
                state = SchedulerState::Stopping;
                break;
            }

            self.run_cycle().await;

            state = if once {
                SchedulerState::Stopping
            } else {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => SchedulerState::Stopping,
                    _ = tokio::time::sleep(self.interval) => SchedulerState::Running,
                }
            };
        }

        debug!(%state, "leaving polling loop");
        Ok(())
    }

    /// Poll every source in configuration order and write what was found. Failures are logged and counted.
    async fn run_cycle(&mut self) {
        self.summary.cycles += 1;
        let cycle = self.summary.cycles;
        debug!(cycle, "starting cycle");

        for source in &self.sources {
            let value = match source.poll().await {
                Ok(value) => value,
                Err(miss) => {
                    warn!(cycle, source = source.label(), "failed to extract the rate: {miss}");
                    self.summary.missed += 1;
                    continue;
                }
            };

            let sample = match RateSample::new(source.label(), value, self.clock.now()) {
                Ok(sample) => sample,
                Err(err) => {
                    warn!(cycle, source = source.label(), "discarding sample: {err}");
                    self.summary.missed += 1;
                    continue;
                }
            };
            info!(cycle, source = source.label(), rate = value, "extracted rate");

            match self.writer.write(&self.store, &sample, source.tagged()).await {
                Ok(()) => {
                    info!(cycle, source = source.label(), rate = value, "rate written");
                    self.summary.written += 1;
                }
                Err(err) => {
                    error!(cycle, "dropping sample: {err}");
                    self.summary.failed_writes += 1;
                }
            }
        }
    }
}
