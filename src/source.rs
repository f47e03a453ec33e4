use crate::extract::{
    extractor_for,
    ExtractorError,
    RateExtractor,
};
use futures::future::BoxFuture;
use rate_poller_config::{
    ExtractionRule,
    SourceConfig,
};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a source produced no rate this cycle.
#[derive(thiserror::Error, Debug)]
pub enum ExtractionMiss {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("source answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("no rate found in the response")]
    NoMatch,
}

/// A rate source polled once per cycle.
pub trait RateSource: Send + Sync {
    /// Label written as the `source` tag.
    fn label(&self) -> &str;

    /// Whether points of this source carry the `source` tag.
    fn tagged(&self) -> bool;

    /// Fetch and extract the current rate. One request, no retries.
    fn poll(&self) -> BoxFuture<'_, Result<f64, ExtractionMiss>>;
}

/// HTTP client shared by all sources.
pub fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// A configured source fetched over HTTP.
pub struct HttpRateSource {
    config: SourceConfig,
    extractor: Box<dyn RateExtractor>,
    http: reqwest::Client,
}

impl std::fmt::Debug for HttpRateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRateSource").field("config", &self.config).finish()
    }
}

impl HttpRateSource {
    pub fn new(config: SourceConfig, http: reqwest::Client) -> Result<Self, ExtractorError> {
        let extractor = extractor_for(&config.rule)?;
        Ok(Self {
            config,
            extractor,
            http,
        })
    }

    async fn fetch(&self) -> Result<f64, ExtractionMiss> {
        let mut request = self.http.get(self.config.endpoint.clone());
        if let ExtractionRule::JsonApi { duration_days, .. } = &self.config.rule {
            if let Some(partner_id) = &self.config.api_credential {
                request = request.query(&[("partnerId", partner_id)]);
            }
            request = request.query(&[("durationDays", duration_days)]);
        }

        let response = request.send().await?;
        let status = response.status();
        let accepted = match self.config.rule {
            ExtractionRule::JsonApi { .. } => status == reqwest::StatusCode::OK,
            ExtractionRule::HtmlPattern { .. } => status.is_success(),
        };
        if !accepted {
            return Err(ExtractionMiss::Status(status));
        }

        let body = response.text().await?;
        trace!(source = %self.config.name, len = body.len(), "fetched response");
        self.extractor.extract(&body).ok_or(ExtractionMiss::NoMatch)
    }
}

impl RateSource for HttpRateSource {
    fn label(&self) -> &str {
        &self.config.name
    }

    fn tagged(&self) -> bool {
        self.config.tagged
    }

    fn poll(&self) -> BoxFuture<'_, Result<f64, ExtractionMiss>> {
        Box::pin(self.fetch())
    }
}
