use crate::sample::RateSample;
use rate_poller_store::{
    Point,
    StoreError,
    TimeSeriesStore,
};

pub const MEASUREMENT: &str = "mortgage_rate";
pub const SOURCE_TAG: &str = "source";
pub const RATE_FIELD: &str = "rate";

#[derive(thiserror::Error, Debug)]
#[error("writing the {source_label:?} sample failed: {source}")]
pub struct WriteError {
    pub source_label: String,
    #[source]
    pub source: StoreError,
}

/// Writes samples into one bucket, one acknowledged request per sample.
#[derive(Debug, Clone)]
pub struct MeasurementWriter {
    bucket: String,
}

impl MeasurementWriter {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self { bucket: bucket.into() }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// `mortgage_rate,source=<label> rate=<value> <observed_at ns>`, without the tag for untagged sources.
    pub fn point(sample: &RateSample, tagged: bool) -> Point {
        let mut point = Point::new(MEASUREMENT);
        if tagged {
            point = point.tag(SOURCE_TAG, sample.source_label());
        }
        point.field(RATE_FIELD, sample.value()).time(sample.observed_at())
    }

    pub async fn write<S>(&self, store: &S, sample: &RateSample, tagged: bool) -> Result<(), WriteError>
    where
        S: TimeSeriesStore + ?Sized,
    {
        let point = Self::point(sample, tagged);
        store
            .write_point(&self.bucket, &point)
            .await
            .map_err(|source| WriteError {
                source_label: sample.source_label().to_string(),
                source,
            })
    }
}
