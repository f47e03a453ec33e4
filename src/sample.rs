use chrono::{
    DateTime,
    Utc,
};

/// One observed rate. Only constructible with a label and a finite, non-negative value.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSample {
    source_label: String,
    value: f64,
    observed_at: DateTime<Utc>,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum InvalidSample {
    #[error("the source label is empty")]
    EmptyLabel,
    #[error("rate {0} is not a finite, non-negative number")]
    InvalidValue(f64),
}

impl RateSample {
    pub fn new(
        source_label: impl Into<String>,
        value: f64,
        observed_at: DateTime<Utc>,
    ) -> Result<Self, InvalidSample> {
        let source_label = source_label.into();
        if source_label.is_empty() {
            return Err(InvalidSample::EmptyLabel);
        }
        if !value.is_finite() || value < 0.0 {
            return Err(InvalidSample::InvalidValue(value));
        }
        Ok(Self {
            source_label,
            value,
            observed_at,
        })
    }

    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    /// The rate in percent, e.g. `6.75`.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}
