//! # Extractors
//!
//! Turn the body of a fetched response into a rate. Extraction never fails loudly: a response that does not
//! contain a usable number yields `None`.
//!
//! - **`HtmlPatternExtractor`**: regular expression over the text of an HTML page
//! - **`JsonPathExtractor`**: dotted path into a JSON document

mod html;
mod json;

pub use html::HtmlPatternExtractor;
pub use json::JsonPathExtractor;
use rate_poller_config::ExtractionRule;

pub trait RateExtractor: Send + Sync {
    /// Extract the rate from a response body.
    fn extract(&self, raw: &str) -> Option<f64>;
}

#[derive(thiserror::Error, Debug)]
pub enum ExtractorError {
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("pattern {0:?} has no capture group for the rate")]
    NoCaptureGroup(String),
    #[error("invalid JSON path {0:?}")]
    InvalidPath(String),
}

/// Build the extractor described by a source's rule.
pub fn extractor_for(rule: &ExtractionRule) -> Result<Box<dyn RateExtractor>, ExtractorError> {
    let extractor: Box<dyn RateExtractor> = match rule {
        ExtractionRule::HtmlPattern { pattern, strategy } => Box::new(HtmlPatternExtractor::new(pattern, *strategy)?),
        ExtractionRule::JsonApi { path, .. } => Box::new(JsonPathExtractor::new(path)?),
    };
    Ok(extractor)
}

/// Parse a rate, accepting only finite, non-negative numbers.
pub(crate) fn parse_rate(text: &str) -> Option<f64> {
    valid_rate(text.trim().parse::<f64>().ok()?)
}

pub(crate) fn valid_rate(value: f64) -> Option<f64> {
    (value.is_finite() && value >= 0.0).then_some(value)
}
