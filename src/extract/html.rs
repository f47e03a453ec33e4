use super::{
    parse_rate,
    ExtractorError,
    RateExtractor,
};
use rate_poller_config::TextStrategy;
use regex::Regex;
use scraper::Html;

/// Finds the rate in the text of an HTML page.
///
/// The first capture group of the first match is the rate, so an anchor phrase can sit on either side of the
/// number: `as low as (\d+(?:\.\d+)?)%` or `(\d+(?:\.\d+)?)% APR`.
#[derive(Debug, Clone)]
pub struct HtmlPatternExtractor {
    pattern: Regex,
    strategy: TextStrategy,
}

impl HtmlPatternExtractor {
    pub fn new(pattern: &str, strategy: TextStrategy) -> Result<Self, ExtractorError> {
        let pattern = Regex::new(pattern)?;
        if pattern.captures_len() < 2 {
            return Err(ExtractorError::NoCaptureGroup(pattern.as_str().to_string()));
        }
        Ok(Self { pattern, strategy })
    }

    fn capture(&self, text: &str) -> Option<f64> {
        let captures = self.pattern.captures(text)?;
        parse_rate(captures.get(1)?.as_str())
    }
}

impl RateExtractor for HtmlPatternExtractor {
    fn extract(&self, raw: &str) -> Option<f64> {
        let document = Html::parse_document(raw);
        let mut text_nodes = document.root_element().text();
        match self.strategy {
            TextStrategy::FullText => self.capture(&text_nodes.collect::<String>()),
            TextStrategy::TextNodes => text_nodes.find_map(|node| self.capture(node)),
        }
    }
}
