use super::{
    parse_rate,
    valid_rate,
    ExtractorError,
    RateExtractor,
};
use serde_json::Value;

/// Reads the rate at a dotted path of a JSON document, e.g. `rates.default.samples.0.apr`.
///
/// Numeric segments index into arrays. The value may be a number or a numeric string.
#[derive(Debug, Clone)]
pub struct JsonPathExtractor {
    segments: Vec<String>,
}

impl JsonPathExtractor {
    pub fn new(path: &str) -> Result<Self, ExtractorError> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(|segment| segment.trim().is_empty()) {
            return Err(ExtractorError::InvalidPath(path.to_string()));
        }
        Ok(Self { segments })
    }

    fn lookup<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.segments.iter().try_fold(document, |value, segment| match value {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
            _ => None,
        })
    }
}

impl RateExtractor for JsonPathExtractor {
    fn extract(&self, raw: &str) -> Option<f64> {
        let document: Value = serde_json::from_str(raw).ok()?;
        match self.lookup(&document)? {
            Value::Number(number) => number.as_f64().and_then(valid_rate),
            Value::String(text) => parse_rate(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATES_PATH: &str = "rates.default.samples.0.apr";

    fn extract(raw: &str) -> Option<f64> {
        JsonPathExtractor::new(RATES_PATH).unwrap().extract(raw)
    }

    #[test]
    fn reads_the_first_sample() {
        let body = r#"{
            "rates": {
                "default": {
                    "query": {"creditScoreBucket": "VeryHigh"},
                    "samples": [
                        {"apr": 6.941, "rate": 6.875, "time": "2024-05-01T12:00:00Z"},
                        {"apr": 7.012, "rate": 6.95, "time": "2024-05-01T12:10:00Z"}
                    ]
                }
            }
        }"#;
        assert_eq!(extract(body), Some(6.941));
    }

    #[test]
    fn accepts_integers_and_numeric_strings() {
        assert_eq!(extract(r#"{"rates":{"default":{"samples":[{"apr":7}]}}}"#), Some(7.0));
        assert_eq!(extract(r#"{"rates":{"default":{"samples":[{"apr":"6.5"}]}}}"#), Some(6.5));
        assert_eq!(extract(r#"{"rates":{"default":{"samples":[{"apr":0.0}]}}}"#), Some(0.0));
    }

    #[test]
    fn missing_segments_yield_none() {
        assert_eq!(extract(r#"{"rates":{}}"#), None);
        assert_eq!(extract(r#"{"rates":{"default":{"samples":[]}}}"#), None);
        assert_eq!(extract(r#"{"rates":{"default":{"samples":{"0":{"apr":1}}}}}"#), Some(1.0));
        assert_eq!(extract(r#"{"rates":{"default":{"samples":[{"rate":6.1}]}}}"#), None);
        assert_eq!(extract(r#"{"rates":{"default":{"samples":[{"apr":null}]}}}"#), None);
        assert_eq!(extract(r#"{"rates":{"default":{"samples":[{"apr":"n/a"}]}}}"#), None);
        assert_eq!(extract(r#"[1, 2]"#), None);
    }

    #[test]
    fn malformed_json_yields_none() {
        assert_eq!(extract("<html>Service unavailable</html>"), None);
        assert_eq!(extract(r#"{"rates": "#), None);
        assert_eq!(extract(""), None);
    }

    #[test]
    fn rejects_empty_path_segments() {
        assert!(JsonPathExtractor::new("").is_err());
        assert!(JsonPathExtractor::new("rates..apr").is_err());
        assert!(JsonPathExtractor::new("rates.default").is_ok());
    }
}
