use crate::StoreError;
use chrono::{
    DateTime,
    Utc,
};
use std::{
    collections::BTreeMap,
    fmt::Write as _,
};

/// One timestamped record: a measurement name, tags, float fields.
///
/// Tags and fields are kept sorted by key so the encoded line is stable.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    measurement: String,
    tags: BTreeMap<String, String>,
    fields: BTreeMap<String, f64>,
    timestamp: Option<DateTime<Utc>>,
}

impl Point {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: Default::default(),
            fields: Default::default(),
            timestamp: None,
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: f64) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn time(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn fields(&self) -> &BTreeMap<String, f64> {
        &self.fields
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Encode as one line of the InfluxDB line protocol with a nanosecond timestamp.
    pub fn to_line_protocol(&self) -> Result<String, StoreError> {
        if self.measurement.is_empty() {
            return Err(StoreError::InvalidPoint("measurement name is empty".to_string()));
        }
        if self.fields.is_empty() {
            return Err(StoreError::InvalidPoint(format!(
                "point {:?} has no fields",
                self.measurement
            )));
        }

        check_single_line("measurement", &self.measurement)?;
        for (key, value) in &self.tags {
            check_single_line("tag", key)?;
            check_single_line("tag", value)?;
        }
        for key in self.fields.keys() {
            check_single_line("field", key)?;
        }

        let mut line = escape(&self.measurement, &[',', ' ']);
        for (key, value) in &self.tags {
            // Empty tag values are not representable, InfluxDB drops them as well.
            if value.is_empty() {
                continue;
            }
            let _ = write!(line, ",{}={}", escape_key(key), escape_key(value));
        }

        for (i, (key, value)) in self.fields.iter().enumerate() {
            if !value.is_finite() {
                return Err(StoreError::InvalidPoint(format!("field {key:?} is not finite: {value}")));
            }
            let separator = if i == 0 { ' ' } else { ',' };
            let _ = write!(line, "{separator}{}={value}", escape_key(key));
        }

        if let Some(timestamp) = self.timestamp {
            let nanos = timestamp
                .timestamp_nanos_opt()
                .ok_or_else(|| StoreError::InvalidPoint(format!("timestamp {timestamp} out of range")))?;
            let _ = write!(line, " {nanos}");
        }

        Ok(line)
    }
}

fn check_single_line(what: &str, s: &str) -> Result<(), StoreError> {
    if s.contains(['\n', '\r']) {
        return Err(StoreError::InvalidPoint(format!("{what} {s:?} contains a line break")));
    }
    Ok(())
}

fn escape_key(s: &str) -> String {
    escape(s, &[',', '=', ' '])
}

fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    // A trailing backslash would escape the following separator.
    if s.ends_with('\\') {
        out.push('\\');
    }
    out
}
