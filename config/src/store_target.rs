use serde::Deserialize;
use std::fmt;
use url::Url;

pub const DEFAULT_STORE_URL: &str = "http://localhost:8086";
pub const DEFAULT_BUCKET: &str = "mortgage_rates";

/// Where and as whom points are written.
#[derive(Clone, Deserialize)]
pub struct StoreTarget {
    pub url: Url,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub org: String,
    pub bucket: String,
}

// Avoid logging the token.
impl fmt::Debug for StoreTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreTarget")
            .field("url", &self.url.as_str())
            .field("token_len", &self.token.len())
            .field("org", &self.org)
            .field("bucket", &self.bucket)
            .finish()
    }
}

impl StoreTarget {
    pub fn new(url: Url, token: impl ToString, org: impl ToString, bucket: impl ToString) -> Self {
        Self {
            url,
            token: token.to_string(),
            org: org.to_string(),
            bucket: bucket.to_string(),
        }
    }

    /// Base URL without a trailing slash, ready for `format!("{base}/api/...")`.
    pub fn base_url(&self) -> &str {
        self.url.as_str().trim_end_matches('/')
    }
}
