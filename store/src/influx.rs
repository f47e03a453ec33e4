use crate::{
    Bucket,
    Point,
    StoreError,
    TimeSeriesStore,
};
use futures::future::BoxFuture;
use rate_poller_config::StoreTarget;
use reqwest::{
    header::{
        HeaderMap,
        HeaderValue,
        AUTHORIZATION,
    },
    Response,
};
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Session with an InfluxDB v2 server.
///
/// Created once with [`InfluxStore::connect`], which authenticates by resolving the organization id.
#[derive(Debug, Clone)]
pub struct InfluxStore {
    http: reqwest::Client,
    base_url: String,
    org: String,
    org_id: String,
}

#[derive(Deserialize)]
struct Organizations {
    #[serde(default)]
    orgs: Vec<Organization>,
}

#[derive(Deserialize)]
struct Organization {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct Buckets {
    #[serde(default)]
    buckets: Vec<Bucket>,
}

impl InfluxStore {
    pub async fn connect(target: &StoreTarget) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        let mut token = HeaderValue::from_str(&format!("Token {}", target.token))
            .map_err(|_| StoreError::Unauthorized("token contains invalid characters".to_string()))?;
        token.set_sensitive(true);
        headers.insert(AUTHORIZATION, token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = target.base_url().to_string();
        debug!(%base_url, org = %target.org, "resolving organization");

        let response = http
            .get(format!("{base_url}/api/v2/orgs"))
            .query(&[("org", target.org.as_str())])
            .send()
            .await?;
        let orgs: Organizations = check(response).await?.json().await?;
        let org = orgs
            .orgs
            .into_iter()
            .find(|org| org.name == target.org)
            .ok_or_else(|| StoreError::UnknownOrganization(target.org.clone()))?;

        info!(%base_url, org = %org.name, org_id = %org.id, "connected to InfluxDB");

        Ok(Self {
            http,
            base_url,
            org: org.name,
            org_id: org.id,
        })
    }

    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    async fn list(&self) -> Result<Vec<Bucket>, StoreError> {
        let response = self
            .http
            .get(format!("{}/api/v2/buckets", self.base_url))
            .query(&[("orgID", self.org_id.as_str()), ("limit", "100")])
            .send()
            .await?;
        let buckets: Buckets = check(response).await?.json().await?;
        Ok(buckets.buckets)
    }

    async fn create(&self, name: &str) -> Result<Bucket, StoreError> {
        let response = self
            .http
            .post(format!("{}/api/v2/buckets", self.base_url))
            .json(&serde_json::json!({
                "orgID": self.org_id,
                "name": name,
                "retentionRules": [],
            }))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn write(&self, bucket: &str, point: &Point) -> Result<(), StoreError> {
        let line = point.to_line_protocol()?;
        trace!(%line, bucket, "writing point");
        let response = self
            .http
            .post(format!("{}/api/v2/write", self.base_url))
            .query(&[("org", self.org.as_str()), ("bucket", bucket), ("precision", "ns")])
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(line)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

impl TimeSeriesStore for InfluxStore {
    fn list_buckets(&self) -> BoxFuture<'_, Result<Vec<Bucket>, StoreError>> {
        Box::pin(self.list())
    }

    fn create_bucket<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Bucket, StoreError>> {
        Box::pin(self.create(name))
    }

    fn write_point<'a>(&'a self, bucket: &'a str, point: &'a Point) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(self.write(bucket, point))
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            debug!(base_url = %self.base_url, "closing InfluxDB session");
        })
    }
}

async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::from_response(status, &body))
}
