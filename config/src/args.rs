use clap::Parser;
use std::{
    collections::HashMap,
    path::PathBuf,
};
use url::Url;

/// Mortgage rate poller
///
/// Every option can also be set through its environment variable or the YAML config file.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a YAML config file. Defaults to `config.yaml` in the user config directory.
    #[arg(long, env = "RATE_POLLER_CONFIG")]
    pub config: Option<PathBuf>,

    /// InfluxDB base URL [default: http://localhost:8086]
    #[arg(long, env = "INFLUXDB_URL")]
    pub influx_url: Option<Url>,

    /// InfluxDB API token.
    #[arg(long, env = "INFLUXDB_TOKEN", hide_env_values = true)]
    pub influx_token: Option<String>,

    /// InfluxDB organization.
    #[arg(long, env = "INFLUXDB_ORG")]
    pub influx_org: Option<String>,

    /// Bucket receiving the points [default: mortgage_rates]
    #[arg(long, env = "INFLUXDB_BUCKET")]
    pub influx_bucket: Option<String>,

    /// Hours between two polling cycles [default: 24]
    #[arg(long, env = "POLL_INTERVAL_HOURS")]
    pub poll_interval_hours: Option<u64>,

    /// Partner id for JSON API sources. Sources without one are disabled.
    #[arg(long, env = "ZILLOW_PID", hide_env_values = true)]
    pub partner_id: Option<String>,

    /// Run a single cycle and exit instead of polling forever.
    #[arg(long)]
    pub once: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl config::Source for Args {
    fn clone_into_box(&self) -> Box<dyn config::Source + Send + Sync> {
        Box::new((*self).clone())
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        let mut cache = HashMap::<String, config::Value>::new();
        if let Some(url) = &self.influx_url {
            cache.insert("store.url".to_string(), url.to_string().into());
        }
        if let Some(token) = &self.influx_token {
            cache.insert("store.token".to_string(), token.clone().into());
        }
        if let Some(org) = &self.influx_org {
            cache.insert("store.org".to_string(), org.clone().into());
        }
        if let Some(bucket) = &self.influx_bucket {
            cache.insert("store.bucket".to_string(), bucket.clone().into());
        }
        if let Some(hours) = self.poll_interval_hours {
            cache.insert("poll_interval_hours".to_string(), hours.into());
        }
        if let Some(partner_id) = &self.partner_id {
            cache.insert("partner_id".to_string(), partner_id.clone().into());
        }
        Ok(cache)
    }
}
