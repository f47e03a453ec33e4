#[macro_use]
extern crate tracing;

mod args;
mod source_config;
mod store_target;

pub use args::Args;
use color_eyre::Result;
use eyre::eyre;
use serde::Deserialize;
pub use source_config::{
    ExtractionRule,
    SourceConfig,
    SourceKind,
    TextStrategy,
};
use std::{
    collections::HashSet,
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};
pub use store_target::{
    StoreTarget,
    DEFAULT_BUCKET,
    DEFAULT_STORE_URL,
};

pub const DEFAULT_POLL_INTERVAL_HOURS: u64 = 24;

const SECONDS_PER_HOUR: u64 = 60 * 60;

const DEFAULT_SOURCES: &str = include_str!("default-sources.yaml");

/// Built-in rate sources, used when the config file does not list any.
pub fn default_sources() -> Vec<SourceConfig> {
    serde_yml::from_str(DEFAULT_SOURCES).expect("Failed to parse default sources")
}

pub fn get_config_dir() -> PathBuf {
    directories::ProjectDirs::from("video", "hyper", env!("CARGO_PKG_NAME"))
        .map(|dirs| dirs.config_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(".config"))
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub store: StoreTarget,
    pub poll_interval_hours: u64,
    /// Credential for JSON API sources that do not carry their own.
    #[serde(default)]
    pub partner_id: Option<String>,
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
}

impl Config {
    /// Layers defaults, the YAML config file and the command line / environment, in increasing priority.
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        let (file, required) = match &args.config {
            Some(path) => (path.clone(), true),
            None => (get_config_dir().join("config.yaml"), false),
        };
        Self::build(args, &file, required)
    }

    fn build(args: Args, file: &Path, required: bool) -> Result<Self, config::ConfigError> {
        debug!(?file, required, "loading configuration");
        let cfg: Self = config::Config::builder()
            .set_default("store.url", DEFAULT_STORE_URL)?
            .set_default("store.bucket", DEFAULT_BUCKET)?
            .set_default("poll_interval_hours", DEFAULT_POLL_INTERVAL_HOURS)?
            .add_source(
                config::File::from(file)
                    .format(config::FileFormat::Yaml)
                    .required(required),
            )
            .add_source(args)
            .build()?
            .try_deserialize()?;
        Ok(cfg)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_hours.saturating_mul(SECONDS_PER_HOUR))
    }

    /// The sources to poll, in configuration order.
    ///
    /// JSON API sources inherit the global partner id; the ones left without a credential are disabled.
    pub fn enabled_sources(&self) -> Vec<SourceConfig> {
        self.sources
            .iter()
            .filter_map(|source| {
                let mut source = source.clone();
                if source.kind() == SourceKind::JsonApi && source.api_credential.is_none() {
                    source.api_credential = self.partner_id.clone();
                    if source.api_credential.is_none() {
                        warn!(source = %source.name, "no partner id configured, source disabled");
                        return None;
                    }
                }
                Some(source)
            })
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.store.token.is_empty() {
            return Err(eyre!("a store token is required (INFLUXDB_TOKEN or --influx-token)"));
        }
        if self.store.org.is_empty() {
            return Err(eyre!("a store organization is required (INFLUXDB_ORG or --influx-org)"));
        }
        if self.store.bucket.is_empty() {
            return Err(eyre!("store.bucket must not be empty"));
        }
        if self.poll_interval_hours == 0 {
            return Err(eyre!("poll_interval_hours must be at least 1"));
        }
        if self.poll_interval_hours.checked_mul(SECONDS_PER_HOUR).is_none() {
            return Err(eyre!("poll_interval_hours {} is too large", self.poll_interval_hours));
        }

        let mut names = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(eyre!("every source needs a name ({} has none)", source.endpoint));
            }
            if source.name.contains(['\n', '\r']) {
                return Err(eyre!("source name {:?} must be a single line", source.name));
            }
            if !names.insert(source.name.as_str()) {
                return Err(eyre!("source name {:?} is used more than once", source.name));
            }
        }

        if self.enabled_sources().is_empty() {
            return Err(eyre!("no source is enabled"));
        }
        Ok(())
    }
}
