use crate::{
    clock::Clock,
    source::{
        ExtractionMiss,
        RateSource,
    },
};
use chrono::{
    DateTime,
    TimeZone,
    Utc,
};
use futures::future::BoxFuture;
use rate_poller_store::{
    Bucket,
    Point,
    StoreError,
    TimeSeriesStore,
};
use std::{
    collections::VecDeque,
    sync::{
        Arc,
        Mutex,
    },
};
use tokio::sync::Notify;
use url::Url;

/// Serve `router` on an ephemeral local port and return its base URL.
pub(crate) async fn serve(router: axum::Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}").parse().unwrap()
}

pub(crate) fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub(crate) struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Default)]
pub(crate) struct MemoryState {
    pub buckets: Vec<Bucket>,
    pub points: Vec<(String, Point)>,
    pub create_calls: usize,
    pub write_attempts: usize,
    pub closed: usize,
    /// Number of upcoming writes that fail.
    pub failing_writes: usize,
    /// Every create is refused, like a token without write permission.
    pub refuse_create: bool,
    /// Buckets are invisible to listing, like a second instance creating it in between.
    pub hide_buckets: bool,
}

/// In-memory store. Clones share their state.
#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    pub state: Arc<Mutex<MemoryState>>,
    pub write_attempted: Arc<Notify>,
}

impl MemoryStore {
    pub fn with_bucket(name: &str) -> Self {
        let store = Self::default();
        store.state.lock().unwrap().buckets.push(Bucket {
            id: "b0".to_string(),
            name: name.to_string(),
        });
        store
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap()
    }

    /// Wait until at least `count` writes were attempted.
    pub async fn wait_for_write_attempts(&self, count: usize) {
        while self.state().write_attempts < count {
            self.write_attempted.notified().await;
        }
    }
}

impl TimeSeriesStore for MemoryStore {
    fn list_buckets(&self) -> BoxFuture<'_, Result<Vec<Bucket>, StoreError>> {
        Box::pin(async move {
            let state = self.state();
            Ok(if state.hide_buckets {
                Vec::new()
            } else {
                state.buckets.clone()
            })
        })
    }

    fn create_bucket<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Bucket, StoreError>> {
        Box::pin(async move {
            let mut state = self.state();
            state.create_calls += 1;
            if state.refuse_create {
                return Err(StoreError::Unauthorized("write:buckets permission missing".to_string()));
            }
            if state.buckets.iter().any(|b| b.name == name) {
                return Err(StoreError::AlreadyExists(format!("bucket with name {name} already exists")));
            }
            let bucket = Bucket {
                id: format!("b{}", state.buckets.len()),
                name: name.to_string(),
            };
            state.buckets.push(bucket.clone());
            Ok(bucket)
        })
    }

    fn write_point<'a>(&'a self, bucket: &'a str, point: &'a Point) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let result = {
                let mut state = self.state();
                state.write_attempts += 1;
                if state.failing_writes > 0 {
                    state.failing_writes -= 1;
                    Err(StoreError::Status {
                        status: 503,
                        message: "service unavailable".to_string(),
                    })
                } else if !state.buckets.iter().any(|b| b.name == bucket) {
                    Err(StoreError::Status {
                        status: 404,
                        message: format!("bucket {bucket:?} not found"),
                    })
                } else {
                    state.points.push((bucket.to_string(), point.clone()));
                    Ok(())
                }
            };
            self.write_attempted.notify_one();
            result
        })
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.state().closed += 1;
        })
    }
}

/// Source answering from a script of outcomes, then repeating the last one.
pub(crate) struct ScriptedSource {
    label: String,
    tagged: bool,
    outcomes: Mutex<VecDeque<Option<f64>>>,
}

impl ScriptedSource {
    pub fn new(label: &str, outcomes: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self {
            label: label.to_string(),
            tagged: true,
            outcomes: Mutex::new(outcomes.into_iter().collect()),
        }
    }

    pub fn untagged(mut self) -> Self {
        self.tagged = false;
        self
    }

    pub fn boxed(self) -> Box<dyn RateSource> {
        Box::new(self)
    }
}

impl RateSource for ScriptedSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn tagged(&self) -> bool {
        self.tagged
    }

    fn poll(&self) -> BoxFuture<'_, Result<f64, ExtractionMiss>> {
        Box::pin(async move {
            let mut outcomes = self.outcomes.lock().unwrap();
            let outcome = if outcomes.len() > 1 {
                outcomes.pop_front().flatten()
            } else {
                outcomes.front().copied().flatten()
            };
            outcome.ok_or(ExtractionMiss::NoMatch)
        })
    }
}
