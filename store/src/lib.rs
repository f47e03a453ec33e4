#[macro_use]
extern crate tracing;

mod error;
mod influx;
mod point;

pub use error::StoreError;
use futures::future::BoxFuture;
pub use influx::InfluxStore;
pub use point::Point;
use serde::{
    Deserialize,
    Serialize,
};

/// A named storage partition ("bucket") of the time series store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub id: String,
    pub name: String,
}

/// The operations the poller needs from a time series database.
///
/// Implementations are expected to be a long-lived session: created once, shared by reference, and released through
/// [`TimeSeriesStore::close`] when the owner shuts down.
pub trait TimeSeriesStore: Send + Sync {
    /// List the buckets visible to the configured organization.
    fn list_buckets(&self) -> BoxFuture<'_, Result<Vec<Bucket>, StoreError>>;

    /// Create a bucket without custom retention rules.
    ///
    /// Returns [`StoreError::AlreadyExists`] if a bucket with that name exists.
    fn create_bucket<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Bucket, StoreError>>;

    /// Write a single point and wait for the store to acknowledge it.
    fn write_point<'a>(&'a self, bucket: &'a str, point: &'a Point) -> BoxFuture<'a, Result<(), StoreError>>;

    /// Release the session.
    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async {})
    }
}
