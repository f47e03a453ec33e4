use rate_poller_store::{
    StoreError,
    TimeSeriesStore,
};

/// Outcome of a successful [`ensure_bucket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    Created,
    AlreadyExists,
}

/// The bucket neither exists nor could be created.
#[derive(thiserror::Error, Debug)]
#[error("bucket {bucket:?} could not be provisioned: {source}")]
pub struct ProvisioningError {
    pub bucket: String,
    #[source]
    pub source: StoreError,
}

/// Make sure the bucket `name` exists, creating it without retention rules if needed.
///
/// Idempotent. A create rejected because the bucket already exists (another instance won the race) counts as
/// success.
pub async fn ensure_bucket<S>(store: &S, name: &str) -> Result<Provisioned, ProvisioningError>
where
    S: TimeSeriesStore + ?Sized,
{
    let error = |source: StoreError| ProvisioningError {
        bucket: name.to_string(),
        source,
    };

    let buckets = store.list_buckets().await.map_err(error)?;
    if buckets.iter().any(|bucket| bucket.name == name) {
        info!(bucket = name, "bucket already exists");
        return Ok(Provisioned::AlreadyExists);
    }

    match store.create_bucket(name).await {
        Ok(bucket) => {
            info!(bucket = name, id = %bucket.id, "bucket created");
            Ok(Provisioned::Created)
        }
        Err(err) if err.is_already_exists() => {
            info!(bucket = name, "bucket was created concurrently, already exists");
            Ok(Provisioned::AlreadyExists)
        }
        Err(err) => Err(error(err)),
    }
}
