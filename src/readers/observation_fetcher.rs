use crate::error::FetchError;
use crate::models::{observations_from_payload, Place, RawObservation};
use crate::readers::api_client::HistorySource;
use crate::readers::cache_store::CacheStore;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// What to do with freshly fetched data when the cache write fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CacheWritePolicy {
    /// Use the observations for this run anyway
    #[default]
    KeepFetched,
    /// Treat the pair as failed
    SkipPair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    Cache,
    Remote,
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub observations: Vec<RawObservation>,
    pub origin: FetchOrigin,
    /// False only when a remote payload could not be written to the cache
    pub cache_written: bool,
}

/// Cache-first access to the observations of one place and day.
pub struct ObservationFetcher<S> {
    cache: CacheStore,
    source: Option<S>,
    rate_limit: Option<Duration>,
    cache_write_policy: CacheWritePolicy,
}

impl<S: HistorySource> ObservationFetcher<S> {
    pub fn new(cache: CacheStore, source: S) -> Self {
        Self {
            cache,
            source: Some(source),
            rate_limit: None,
            cache_write_policy: CacheWritePolicy::default(),
        }
    }

    /// Cache only. Every miss is reported as [`FetchError::OfflineMiss`].
    pub fn offline(cache: CacheStore) -> Self {
        Self {
            cache,
            source: None,
            rate_limit: None,
            cache_write_policy: CacheWritePolicy::default(),
        }
    }

    /// Pause after every remote call. A zero delay disables the pause.
    pub fn with_rate_limit(mut self, delay: Duration) -> Self {
        self.rate_limit = (!delay.is_zero()).then_some(delay);
        self
    }

    pub fn with_cache_write_policy(mut self, policy: CacheWritePolicy) -> Self {
        self.cache_write_policy = policy;
        self
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn is_offline(&self) -> bool {
        self.source.is_none()
    }

    pub async fn fetch(&self, place: &Place, date: &str) -> Result<FetchOutcome, FetchError> {
        if let Some(payload) = self.cache.get(place, date) {
            match observations_from_payload(&payload) {
                Some(observations) => {
                    return Ok(FetchOutcome {
                        observations,
                        origin: FetchOrigin::Cache,
                        cache_written: true,
                    })
                }
                None => warn!(
                    "Cached payload for {} date {} has no observation list, refetching",
                    place, date
                ),
            }
        }

        let Some(source) = &self.source else {
            return Err(FetchError::OfflineMiss {
                place: place.to_string(),
                date: date.to_string(),
            });
        };

        info!("Querying API for {} date {}", place, date);
        let result = source.fetch_history(place, date).await;

        // The quota counts calls, failed or not
        if let Some(delay) = self.rate_limit {
            debug!("Rate limit: sleeping {:?}", delay);
            tokio::time::sleep(delay).await;
        }

        let payload = result?;
        let observations =
            observations_from_payload(&payload).ok_or_else(|| FetchError::MissingObservations {
                place: place.to_string(),
                date: date.to_string(),
            })?;

        let cache_written = match self.cache.put(place, date, &payload) {
            Ok(_) => true,
            Err(e) => match self.cache_write_policy {
                CacheWritePolicy::KeepFetched => {
                    warn!("{}; keeping fetched data for this run", e);
                    false
                }
                CacheWritePolicy::SkipPair => return Err(e.into()),
            },
        };

        Ok(FetchOutcome {
            observations,
            origin: FetchOrigin::Remote,
            cache_written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    struct StubSource {
        payload: Option<Value>,
        calls: Cell<usize>,
    }

    impl StubSource {
        fn returning(payload: Value) -> Self {
            Self {
                payload: Some(payload),
                calls: Cell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                payload: None,
                calls: Cell::new(0),
            }
        }
    }

    impl HistorySource for &StubSource {
        async fn fetch_history(&self, place: &Place, date: &str) -> Result<Value, FetchError> {
            self.calls.set(self.calls.get() + 1);
            self.payload
                .clone()
                .ok_or_else(|| FetchError::MissingObservations {
                    place: place.to_string(),
                    date: date.to_string(),
                })
        }
    }

    fn payload(temp: &str) -> Value {
        json!({
            "history": {
                "observations": [{
                    "utcdate": {"year": "2024", "mon": "01", "mday": "01", "hour": "12", "min": "00"},
                    "tempm": temp
                }]
            }
        })
    }

    fn oslo() -> Place {
        Place::new("Norway/Oslo").unwrap()
    }

    #[tokio::test]
    async fn test_miss_fetches_and_caches() {
        let dir = TempDir::new().unwrap();
        let source = StubSource::returning(payload("5"));
        let fetcher = ObservationFetcher::new(CacheStore::new(dir.path()), &source);

        let outcome = fetcher.fetch(&oslo(), "20240101").await.unwrap();

        assert_eq!(outcome.origin, FetchOrigin::Remote);
        assert!(outcome.cache_written);
        assert_eq!(outcome.observations.len(), 1);
        assert_eq!(source.calls.get(), 1);
        assert!(fetcher.cache().path_for(&oslo(), "20240101").exists());
    }

    #[tokio::test]
    async fn test_warm_cache_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let source = StubSource::returning(payload("5"));
        let fetcher = ObservationFetcher::new(CacheStore::new(dir.path()), &source);

        let first = fetcher.fetch(&oslo(), "20240101").await.unwrap();
        let second = fetcher.fetch(&oslo(), "20240101").await.unwrap();
        let third = fetcher.fetch(&oslo(), "20240101").await.unwrap();

        assert_eq!(source.calls.get(), 1);
        assert_eq!(second.origin, FetchOrigin::Cache);
        assert_eq!(first.observations, second.observations);
        assert_eq!(second.observations, third.observations);
    }

    #[tokio::test]
    async fn test_corrupt_cache_falls_back_to_remote() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path());
        let path = store.path_for(&oslo(), "20240101");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let source = StubSource::returning(payload("5"));
        let fetcher = ObservationFetcher::new(store, &source);
        let outcome = fetcher.fetch(&oslo(), "20240101").await.unwrap();

        assert_eq!(outcome.origin, FetchOrigin::Remote);
        assert_eq!(source.calls.get(), 1);
        // Repaired on disk
        let cached: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(cached, payload("5"));
    }

    #[tokio::test]
    async fn test_payload_without_observations_fails_and_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let source = StubSource::returning(json!({"response": {"error": {"type": "keynotfound"}}}));
        let fetcher = ObservationFetcher::new(CacheStore::new(dir.path()), &source);

        let err = fetcher.fetch(&oslo(), "20240101").await.unwrap_err();

        assert!(matches!(err, FetchError::MissingObservations { .. }));
        assert!(!fetcher.cache().path_for(&oslo(), "20240101").exists());
    }

    #[tokio::test]
    async fn test_remote_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let source = StubSource::failing();
        let fetcher = ObservationFetcher::new(CacheStore::new(dir.path()), &source);

        assert!(fetcher.fetch(&oslo(), "20240101").await.is_err());
        assert_eq!(source.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_offline_miss() {
        let dir = TempDir::new().unwrap();
        let fetcher: ObservationFetcher<&StubSource> =
            ObservationFetcher::offline(CacheStore::new(dir.path()));

        let err = fetcher.fetch(&oslo(), "20240101").await.unwrap_err();
        assert!(matches!(err, FetchError::OfflineMiss { .. }));
        assert!(fetcher.is_offline());
    }

    fn blocked_cache(dir: &TempDir) -> CacheStore {
        // A file where the place directory should be makes every put fail
        fs::create_dir_all(dir.path().join("Norway")).unwrap();
        fs::write(dir.path().join("Norway").join("Oslo"), "blocked").unwrap();
        CacheStore::new(dir.path())
    }

    #[tokio::test]
    async fn test_cache_write_failure_keeps_fetched_data() {
        let dir = TempDir::new().unwrap();
        let source = StubSource::returning(payload("5"));
        let fetcher = ObservationFetcher::new(blocked_cache(&dir), &source)
            .with_cache_write_policy(CacheWritePolicy::KeepFetched);

        let outcome = fetcher.fetch(&oslo(), "20240101").await.unwrap();

        assert!(!outcome.cache_written);
        assert_eq!(outcome.observations.len(), 1);
    }

    #[tokio::test]
    async fn test_cache_write_failure_skips_pair() {
        let dir = TempDir::new().unwrap();
        let source = StubSource::returning(payload("5"));
        let fetcher = ObservationFetcher::new(blocked_cache(&dir), &source)
            .with_cache_write_policy(CacheWritePolicy::SkipPair);

        let err = fetcher.fetch(&oslo(), "20240101").await.unwrap_err();
        assert!(matches!(err, FetchError::CacheWrite(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_only_after_remote_calls() {
        let dir = TempDir::new().unwrap();
        let source = StubSource::returning(payload("5"));
        let fetcher = ObservationFetcher::new(CacheStore::new(dir.path()), &source)
            .with_rate_limit(Duration::from_secs(7));

        let start = tokio::time::Instant::now();
        fetcher.fetch(&oslo(), "20240101").await.unwrap();
        fetcher.fetch(&oslo(), "20240102").await.unwrap();
        let after_remote = start.elapsed();
        fetcher.fetch(&oslo(), "20240101").await.unwrap();

        assert_eq!(source.calls.get(), 2);
        assert!(after_remote >= Duration::from_secs(14));
        assert_eq!(start.elapsed(), after_remote);
    }
}
