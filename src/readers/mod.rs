pub mod api_client;
pub mod cache_store;
pub mod observation_fetcher;

pub use api_client::{HistorySource, WundergroundClient};
pub use cache_store::{CacheInventory, CacheStore};
pub use observation_fetcher::{CacheWritePolicy, FetchOrigin, FetchOutcome, ObservationFetcher};
