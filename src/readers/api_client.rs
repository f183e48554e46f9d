use crate::error::FetchError;
use crate::models::Place;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Something that can produce the raw history payload for one place and day.
#[allow(async_fn_in_trait)]
pub trait HistorySource {
    async fn fetch_history(&self, place: &Place, date: &str) -> Result<Value, FetchError>;
}

/// Client for the Wunderground history endpoint:
/// `<base>/<key>/<product>_<YYYYMMDD>/q/<place>.json`
#[derive(Debug, Clone)]
pub struct WundergroundClient {
    client: Client,
    base_url: String,
    api_key: String,
    product: String,
}

impl WundergroundClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        product: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            product: product.to_string(),
        })
    }

    pub fn url_for(&self, place: &Place, date: &str) -> String {
        format!(
            "{}/{}/{}_{}/q/{}.json",
            self.base_url,
            self.api_key,
            self.product,
            date,
            place.id()
        )
    }

    /// URL with the key masked, for logs and errors.
    fn redacted_url(&self, place: &Place, date: &str) -> String {
        format!(
            "{}/****/{}_{}/q/{}.json",
            self.base_url,
            self.product,
            date,
            place.id()
        )
    }
}

impl HistorySource for WundergroundClient {
    async fn fetch_history(&self, place: &Place, date: &str) -> Result<Value, FetchError> {
        let url = self.url_for(place, date);
        let shown = self.redacted_url(place, date);
        debug!("Requesting {}", shown);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(shown.clone(), e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("HTTP error for {}: {}", shown, status);
            return Err(FetchError::HttpStatus { url: shown, status });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Decode(shown, e.without_url()))
    }
}
