use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::Validate;

use crate::error::ConfigError;
use crate::models::{FieldSchema, Place, SentinelSet};
use crate::processors::TargetExtractor;
use crate::readers::CacheWritePolicy;
use crate::utils::constants::*;
use crate::utils::dates::is_valid_hhmm;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// One row per date-time, all places side by side
    #[default]
    Wide,
    /// One row per place and observation
    Long,
}

/// Which observation becomes the label of the previous day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TargetSettings {
    pub enabled: bool,

    #[validate(length(min = 1))]
    pub place: String,

    pub time: String,

    #[validate(length(min = 1))]
    pub field: String,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            place: DEFAULT_TARGET_PLACE.to_string(),
            time: DEFAULT_TARGET_TIME.to_string(),
            field: DEFAULT_TARGET_FIELD.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Settings {
    #[validate(url)]
    pub api_base_url: String,

    #[validate(length(min = 1))]
    pub api_product: String,

    #[validate(length(min = 1))]
    pub places: Vec<String>,

    #[validate(range(min = 1, max = 3650))]
    pub days: u32,

    pub output_dir: PathBuf,

    #[validate(length(min = 1))]
    pub dataset_file: String,

    #[validate(length(min = 1))]
    pub unlabeled_file: String,

    #[validate(length(min = 1))]
    pub fields: Vec<String>,

    pub sentinels: Vec<String>,

    /// Pause after each API call; 0 disables
    pub rate_limit_secs: u64,

    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,

    pub cache_write_policy: CacheWritePolicy,

    pub layout: Layout,

    pub log_file: PathBuf,

    #[validate(nested)]
    pub target: TargetSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_product: DEFAULT_API_PRODUCT.to_string(),
            places: DEFAULT_PLACES.iter().map(|p| p.to_string()).collect(),
            days: DEFAULT_DAYS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            dataset_file: DEFAULT_DATASET_FILE.to_string(),
            unlabeled_file: DEFAULT_UNLABELED_FILE.to_string(),
            fields: DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
            sentinels: DEFAULT_SENTINELS.iter().map(|s| s.to_string()).collect(),
            rate_limit_secs: DEFAULT_RATE_LIMIT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cache_write_policy: CacheWritePolicy::default(),
            layout: Layout::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            target: TargetSettings::default(),
        }
    }
}

impl Settings {
    /// Defaults, then the optional file, then `WXDATA_*` variables
    /// (`WXDATA_TARGET__TIME=11:00`, `WXDATA_PLACES=Norway/Oslo,Norway/Bergen`).
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(SETTINGS_ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("places")
                .with_list_parse_key("fields")
                .with_list_parse_key("sentinels"),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Field rules plus the cross-field checks validator cannot express.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()?;

        let places = self.places()?;
        let mut seen: HashMap<String, &Place> = HashMap::new();
        for place in &places {
            if let Some(first) = seen.insert(place.prefix(), place) {
                return Err(ConfigError::DuplicatePrefix {
                    prefix: place.prefix(),
                    first: first.to_string(),
                    second: place.to_string(),
                });
            }
        }

        if self.target.enabled {
            if !is_valid_hhmm(&self.target.time) {
                return Err(ConfigError::InvalidTime(self.target.time.clone()));
            }
            let target = Place::new(self.target.place.clone())?;
            if !places.contains(&target) {
                return Err(ConfigError::UnknownTargetPlace(self.target.place.clone()));
            }
        }

        Ok(())
    }

    pub fn places(&self) -> Result<Vec<Place>, ConfigError> {
        self.places.iter().map(|p| Place::new(p.clone())).collect()
    }

    pub fn schema(&self) -> FieldSchema {
        FieldSchema::new(self.fields.iter().cloned())
    }

    pub fn sentinel_set(&self) -> SentinelSet {
        SentinelSet::new(self.sentinels.iter().cloned())
    }

    pub fn target_extractor(&self) -> Result<Option<TargetExtractor>, ConfigError> {
        if !self.target.enabled {
            return Ok(None);
        }
        Ok(Some(TargetExtractor::new(
            Place::new(self.target.place.clone())?,
            self.target.time.clone(),
            self.target.field.clone(),
        )))
    }

    pub fn rate_limit(&self) -> Duration {
        Duration::from_secs(self.rate_limit_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.output_dir.join(&self.dataset_file)
    }

    pub fn unlabeled_path(&self) -> PathBuf {
        self.output_dir.join(&self.unlabeled_file)
    }

    pub fn log_config(&self) {
        tracing::debug!("Settings loaded:");
        tracing::debug!("  api_base_url   : {}", self.api_base_url);
        tracing::debug!("  places         : {}", self.places.join(", "));
        tracing::debug!("  days           : {}", self.days);
        tracing::debug!("  output_dir     : {}", self.output_dir.display());
        tracing::debug!("  fields         : {}", self.fields.len());
        tracing::debug!("  rate_limit_secs: {}", self.rate_limit_secs);
        tracing::debug!("  layout         : {:?}", self.layout);
        if self.target.enabled {
            tracing::debug!(
                "  target         : {} at {} UTC ({})",
                self.target.place,
                self.target.time,
                self.target.field
            );
        } else {
            tracing::debug!("  target         : disabled");
        }
    }
}

/// API key, kept out of [`Settings`] so it is never logged or written to a
/// config file.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_var(API_KEY_ENV)
    }

    /// Read the key from `name`. Unset and blank are both missing.
    pub fn from_var(name: &'static str) -> Result<Self, ConfigError> {
        match std::env::var(name) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key.trim())),
            _ => Err(ConfigError::MissingCredential(name)),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"****")
            .finish()
    }
}
