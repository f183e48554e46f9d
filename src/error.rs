use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatasetError>;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unable to create output path '{0}'")]
    OutputDir(PathBuf, #[source] std::io::Error),

    #[error("Unable to open output file '{0}' for writing")]
    OutputFile(PathBuf, #[source] csv::Error),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to initialise logging: {0}")]
    Logging(String),

    #[error("Partial run: {failed} of {total} place/date pairs failed")]
    PartialRun { failed: usize, total: usize },
}

/// Startup configuration problems. Always fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable {0} not set")]
    MissingCredential(&'static str),

    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid settings: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid place '{0}': expected a non-empty identifier such as 'Norway/Oslo'")]
    InvalidPlace(String),

    #[error("Invalid time '{0}': expected zero-padded HH:MM")]
    InvalidTime(String),

    #[error("Places '{first}' and '{second}' share the column prefix '{prefix}'")]
    DuplicatePrefix {
        prefix: String,
        first: String,
        second: String,
    },

    #[error("Target place '{0}' is not one of the configured places")]
    UnknownTargetPlace(String),
}

/// Failure to fetch one (place, date) pair. The pipeline logs it and skips
/// the pair; it never aborts a run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network request failed for {0}")]
    Network(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Response body for {0} is not valid JSON")]
    Decode(String, #[source] reqwest::Error),

    #[error("Response for {place} on {date} has no observation list")]
    MissingObservations { place: String, date: String },

    #[error("No cached data for {place} on {date} (offline)")]
    OfflineMiss { place: String, date: String },

    #[error(transparent)]
    CacheWrite(#[from] CacheError),
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to create cache directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to write cache file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to serialise payload for '{0}'")]
    Serialise(PathBuf, #[source] serde_json::Error),
}
