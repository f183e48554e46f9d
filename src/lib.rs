pub mod cli;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod settings;
pub mod utils;
pub mod writers;

pub use error::{ConfigError, DatasetError, FetchError, Result};
pub use settings::{Credentials, Layout, Settings};
