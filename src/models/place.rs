use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;
use crate::utils::constants::PLACE_SEPARATOR;

/// A configured query location such as `Norway/Oslo`.
///
/// The identifier is passed to the API verbatim and doubles as the cache
/// sub-directory. Its column prefix is the lowercase first character after
/// the separator (`Norway/Oslo` -> `o`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Place {
    id: String,
}

impl Place {
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty()
            || trimmed.starts_with(PLACE_SEPARATOR)
            || trimmed.ends_with(PLACE_SEPARATOR)
            || trimmed.split(PLACE_SEPARATOR).any(|part| part == "..")
        {
            return Err(ConfigError::InvalidPlace(id));
        }
        Ok(Self {
            id: trimmed.to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Part after the last separator, or the whole id if there is none.
    pub fn name(&self) -> &str {
        self.id
            .rsplit_once(PLACE_SEPARATOR)
            .map_or(self.id.as_str(), |(_, name)| name)
    }

    pub fn prefix(&self) -> String {
        self.name()
            .chars()
            .next()
            .map(|c| c.to_lowercase().collect())
            .unwrap_or_default()
    }

    /// Column name for a schema field, e.g. `o_tempm`.
    pub fn column(&self, field: &str) -> String {
        format!("{}_{}", self.prefix(), field)
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl TryFrom<String> for Place {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Place::new(value)
    }
}

impl From<Place> for String {
    fn from(place: Place) -> Self {
        place.id
    }
}
