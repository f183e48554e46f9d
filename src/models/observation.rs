use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Nested `utcdate` block of an observation. The API sends every part as a
/// zero-padded string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtcStamp {
    pub year: String,
    pub mon: String,
    pub mday: String,
    pub hour: String,
    pub min: String,
}

impl UtcStamp {
    /// `YYYYMMDD`
    pub fn date(&self) -> String {
        format!("{}{}{}", self.year, self.mon, self.mday)
    }

    /// `HH:MM`
    pub fn time(&self) -> String {
        format!("{}:{}", self.hour, self.min)
    }

    pub fn key(&self) -> ObservationKey {
        ObservationKey::new(self.date(), self.time())
    }
}

/// One sampling instant as returned by the history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub utcdate: UtcStamp,

    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl RawObservation {
    pub fn key(&self) -> ObservationKey {
        self.utcdate.key()
    }

    /// Textual value of a field. `null` counts as absent; non-string scalars
    /// are rendered with their JSON text.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Row key of the pivot table. Ordering is date then time; both are
/// zero-padded so lexical order is chronological.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObservationKey {
    pub date: String,
    pub time: String,
}

impl ObservationKey {
    pub fn new(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
        }
    }
}

impl fmt::Display for ObservationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.date, self.time)
    }
}

/// Pull the observation list out of a raw history payload.
///
/// Returns `None` when `history.observations` is missing or not an array.
/// Individual entries that do not carry a usable `utcdate` are skipped.
pub fn observations_from_payload(payload: &Value) -> Option<Vec<RawObservation>> {
    let entries = payload.get("history")?.get("observations")?.as_array()?;

    let observations = entries
        .iter()
        .filter_map(|entry| match RawObservation::deserialize(entry) {
            Ok(obs) => Some(obs),
            Err(e) => {
                tracing::debug!("Skipping malformed observation: {}", e);
                None
            }
        })
        .collect();

    Some(observations)
}
