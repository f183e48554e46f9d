use crate::models::{Place, RawObservation};
use crate::utils::dates::previous_day;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Label per calendar day (`YYYYMMDD`).
pub type TargetTable = BTreeMap<String, String>;

/// Records the reading of one field at one (place, time) as the label of the
/// *previous* day: tomorrow's value is what today's features should predict.
#[derive(Debug, Clone)]
pub struct TargetExtractor {
    place: Place,
    time: String,
    field: String,
    table: TargetTable,
}

impl TargetExtractor {
    pub fn new(place: Place, time: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            place,
            time: time.into(),
            field: field.into(),
            table: TargetTable::new(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns true when the observation produced a label.
    pub fn maybe_record_target(&mut self, place: &Place, observation: &RawObservation) -> bool {
        if *place != self.place || observation.utcdate.time() != self.time {
            return false;
        }

        let date = observation.utcdate.date();
        let Some(day_before) = previous_day(&date) else {
            warn!("Unparsable observation date '{}' for {}", date, place);
            return false;
        };

        let Some(value) = observation.text(&self.field) else {
            debug!("No '{}' in target observation {} {}", self.field, date, self.time);
            return false;
        };
        debug!(
            "Target {} = '{}' from {} {} {}",
            day_before, value, place, date, self.time
        );
        if self.table.insert(day_before.clone(), value).is_some() {
            debug!("Target for {} recorded twice, keeping the later one", day_before);
        }
        true
    }

    pub fn table(&self) -> &TargetTable {
        &self.table
    }

    pub fn into_table(self) -> TargetTable {
        self.table
    }
}
