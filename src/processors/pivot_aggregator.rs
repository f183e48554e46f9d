use crate::models::{FieldSchema, ObservationKey, Place, RawObservation, SentinelSet};
use std::collections::btree_map;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Field vectors of every place, indexed by observation time.
///
/// Keys iterate in ascending (date, time) order. There is at most one vector
/// per (key, place); inserting again replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PivotTable {
    rows: BTreeMap<ObservationKey, HashMap<Place, Vec<String>>>,
}

impl PivotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the vector that was replaced, if any.
    pub fn insert(
        &mut self,
        key: ObservationKey,
        place: Place,
        values: Vec<String>,
    ) -> Option<Vec<String>> {
        self.rows.entry(key).or_default().insert(place, values)
    }

    pub fn get(&self, key: &ObservationKey) -> Option<&HashMap<Place, Vec<String>>> {
        self.rows.get(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ObservationKey, HashMap<Place, Vec<String>>> {
        self.rows.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ObservationKey> {
        self.rows.keys()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Builds a [`PivotTable`] from the observations of each (place, date).
pub struct PivotAggregator {
    schema: FieldSchema,
    sentinels: SentinelSet,
    table: PivotTable,
    overwritten: usize,
}

impl PivotAggregator {
    pub fn new(schema: FieldSchema, sentinels: SentinelSet) -> Self {
        Self {
            schema,
            sentinels,
            table: PivotTable::new(),
            overwritten: 0,
        }
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// Add every observation of one place. `date` is the queried day and is
    /// only used for logging; rows are keyed by each observation's own UTC
    /// stamp, which may fall on a neighbouring day.
    pub fn ingest(&mut self, place: &Place, date: &str, observations: &[RawObservation]) {
        for observation in observations {
            let key = observation.key();
            let values = self.schema.extract(observation, &self.sentinels);
            if self.table.insert(key.clone(), place.clone(), values).is_some() {
                self.overwritten += 1;
                debug!(
                    "Duplicate observation for {} at {} (queried {}), keeping the later one",
                    place, key, date
                );
            }
        }
    }

    /// Vectors replaced by a later observation with the same key and place.
    pub fn overwritten(&self) -> usize {
        self.overwritten
    }

    pub fn table(&self) -> &PivotTable {
        &self.table
    }

    pub fn into_table(self) -> PivotTable {
        self.table
    }
}
