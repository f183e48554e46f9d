use crate::models::{FieldSchema, Place};
use crate::processors::pivot_aggregator::PivotTable;
use crate::processors::target_extractor::TargetTable;
use crate::utils::constants::{DATETIME_COLUMN, LONG_LAYOUT_KEY_COLUMNS, TARGET_COLUMN_PREFIX};
use tracing::debug;

/// Rows ready to be written, split by whether a label was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmittedDataset {
    pub header: Vec<String>,
    /// Rows with a label, or every row when no labels were requested
    pub labeled: Vec<Vec<String>>,
    /// Rows still waiting for tomorrow's reading; trailing label is empty
    pub unlabeled: Vec<Vec<String>>,
    /// Keys missing at least one configured place
    pub dropped: usize,
}

/// Turns a [`PivotTable`] into flat CSV rows.
///
/// Wide layout: `[date-time] + place blocks in configured order + [label]`.
/// Only keys holding a vector for every configured place are emitted.
pub struct DatasetEmitter {
    places: Vec<Place>,
    schema: FieldSchema,
    target_field: Option<String>,
}

impl DatasetEmitter {
    pub fn new(places: Vec<Place>, schema: FieldSchema) -> Self {
        Self {
            places,
            schema,
            target_field: None,
        }
    }

    /// Add a trailing `target_<field>` column.
    pub fn with_target_field(mut self, field: impl Into<String>) -> Self {
        self.target_field = Some(field.into());
        self
    }

    pub fn header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(1 + self.places.len() * self.schema.len() + 1);
        header.push(DATETIME_COLUMN.to_string());
        for place in &self.places {
            header.extend(self.schema.fields().iter().map(|field| place.column(field)));
        }
        if let Some(field) = &self.target_field {
            header.push(format!("{}_{}", TARGET_COLUMN_PREFIX, field));
        }
        header
    }

    /// Walk the table in key order. With a target field configured, rows
    /// whose date has no entry in `targets` go to `unlabeled`; a missing
    /// table counts as empty.
    pub fn emit(&self, pivot: &PivotTable, targets: Option<&TargetTable>) -> EmittedDataset {
        let mut dataset = EmittedDataset {
            header: self.header(),
            ..Default::default()
        };

        for (key, by_place) in pivot.iter() {
            let complete = by_place.len() == self.places.len()
                && self.places.iter().all(|place| by_place.contains_key(place));
            if !complete {
                debug!(
                    "Incomplete row {}: {} of {} places, dropping it",
                    key,
                    by_place.len(),
                    self.places.len()
                );
                dataset.dropped += 1;
                continue;
            }

            let mut row = Vec::with_capacity(dataset.header.len());
            row.push(key.to_string());
            for place in &self.places {
                row.extend(by_place[place].iter().cloned());
            }

            if self.target_field.is_none() {
                dataset.labeled.push(row);
                continue;
            }

            match targets.and_then(|t| t.get(&key.date)) {
                Some(label) => {
                    row.push(label.clone());
                    dataset.labeled.push(row);
                }
                None => {
                    row.push(String::new());
                    dataset.unlabeled.push(row);
                }
            }
        }

        dataset
    }

    pub fn long_header(&self) -> Vec<String> {
        LONG_LAYOUT_KEY_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.schema.fields().iter().cloned())
            .collect()
    }

    /// One row per (place, observation): `[place, date, utctime] + fields`.
    /// Incomplete keys are kept; nothing is joined across places.
    pub fn emit_long(&self, pivot: &PivotTable) -> EmittedDataset {
        let mut dataset = EmittedDataset {
            header: self.long_header(),
            ..Default::default()
        };

        for (key, by_place) in pivot.iter() {
            for place in &self.places {
                if let Some(values) = by_place.get(place) {
                    let mut row = vec![place.id().to_string(), key.date.clone(), key.time.clone()];
                    row.extend(values.iter().cloned());
                    dataset.labeled.push(row);
                }
            }
        }

        dataset
    }
}
