use std::collections::HashSet;

use crate::models::RawObservation;
use crate::utils::constants::PRESSURE_FIELD_MARKER;

/// Ordered list of fields extracted from every observation. The order is
/// also the column order of each place block in the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    fields: Vec<String>,
}

impl FieldSchema {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Extract one value per schema field. The result always has
    /// `self.len()` entries: absent fields and sentinels become `""`.
    pub fn extract(&self, observation: &RawObservation, sentinels: &SentinelSet) -> Vec<String> {
        self.fields
            .iter()
            .map(|field| match observation.text(field) {
                Some(value) => sentinels.clean(field, value),
                None => String::new(),
            })
            .collect()
    }
}

/// Raw values that mean "missing".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentinelSet {
    values: HashSet<String>,
}

impl SentinelSet {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value)
    }

    /// Pressure fields pass through untouched.
    pub fn clean(&self, field: &str, value: String) -> String {
        if !is_pressure_field(field) && self.contains(&value) {
            String::new()
        } else {
            value
        }
    }
}

pub fn is_pressure_field(field: &str) -> bool {
    field.contains(PRESSURE_FIELD_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::DEFAULT_SENTINELS;
    use serde_json::json;

    fn observation(fields: serde_json::Value) -> RawObservation {
        let mut value = json!({
            "utcdate": {"year": "2024", "mon": "01", "mday": "01", "hour": "12", "min": "00"}
        });
        for (k, v) in fields.as_object().unwrap() {
            value[k] = v.clone();
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_extract_keeps_schema_length() {
        let schema = FieldSchema::new(["conds", "tempm", "hum", "wspdm"]);
        let sentinels = SentinelSet::new(DEFAULT_SENTINELS.iter().copied());
        let obs = observation(json!({"tempm": "4.0", "extra": "ignored"}));

        let values = schema.extract(&obs, &sentinels);

        assert_eq!(values.len(), schema.len());
        assert_eq!(values, vec!["", "4.0", "", ""]);
    }

    #[test]
    fn test_sentinels_replaced_except_pressure() {
        let schema = FieldSchema::new(["tempm", "pressurem", "wgustm", "pressurei"]);
        let sentinels = SentinelSet::new(DEFAULT_SENTINELS.iter().copied());
        let obs = observation(json!({
            "tempm": "-9999",
            "pressurem": "-9999",
            "wgustm": "-9999.0",
            "pressurei": "-9999.00"
        }));

        let values = schema.extract(&obs, &sentinels);

        assert_eq!(values, vec!["", "-9999", "", "-9999.00"]);
    }

    #[test]
    fn test_empty_sentinel_set_keeps_values() {
        let schema = FieldSchema::new(["tempm"]);
        let obs = observation(json!({"tempm": "-9999"}));
        assert_eq!(schema.extract(&obs, &SentinelSet::default()), vec!["-9999"]);
    }
}
