pub mod observation;
pub mod place;
pub mod schema;

pub use observation::{observations_from_payload, ObservationKey, RawObservation, UtcStamp};
pub use place::Place;
pub use schema::{is_pressure_field, FieldSchema, SentinelSet};
