pub mod csv_writer;
pub mod dataset_emitter;

pub use csv_writer::CsvDatasetWriter;
pub use dataset_emitter::{DatasetEmitter, EmittedDataset};
