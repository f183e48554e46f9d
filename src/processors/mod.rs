pub mod pipeline;
pub mod pivot_aggregator;
pub mod run_summary;
pub mod target_extractor;

pub use pipeline::{DatasetPipeline, PipelineOutput};
pub use pivot_aggregator::{PivotAggregator, PivotTable};
pub use run_summary::{FetchFailure, RunSummary};
pub use target_extractor::{TargetExtractor, TargetTable};
