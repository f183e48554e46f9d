use crate::models::{FieldSchema, Place, SentinelSet};
use crate::processors::pivot_aggregator::{PivotAggregator, PivotTable};
use crate::processors::run_summary::RunSummary;
use crate::processors::target_extractor::{TargetExtractor, TargetTable};
use crate::readers::api_client::HistorySource;
use crate::readers::observation_fetcher::{FetchOrigin, ObservationFetcher};
use crate::utils::progress::ProgressReporter;
use tracing::{error, info};

/// Everything the emitter needs, plus the counters of the fetch phase.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub pivot: PivotTable,
    pub targets: Option<TargetTable>,
    pub summary: RunSummary,
}

/// Drives the fetcher over every (place, date) pair, one at a time, and
/// feeds the results into the aggregator and the optional target extractor.
pub struct DatasetPipeline {
    places: Vec<Place>,
    aggregator: PivotAggregator,
    target: Option<TargetExtractor>,
}

impl DatasetPipeline {
    pub fn new(places: Vec<Place>, schema: FieldSchema, sentinels: SentinelSet) -> Self {
        Self {
            places,
            aggregator: PivotAggregator::new(schema, sentinels),
            target: None,
        }
    }

    pub fn with_target(mut self, target: TargetExtractor) -> Self {
        self.target = Some(target);
        self
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    /// Places in the outer loop, dates in the inner loop. A failed pair is
    /// logged, recorded in the summary and skipped.
    pub async fn run<S: HistorySource>(
        mut self,
        fetcher: &ObservationFetcher<S>,
        dates: &[String],
        progress: &ProgressReporter,
    ) -> PipelineOutput {
        let mut summary = RunSummary {
            pairs_total: self.places.len() * dates.len(),
            ..Default::default()
        };

        for place in &self.places {
            for date in dates {
                progress.set_message(&format!("{} {}", place, date));
                info!("Processing {} date {}", place, date);

                match fetcher.fetch(place, date).await {
                    Ok(outcome) => {
                        match outcome.origin {
                            FetchOrigin::Cache => summary.cache_hits += 1,
                            FetchOrigin::Remote => summary.remote_fetches += 1,
                        }
                        if !outcome.cache_written {
                            summary.cache_write_failures += 1;
                        }

                        summary.observations_ingested += outcome.observations.len();
                        self.aggregator.ingest(place, date, &outcome.observations);
                        if let Some(target) = self.target.as_mut() {
                            for observation in &outcome.observations {
                                target.maybe_record_target(place, observation);
                            }
                        }
                    }
                    Err(e) => {
                        error!("Unable to get data for {} date {}, skipping it: {}", place, date, e);
                        summary.record_failure(place.id(), date, e.to_string());
                    }
                }

                progress.increment(1);
            }
        }

        summary.overwritten_vectors = self.aggregator.overwritten();
        let targets = self.target.map(TargetExtractor::into_table);
        // Distinct labelled dates; a re-recorded label counts once
        summary.targets_recorded = targets.as_ref().map_or(0, |t| t.len());

        PipelineOutput {
            pivot: self.aggregator.into_table(),
            targets,
            summary,
        }
    }
}
