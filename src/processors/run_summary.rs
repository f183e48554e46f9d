#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub place: String,
    pub date: String,
    pub reason: String,
}

/// Counters for one run. A run can succeed with a smaller dataset than
/// requested; this is where that shows.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub pairs_total: usize,
    pub cache_hits: usize,
    pub remote_fetches: usize,
    pub cache_write_failures: usize,
    pub observations_ingested: usize,
    pub overwritten_vectors: usize,
    pub targets_recorded: usize,
    pub rows_labeled: usize,
    pub rows_unlabeled: usize,
    pub rows_dropped: usize,
    pub failures: Vec<FetchFailure>,
}

impl RunSummary {
    pub fn record_failure(&mut self, place: &str, date: &str, reason: impl Into<String>) {
        self.failures.push(FetchFailure {
            place: place.to_string(),
            date: date.to_string(),
            reason: reason.into(),
        });
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn succeeded(&self) -> usize {
        self.pairs_total.saturating_sub(self.failed())
    }

    /// Share of (place, date) pairs that produced data, 1.0 for an empty run.
    pub fn completion_rate(&self) -> f64 {
        if self.pairs_total == 0 {
            1.0
        } else {
            self.succeeded() as f64 / self.pairs_total as f64
        }
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn rows_emitted(&self) -> usize {
        self.rows_labeled + self.rows_unlabeled
    }

    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Run Summary ===\n");
        summary.push_str(&format!(
            "Place/date pairs: {} ({} ok, {} failed, {:.1}% complete)\n",
            self.pairs_total,
            self.succeeded(),
            self.failed(),
            100.0 * self.completion_rate()
        ));
        summary.push_str(&format!(
            "Cache hits: {}, API calls: {}, cache write failures: {}\n",
            self.cache_hits, self.remote_fetches, self.cache_write_failures
        ));
        summary.push_str(&format!(
            "Observations ingested: {} ({} duplicates replaced)\n",
            self.observations_ingested, self.overwritten_vectors
        ));
        summary.push_str(&format!("Targets recorded: {}\n", self.targets_recorded));
        summary.push_str(&format!(
            "Rows written: {} labeled, {} unlabeled, {} incomplete dropped\n",
            self.rows_labeled, self.rows_unlabeled, self.rows_dropped
        ));

        if !self.failures.is_empty() {
            summary.push_str("\nFirst 10 failures:\n");
            for (i, failure) in self.failures.iter().take(10).enumerate() {
                summary.push_str(&format!(
                    "  {}. {} {}: {}\n",
                    i + 1,
                    failure.place,
                    failure.date,
                    failure.reason
                ));
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_rate() {
        let mut summary = RunSummary {
            pairs_total: 4,
            ..Default::default()
        };
        assert!(!summary.is_partial());
        assert_eq!(summary.completion_rate(), 1.0);

        summary.record_failure("Norway/Oslo", "20240101", "timeout");
        assert!(summary.is_partial());
        assert_eq!(summary.succeeded(), 3);
        assert_eq!(summary.completion_rate(), 0.75);
    }

    #[test]
    fn test_empty_run_is_complete() {
        assert_eq!(RunSummary::default().completion_rate(), 1.0);
    }

    #[test]
    fn test_summary_lists_failures() {
        let mut summary = RunSummary {
            pairs_total: 2,
            ..Default::default()
        };
        summary.record_failure("Norway/Oslo", "20240101", "HTTP 500");

        let text = summary.generate_summary();
        assert!(text.contains("50.0% complete"));
        assert!(text.contains("1. Norway/Oslo 20240101: HTTP 500"));
    }
}
