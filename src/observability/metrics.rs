//! Metrics for the analytics pipeline
//!
//! Recording goes through the `metrics` facade; until `init` installs the
//! Prometheus recorder every call is a no-op, so library code and tests can
//! record freely.

use std::fmt;
use std::sync::OnceLock;

use metrics::Unit;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

use crate::error::{AnalyticsError, Result};

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Import metrics
    PostingsImported,

    // Normalize metrics
    PostingsNormalized,
    SalariesUnknown,

    // Analysis metrics
    AnalysesSucceeded,
    AnalysesFailed,
    AnalysisDuration,
    RowsStored,
    RelatedLookupFailures,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::PostingsImported => "job_insights_postings_imported_total",
            MetricName::PostingsNormalized => "job_insights_postings_normalized_total",
            MetricName::SalariesUnknown => "job_insights_salaries_unknown_total",
            MetricName::AnalysesSucceeded => "job_insights_analyses_succeeded_total",
            MetricName::AnalysesFailed => "job_insights_analyses_failed_total",
            MetricName::AnalysisDuration => "job_insights_analysis_duration_seconds",
            MetricName::RowsStored => "job_insights_rows_stored_total",
            MetricName::RelatedLookupFailures => "job_insights_related_lookup_failures_total",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            PostingsImported,
            PostingsNormalized,
            SalariesUnknown,
            AnalysesSucceeded,
            AnalysesFailed,
            AnalysisDuration,
            RowsStored,
            RelatedLookupFailures,
        ]
        .into_iter()
    }

    /// Returns (phase, description, unit)
    pub fn metadata(&self) -> (&'static str, &'static str, Option<Unit>) {
        match self {
            MetricName::PostingsImported => ("import", "Postings written to the posting tables", None),
            MetricName::PostingsNormalized => ("normalize", "Postings normalized for an analysis", None),
            MetricName::SalariesUnknown => ("normalize", "Postings whose salary could not be resolved", None),
            MetricName::AnalysesSucceeded => ("analysis", "Analyses that stored their results", None),
            MetricName::AnalysesFailed => ("analysis", "Analyses that failed", None),
            MetricName::AnalysisDuration => ("analysis", "Wall time of one analysis run", Some(Unit::Seconds)),
            MetricName::RowsStored => ("analysis", "Result rows written", None),
            MetricName::RelatedLookupFailures => {
                ("analysis", "Related posting lookups that fell back to an empty list", None)
            }
        }
    }

    pub fn is_histogram(&self) -> bool {
        self.as_str().ends_with("_seconds")
    }
}

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and describe every metric
pub fn init() -> Result<()> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| AnalyticsError::Metrics(format!("Failed to install Prometheus recorder: {}", e)))?;

    for metric in MetricName::all_metrics() {
        let (_, description, unit) = metric.metadata();
        match (metric.is_histogram(), unit) {
            (true, Some(unit)) => ::metrics::describe_histogram!(metric.as_str(), unit, description),
            (true, None) => ::metrics::describe_histogram!(metric.as_str(), description),
            (false, _) => ::metrics::describe_counter!(metric.as_str(), description),
        }
    }

    METRICS_HANDLE.set(handle).ok();
    info!("Metrics system initialized");
    Ok(())
}

/// Render the current metrics in Prometheus text format
pub fn get_metrics_handle() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

// ============================================================================
// Import Metrics
// ============================================================================

pub mod import {
    use super::MetricName;

    pub fn postings_imported(table: &str, count: usize) {
        ::metrics::counter!(MetricName::PostingsImported.as_str(), "table" => table.to_string())
            .increment(count as u64);
    }
}

// ============================================================================
// Normalize Metrics
// ============================================================================

pub mod normalize {
    use super::MetricName;

    pub fn postings_normalized(count: usize) {
        ::metrics::counter!(MetricName::PostingsNormalized.as_str()).increment(count as u64);
    }

    pub fn salaries_unknown(count: usize) {
        ::metrics::counter!(MetricName::SalariesUnknown.as_str()).increment(count as u64);
    }
}

// ============================================================================
// Analysis Metrics
// ============================================================================

pub mod analysis {
    use super::MetricName;

    pub fn succeeded(analysis: &'static str) {
        ::metrics::counter!(MetricName::AnalysesSucceeded.as_str(), "analysis" => analysis).increment(1);
    }

    pub fn failed(analysis: &'static str) {
        ::metrics::counter!(MetricName::AnalysesFailed.as_str(), "analysis" => analysis).increment(1);
    }

    pub fn duration(analysis: &'static str, secs: f64) {
        ::metrics::histogram!(MetricName::AnalysisDuration.as_str(), "analysis" => analysis).record(secs);
    }

    pub fn rows_stored(analysis: &'static str, rows: usize) {
        ::metrics::counter!(MetricName::RowsStored.as_str(), "analysis" => analysis).increment(rows as u64);
    }

    pub fn related_lookup_failed(analysis: &'static str) {
        ::metrics::counter!(MetricName::RelatedLookupFailures.as_str(), "analysis" => analysis).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_prefixed_and_unique() {
        let mut names: Vec<_> = MetricName::all_metrics().map(|m| m.as_str()).collect();
        assert!(names.iter().all(|n| n.starts_with("job_insights_")));
        names.sort();
        names.dedup();
        assert_eq!(names.len(), MetricName::all_metrics().count());
    }

    #[test]
    fn only_durations_are_histograms() {
        assert!(MetricName::AnalysisDuration.is_histogram());
        assert!(!MetricName::RowsStored.is_histogram());
        assert_eq!(MetricName::RowsStored.to_string(), "job_insights_rows_stored_total");
    }

    #[test]
    fn recording_without_recorder_is_a_noop() {
        analysis::succeeded("top_paying_jobs");
        normalize::postings_normalized(3);
        import::postings_imported("jobs_complete", 2);
    }
}
