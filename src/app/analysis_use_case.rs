use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, instrument, warn};

use crate::app::ports::{PostingSourcePort, RelatedPostingsPort, ResultSinkPort};
use crate::constants::MAX_RELATED_POSTINGS;
use crate::domain::RankedResult;
use crate::error::{AnalyticsError, Result};
use crate::observability::metrics;
use crate::pipeline::analyses::{Analysis, AnalysisContext, AnalysisRegistry};
use crate::pipeline::processing::normalize::{DefaultNormalizer, Normalizer};

/// Result of one successful analysis run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutcome {
    pub name: &'static str,
    pub stored: usize,
}

/// Per-analysis line of a full run: stored row count or failure message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    pub name: &'static str,
    pub result: std::result::Result<usize, String>,
}

impl AnalysisReport {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Use case for running analyses: fetch, normalize, compute, attach related
/// postings, then atomically replace the analysis table
pub struct RunAnalysisUseCase {
    source: Arc<dyn PostingSourcePort>,
    related: Arc<dyn RelatedPostingsPort>,
    sink: Arc<dyn ResultSinkPort>,
    normalizer: Box<dyn Normalizer + Send + Sync>,
    related_limit: usize,
}

impl RunAnalysisUseCase {
    pub fn new(
        source: Arc<dyn PostingSourcePort>,
        related: Arc<dyn RelatedPostingsPort>,
        sink: Arc<dyn ResultSinkPort>,
    ) -> Self {
        Self {
            source,
            related,
            sink,
            normalizer: Box::new(DefaultNormalizer),
            related_limit: MAX_RELATED_POSTINGS,
        }
    }

    /// Related postings per row, capped at the hard maximum
    pub fn with_related_limit(mut self, limit: usize) -> Self {
        self.related_limit = limit.min(MAX_RELATED_POSTINGS);
        self
    }

    pub fn with_normalizer(mut self, normalizer: Box<dyn Normalizer + Send + Sync>) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Run one analysis and replace its stored results
    #[instrument(skip(self, analysis, ctx), fields(analysis = analysis.name(), as_of = %ctx.as_of))]
    pub async fn run(&self, analysis: &dyn Analysis, ctx: &AnalysisContext) -> Result<AnalysisOutcome> {
        let started = Instant::now();
        let result = self.execute(analysis, ctx).await;
        metrics::analysis::duration(analysis.name(), started.elapsed().as_secs_f64());

        match &result {
            Ok(outcome) => {
                metrics::analysis::succeeded(outcome.name);
                metrics::analysis::rows_stored(outcome.name, outcome.stored);
                info!(stored = outcome.stored, "Analysis completed");
            }
            Err(e) => {
                metrics::analysis::failed(analysis.name());
                error!(error = %e, "Analysis failed");
            }
        }
        result
    }

    /// Run every registered analysis in order. A failure is reported and
    /// the remaining analyses still run.
    pub async fn run_all(&self, registry: &AnalysisRegistry, ctx: &AnalysisContext) -> Vec<AnalysisReport> {
        let mut reports = Vec::with_capacity(registry.len());
        for analysis in registry.iter() {
            let result = self
                .run(analysis, ctx)
                .await
                .map(|outcome| outcome.stored)
                .map_err(|e| e.to_string());
            reports.push(AnalysisReport {
                name: analysis.name(),
                result,
            });
        }
        reports
    }

    async fn execute(&self, analysis: &dyn Analysis, ctx: &AnalysisContext) -> Result<AnalysisOutcome> {
        let raw = self.source.fetch(&analysis.query(ctx)).await?;
        if raw.is_empty() {
            return Err(AnalyticsError::NoInput {
                analysis: analysis.name().to_string(),
            });
        }
        debug!(postings = raw.len(), "Fetched postings");

        let postings = self.normalizer.normalize_batch(&raw);
        metrics::normalize::postings_normalized(postings.len());
        metrics::normalize::salaries_unknown(postings.iter().filter(|p| !p.has_salary()).count());

        let mut rows = analysis.compute(&postings, ctx)?;
        self.attach_related(analysis.name(), &mut rows).await;

        let stored = self.sink.replace_all(analysis.table(), &rows).await?;
        Ok(AnalysisOutcome {
            name: analysis.name(),
            stored,
        })
    }

    /// Related lookups are best effort: a failed lookup leaves the row with
    /// an empty list.
    async fn attach_related(&self, analysis: &'static str, rows: &mut [RankedResult]) {
        for row in rows.iter_mut() {
            match self.related.find_related(&row.related, self.related_limit).await {
                Ok(mut related) => {
                    related.truncate(self.related_limit);
                    row.related_postings = related;
                }
                Err(e) => {
                    metrics::analysis::related_lookup_failed(analysis);
                    warn!(error = %e, "Related posting lookup failed");
                    row.related_postings = Vec::new();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PostingField, PostingQuery, PostingSummary, RawPosting, RelatedQuery, ResultTable};
    use crate::pipeline::analyses::compensation::TopPayingJobs;
    use crate::pipeline::analyses::employers::GovtVsPrivate;
    use crate::pipeline::processing::related::select_related;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    struct MockSource {
        postings: Vec<RawPosting>,
    }

    #[async_trait]
    impl PostingSourcePort for MockSource {
        async fn fetch(&self, query: &PostingQuery) -> Result<Vec<RawPosting>> {
            Ok(self.postings.iter().filter(|p| query.matches(p)).cloned().collect())
        }
    }

    struct MockRelated {
        postings: Vec<RawPosting>,
        fail: bool,
    }

    #[async_trait]
    impl RelatedPostingsPort for MockRelated {
        async fn find_related(&self, query: &RelatedQuery, limit: usize) -> Result<Vec<PostingSummary>> {
            if self.fail {
                return Err(AnalyticsError::Config("related store offline".to_string()));
            }
            Ok(select_related(&self.postings, query, limit))
        }
    }

    #[derive(Default)]
    struct MockSink {
        tables: tokio::sync::Mutex<HashMap<&'static str, Vec<RankedResult>>>,
    }

    #[async_trait]
    impl ResultSinkPort for MockSink {
        async fn replace_all(&self, table: &ResultTable, rows: &[RankedResult]) -> Result<usize> {
            self.tables.lock().await.insert(table.table, rows.to_vec());
            Ok(rows.len())
        }
    }

    fn raw(title: &str, salary: &str, govt: &str) -> RawPosting {
        let mut posting = RawPosting::default();
        posting.set(PostingField::Title, Some(title.to_string()));
        posting.set(PostingField::Salary, Some(salary.to_string()));
        posting.set(PostingField::IsGovt, Some(govt.to_string()));
        posting
    }

    fn salaried_postings() -> Vec<RawPosting> {
        (0..8).map(|i| raw("Data Scientist", &format!("{} LPA", 10 + i), "0")).collect()
    }

    fn ctx() -> AnalysisContext {
        AnalysisContext::new(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap())
    }

    fn use_case(postings: Vec<RawPosting>, fail_related: bool) -> (RunAnalysisUseCase, Arc<MockSink>) {
        let sink = Arc::new(MockSink::default());
        let use_case = RunAnalysisUseCase::new(
            Arc::new(MockSource {
                postings: postings.clone(),
            }),
            Arc::new(MockRelated {
                postings,
                fail: fail_related,
            }),
            sink.clone(),
        );
        (use_case, sink)
    }

    #[tokio::test]
    async fn stores_rows_with_at_most_five_related() {
        let (use_case, sink) = use_case(salaried_postings(), false);

        let outcome = use_case.run(&TopPayingJobs, &ctx()).await.unwrap();
        assert_eq!(outcome, AnalysisOutcome { name: "top_paying_jobs", stored: 1 });

        let tables = sink.tables.lock().await;
        let rows = &tables["analysis_top_paying_jobs"];
        assert_eq!(rows[0].related_postings.len(), 5);
        // Highest salaries first.
        assert_eq!(rows[0].related_postings[0].salary.as_deref(), Some("17 LPA"));
    }

    #[tokio::test]
    async fn empty_input_fails_without_touching_results() {
        let (use_case, sink) = use_case(vec![raw("Developer", "", "0")], false);

        let err = use_case.run(&TopPayingJobs, &ctx()).await.unwrap_err();
        assert!(matches!(err, AnalyticsError::NoInput { ref analysis } if analysis == "top_paying_jobs"));
        assert!(sink.tables.lock().await.is_empty());
    }

    #[tokio::test]
    async fn related_lookup_failure_keeps_rows() {
        let (use_case, sink) = use_case(salaried_postings(), true);

        let outcome = use_case.run(&TopPayingJobs, &ctx()).await.unwrap();
        assert_eq!(outcome.stored, 1);
        let tables = sink.tables.lock().await;
        assert!(tables["analysis_top_paying_jobs"][0].related_postings.is_empty());
    }

    #[tokio::test]
    async fn run_all_continues_after_a_failure() {
        let mut registry = AnalysisRegistry::empty();
        registry.register(Box::new(TopPayingJobs));
        registry.register(Box::new(GovtVsPrivate));
        let (use_case, sink) = use_case(vec![raw("Developer", "", "1"), raw("Analyst", "", "0")], false);

        let reports = use_case.run_all(&registry, &ctx()).await;
        assert_eq!(reports.len(), 2);
        assert!(!reports[0].succeeded());
        assert_eq!(reports[1], AnalysisReport { name: "govt_vs_private_analysis", result: Ok(2) });
        assert!(sink.tables.lock().await.contains_key("analysis_govt_vs_private"));
    }

    #[tokio::test]
    async fn rerun_is_idempotent() {
        let (use_case, sink) = use_case(salaried_postings(), false);

        use_case.run(&TopPayingJobs, &ctx()).await.unwrap();
        let first = sink.tables.lock().await["analysis_top_paying_jobs"].clone();
        use_case.run(&TopPayingJobs, &ctx()).await.unwrap();
        let second = sink.tables.lock().await["analysis_top_paying_jobs"].clone();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn run_inside_an_instrumented_span() {
        use tracing::Instrument;

        let (use_case, sink) = use_case(salaried_postings(), false);
        let span = tracing::info_span!("Running analysis", analysis = "top_paying_jobs");
        let outcome = use_case.run(&TopPayingJobs, &ctx()).instrument(span).await.unwrap();
        assert_eq!(outcome.stored, 1);
        assert!(sink.tables.lock().await.contains_key("analysis_top_paying_jobs"));
    }

    #[test]
    fn related_limit_is_capped() {
        let (use_case, _) = use_case(Vec::new(), false);
        assert_eq!(use_case.with_related_limit(50).related_limit, MAX_RELATED_POSTINGS);
    }
}
