use super::{title_stem, Analysis, AnalysisContext};
use crate::constants::{SALARY_BY_EXPERIENCE, TOP_PAYING_JOBS};
use crate::domain::{
    Column, Condition, PostingField, PostingQuery, RankedResult, RelatedFilter, RelatedOrder, RelatedQuery,
    ResultTable,
};
use crate::error::Result;
use crate::pipeline::processing::aggregate::{descending, rank, round2, GroupStats, Groups};
use crate::pipeline::processing::normalize::normalizers::category::PAY_GRADE;
use crate::pipeline::processing::normalize::normalizers::experience::{experience_span, EXPERIENCE_SPANS};
use crate::pipeline::processing::normalize::NormalizedPosting;

static TOP_PAYING_TABLE: ResultTable = ResultTable {
    analysis: TOP_PAYING_JOBS,
    table: "analysis_top_paying_jobs",
    columns: &[
        Column::text("job_title"),
        Column::real("avg_salary"),
        Column::real("min_salary"),
        Column::real("max_salary"),
        Column::int("job_count"),
    ],
};

/// Pay grades ranked by mean annual salary.
pub struct TopPayingJobs;

impl TopPayingJobs {
    const MIN_SALARIED: usize = 3;
    /// Means outside this band come from misparsed salaries.
    const PLAUSIBLE_MEAN: (f64, f64) = (50_000.0, 50_000_000.0);
    const TOP_N: usize = 50;
}

impl Analysis for TopPayingJobs {
    fn table(&self) -> &'static ResultTable {
        &TOP_PAYING_TABLE
    }

    fn query(&self, _ctx: &AnalysisContext) -> PostingQuery {
        PostingQuery::all().require(Condition::AnyNonEmpty(vec![PostingField::Salary, PostingField::SalaryDetail]))
    }

    fn compute(&self, postings: &[NormalizedPosting], _ctx: &AnalysisContext) -> Result<Vec<RankedResult>> {
        let mut grades: Groups<String> = Groups::new();
        for posting in postings.iter().filter(|p| p.has_salary()) {
            grades
                .entry(PAY_GRADE.classify(posting.title()))
                .or_default()
                .add(posting.salary);
        }

        let (low, high) = Self::PLAUSIBLE_MEAN;
        let paying: Vec<(String, GroupStats, f64)> = grades
            .into_iter()
            .filter(|(_, stats)| stats.salaries.len() >= Self::MIN_SALARIED)
            .filter_map(|(grade, stats)| {
                let avg = stats.mean_salary()?;
                (low..=high).contains(&avg).then_some((grade, stats, avg))
            })
            .collect();

        Ok(rank(paying, Self::TOP_N, |a, b| descending(a.2, b.2))
            .into_iter()
            .map(|(grade, stats, avg)| {
                let related = RelatedQuery::new(RelatedFilter::TitleContains(title_stem(&grade)))
                    .ordered_by(RelatedOrder::SalaryDesc);
                RankedResult::new(related)
                    .with("job_title", grade)
                    .with("avg_salary", round2(avg))
                    .with("min_salary", stats.min_salary().map(round2))
                    .with("max_salary", stats.max_salary().map(round2))
                    .with("job_count", stats.salaries.len())
                    .scored(avg)
            })
            .collect())
    }
}

static SALARY_EXPERIENCE_TABLE: ResultTable = ResultTable {
    analysis: SALARY_BY_EXPERIENCE,
    table: "analysis_salary_experience_trends",
    columns: &[
        Column::text("experience_range"),
        Column::real("avg_salary"),
        Column::real("median_salary"),
        Column::real("salary_growth_rate"),
        Column::int("job_count"),
    ],
};

/// Salary curve across experience spans, in ascending span order.
pub struct SalaryByExperience;

impl SalaryByExperience {
    const MIN_SALARIED: usize = 3;
}

impl Analysis for SalaryByExperience {
    fn table(&self) -> &'static ResultTable {
        &SALARY_EXPERIENCE_TABLE
    }

    fn query(&self, _ctx: &AnalysisContext) -> PostingQuery {
        PostingQuery::all().require(Condition::AnyNonEmpty(vec![PostingField::Salary, PostingField::SalaryDetail]))
    }

    fn compute(&self, postings: &[NormalizedPosting], _ctx: &AnalysisContext) -> Result<Vec<RankedResult>> {
        let mut spans: Groups<&'static str> = Groups::new();
        for posting in postings.iter().filter(|p| p.has_salary()) {
            let span = experience_span(
                posting.raw.get(PostingField::MinimumExperience),
                posting.raw.get(PostingField::MaximumExperience),
            );
            if let Some(span) = span {
                spans.entry(span).or_default().add(posting.salary);
            }
        }

        let mut rows = Vec::new();
        let mut previous_avg: Option<f64> = None;
        for span in EXPERIENCE_SPANS {
            let Some(stats) = spans.get(span).filter(|s| s.salaries.len() >= Self::MIN_SALARIED) else {
                continue;
            };
            let (Some(avg), Some(median)) = (stats.mean_salary(), stats.median_salary()) else {
                continue;
            };
            let growth = match previous_avg {
                Some(prev) if prev > 0.0 => (avg - prev) / prev * 100.0,
                _ => 0.0,
            };
            previous_avg = Some(avg);

            rows.push(
                RankedResult::new(RelatedQuery::any())
                    .with("experience_range", span)
                    .with("avg_salary", round2(avg))
                    .with("median_salary", round2(median))
                    .with("salary_growth_rate", round2(growth))
                    .with("job_count", stats.salaries.len())
                    .scored(avg),
            );
        }
        Ok(rows)
    }
}
