//! Employer-side analyses: who hires most, public versus private sector and
//! contract types.

use super::{Analysis, AnalysisContext};
use crate::constants::{COMPANY_HIRING_TRENDS, GOVT_VS_PRIVATE, JOB_DURATION};
use crate::domain::{
    Column, Condition, PostingField, PostingQuery, RankedResult, RelatedFilter, RelatedQuery, ResultTable,
};
use crate::error::Result;
use crate::pipeline::processing::aggregate::{percentage, rank, retain_supported, round2, GroupStats, Groups};
use crate::pipeline::processing::normalize::normalizers::category::{SECTOR_FUNCTION, WORK_FUNCTION};
use crate::pipeline::processing::normalize::normalizers::DurationCategory;
use crate::pipeline::processing::normalize::NormalizedPosting;

const JOB_TYPES: &str = "job_types";

static COMPANY_TABLE: ResultTable = ResultTable {
    analysis: COMPANY_HIRING_TRENDS,
    table: "analysis_company_hiring_trends",
    columns: &[
        Column::text("company"),
        Column::int("total_jobs"),
        Column::int("total_openings"),
        Column::real("avg_salary"),
        Column::json("top_job_types"),
        Column::text("hiring_trend"),
    ],
};

/// Companies with the most postings.
pub struct CompanyHiringTrends;

impl CompanyHiringTrends {
    const MIN_POSTINGS: usize = 3;
    const TOP_N: usize = 50;

    pub fn hiring_trend(total_jobs: usize) -> &'static str {
        if total_jobs >= 20 {
            "High"
        } else if total_jobs >= 10 {
            "Moderate"
        } else {
            "Low"
        }
    }
}

impl Analysis for CompanyHiringTrends {
    fn table(&self) -> &'static ResultTable {
        &COMPANY_TABLE
    }

    fn query(&self, _ctx: &AnalysisContext) -> PostingQuery {
        PostingQuery::all().require(Condition::NonEmpty(PostingField::Company))
    }

    fn compute(&self, postings: &[NormalizedPosting], _ctx: &AnalysisContext) -> Result<Vec<RankedResult>> {
        let mut companies: Groups<&str> = Groups::new();
        for posting in postings {
            let Some(company) = posting.raw.text(PostingField::Company).map(str::trim) else {
                continue;
            };
            if company.chars().count() <= 2 {
                continue;
            }
            let stats = companies.entry(company).or_default();
            stats.record(posting);
            stats.tally(JOB_TYPES, &WORK_FUNCTION.classify(posting.title()));
        }
        retain_supported(&mut companies, Self::MIN_POSTINGS);

        let entries: Vec<(&str, GroupStats)> = companies.into_iter().collect();
        Ok(rank(entries, Self::TOP_N, |a, b| b.1.count.cmp(&a.1.count))
            .into_iter()
            .map(|(company, stats)| {
                RankedResult::new(RelatedQuery::new(RelatedFilter::Company(company.to_string())))
                    .with("company", company)
                    .with("total_jobs", stats.count)
                    .with("total_openings", stats.openings)
                    .with("avg_salary", round2(stats.mean_salary().unwrap_or(0.0)))
                    .with("top_job_types", stats.top_keys(JOB_TYPES, 3))
                    .with("hiring_trend", Self::hiring_trend(stats.count))
                    .scored(stats.count as f64)
            })
            .collect())
    }
}

static SECTOR_TABLE: ResultTable = ResultTable {
    analysis: GOVT_VS_PRIVATE,
    table: "analysis_govt_vs_private",
    columns: &[
        Column::text("sector"),
        Column::int("job_count"),
        Column::real("avg_salary"),
        Column::json("top_job_types"),
        Column::int("total_openings"),
    ],
};

/// Government postings compared with private-sector postings.
pub struct GovtVsPrivate;

impl GovtVsPrivate {
    const SECTORS: [(&'static str, bool); 2] = [("Government", true), ("Private", false)];
}

impl Analysis for GovtVsPrivate {
    fn table(&self) -> &'static ResultTable {
        &SECTOR_TABLE
    }

    fn query(&self, _ctx: &AnalysisContext) -> PostingQuery {
        PostingQuery::all()
    }

    fn compute(&self, postings: &[NormalizedPosting], _ctx: &AnalysisContext) -> Result<Vec<RankedResult>> {
        let mut sectors: Groups<bool> = Groups::new();
        for posting in postings {
            let stats = sectors.entry(posting.raw.is_government()).or_default();
            stats.record(posting);
            stats.tally(JOB_TYPES, &SECTOR_FUNCTION.classify(posting.title()));
        }

        Ok(Self::SECTORS
            .iter()
            .filter_map(|(label, government)| sectors.get(government).map(|stats| (*label, *government, stats)))
            .map(|(label, government, stats)| {
                RankedResult::new(RelatedQuery::new(RelatedFilter::Sector { government }))
                    .with("sector", label)
                    .with("job_count", stats.count)
                    .with("avg_salary", round2(stats.mean_salary().unwrap_or(0.0)))
                    .with("top_job_types", stats.top_keys(JOB_TYPES, 5))
                    .with("total_openings", stats.openings)
                    .scored(stats.count as f64)
            })
            .collect())
    }
}

static DURATION_TABLE: ResultTable = ResultTable {
    analysis: JOB_DURATION,
    table: "analysis_job_duration",
    columns: &[
        Column::text("duration_category"),
        Column::int("job_count"),
        Column::real("percentage"),
        Column::real("avg_salary"),
        Column::json("popular_job_types"),
    ],
};

/// Permanent roles against fixed-length contracts and internships.
pub struct JobDurationAnalysis;

impl Analysis for JobDurationAnalysis {
    fn table(&self) -> &'static ResultTable {
        &DURATION_TABLE
    }

    fn query(&self, _ctx: &AnalysisContext) -> PostingQuery {
        PostingQuery::all()
    }

    fn compute(&self, postings: &[NormalizedPosting], _ctx: &AnalysisContext) -> Result<Vec<RankedResult>> {
        let mut categories: Groups<DurationCategory> = Groups::new();
        for posting in postings {
            let category = DurationCategory::classify(
                posting.raw.get(PostingField::Duration),
                posting.raw.get(PostingField::PositionType),
            );
            let stats = categories.entry(category).or_default();
            stats.record(posting);
            stats.tally(JOB_TYPES, &WORK_FUNCTION.classify(posting.title()));
        }

        let total = postings.len();
        let entries: Vec<(DurationCategory, GroupStats)> = categories.into_iter().collect();
        Ok(rank(entries, usize::MAX, |a, b| b.1.count.cmp(&a.1.count))
            .into_iter()
            .map(|(category, stats)| {
                let share = percentage(stats.count, total);
                RankedResult::new(RelatedQuery::any())
                    .with("duration_category", category.label())
                    .with("job_count", stats.count)
                    .with("percentage", round2(share))
                    .with("avg_salary", round2(stats.mean_salary().unwrap_or(0.0)))
                    .with("popular_job_types", stats.top_keys(JOB_TYPES, 3))
                    .scored(stats.count as f64)
            })
            .collect())
    }
}
