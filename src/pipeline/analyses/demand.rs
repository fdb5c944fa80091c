//! Demand-side analyses: application volume, competition per opening and
//! the best cities for each job category.

use indexmap::IndexMap;

use super::{first_word, title_stem, Analysis, AnalysisContext};
use crate::constants::{BEST_LOCATIONS_BY_JOB_TYPE, MOST_COMPETITIVE_JOBS, MOST_DEMANDED_JOBS, UNKNOWN};
use crate::domain::{
    Column, Condition, PostingField, PostingQuery, RankedResult, RelatedFilter, RelatedOrder, RelatedQuery,
    ResultTable,
};
use crate::error::Result;
use crate::pipeline::processing::aggregate::{
    composite_score, descending, rank, retain_supported, round2, GroupStats, Groups,
};
use crate::pipeline::processing::normalize::normalizers::category::{
    Taxonomy, COMPETITION_ROLE, DEMAND_ROLE, JOB_CATEGORY,
};
use crate::pipeline::processing::normalize::NormalizedPosting;

const MIN_POSTINGS: usize = 3;
const TOP_N: usize = 50;

fn demand_query() -> PostingQuery {
    PostingQuery::all()
        .require(Condition::Positive(PostingField::ApplyCount))
        .require(Condition::Positive(PostingField::Openings))
}

/// Group postings that report both applications and openings.
fn demand_groups(postings: &[NormalizedPosting], taxonomy: &Taxonomy) -> Groups<String> {
    let mut groups: Groups<String> = Groups::new();
    for posting in postings {
        let has_openings = posting
            .raw
            .number(PostingField::Openings)
            .map(|o| o > 0.0)
            .unwrap_or(false);
        if posting.raw.apply_count() > 0 && has_openings {
            groups.entry(taxonomy.classify(posting.title())).or_default().record(posting);
        }
    }
    retain_supported(&mut groups, MIN_POSTINGS);
    groups
}

fn applications_related(label: &str) -> RelatedQuery {
    RelatedQuery::new(RelatedFilter::TitleContains(title_stem(label))).ordered_by(RelatedOrder::ApplyCountDesc)
}

static DEMANDED_TABLE: ResultTable = ResultTable {
    analysis: MOST_DEMANDED_JOBS,
    table: "analysis_most_demanded_jobs",
    columns: &[
        Column::text("job_title"),
        Column::int("total_applications"),
        Column::int("total_openings"),
        Column::real("demand_ratio"),
        Column::real("avg_competition"),
    ],
};

/// Roles drawing the most applications overall.
pub struct MostDemandedJobs;

impl Analysis for MostDemandedJobs {
    fn table(&self) -> &'static ResultTable {
        &DEMANDED_TABLE
    }

    fn query(&self, _ctx: &AnalysisContext) -> PostingQuery {
        demand_query()
    }

    fn compute(&self, postings: &[NormalizedPosting], _ctx: &AnalysisContext) -> Result<Vec<RankedResult>> {
        let groups: Vec<(String, GroupStats)> = demand_groups(postings, &DEMAND_ROLE).into_iter().collect();
        let ranked = rank(groups, TOP_N, |a, b| {
            b.1.applications
                .cmp(&a.1.applications)
                .then(b.1.count.cmp(&a.1.count))
        });

        Ok(ranked
            .into_iter()
            .map(|(role, stats)| {
                let demand_ratio = stats.applications as f64 / stats.openings as f64;
                let avg_competition = stats.applications as f64 / stats.count as f64;
                RankedResult::new(applications_related(&role))
                    .with("job_title", role)
                    .with("total_applications", stats.applications)
                    .with("total_openings", stats.openings)
                    .with("demand_ratio", round2(demand_ratio))
                    .with("avg_competition", round2(avg_competition))
                    .scored(stats.applications as f64)
            })
            .collect())
    }
}

static COMPETITIVE_TABLE: ResultTable = ResultTable {
    analysis: MOST_COMPETITIVE_JOBS,
    table: "analysis_competitive_jobs",
    columns: &[
        Column::text("job_title"),
        Column::real("avg_applications_per_opening"),
        Column::int("total_applications"),
        Column::int("total_openings"),
        Column::text("competition_level"),
    ],
};

/// Roles with the most applicants per opening.
pub struct MostCompetitiveJobs;

impl MostCompetitiveJobs {
    pub fn competition_level(ratio: f64) -> &'static str {
        if ratio >= 100.0 {
            "Extremely High"
        } else if ratio >= 50.0 {
            "Very High"
        } else if ratio >= 20.0 {
            "High"
        } else if ratio >= 10.0 {
            "Moderate"
        } else {
            "Low"
        }
    }
}

impl Analysis for MostCompetitiveJobs {
    fn table(&self) -> &'static ResultTable {
        &COMPETITIVE_TABLE
    }

    fn query(&self, _ctx: &AnalysisContext) -> PostingQuery {
        demand_query()
    }

    fn compute(&self, postings: &[NormalizedPosting], _ctx: &AnalysisContext) -> Result<Vec<RankedResult>> {
        let groups: Vec<(String, GroupStats, f64)> = demand_groups(postings, &COMPETITION_ROLE)
            .into_iter()
            .map(|(role, stats)| {
                let ratio = stats.applications as f64 / stats.openings as f64;
                (role, stats, ratio)
            })
            .collect();

        Ok(rank(groups, TOP_N, |a, b| descending(a.2, b.2))
            .into_iter()
            .map(|(role, stats, ratio)| {
                RankedResult::new(applications_related(&role))
                    .with("job_title", role)
                    .with("avg_applications_per_opening", round2(ratio))
                    .with("total_applications", stats.applications)
                    .with("total_openings", stats.openings)
                    .with("competition_level", Self::competition_level(ratio))
                    .scored(ratio)
            })
            .collect())
    }
}

static BEST_LOCATIONS_TABLE: ResultTable = ResultTable {
    analysis: BEST_LOCATIONS_BY_JOB_TYPE,
    table: "analysis_best_locations",
    columns: &[
        Column::text("job_type"),
        Column::text("location"),
        Column::int("job_count"),
        Column::real("avg_salary"),
        Column::int("total_openings"),
    ],
};

/// Cities ranked per job category by volume and pay.
pub struct BestLocationsByJobType;

impl BestLocationsByJobType {
    const TOP_PER_TYPE: usize = 10;
}

impl Analysis for BestLocationsByJobType {
    fn table(&self) -> &'static ResultTable {
        &BEST_LOCATIONS_TABLE
    }

    fn query(&self, _ctx: &AnalysisContext) -> PostingQuery {
        PostingQuery::all().require(Condition::NonEmpty(PostingField::Location))
    }

    fn compute(&self, postings: &[NormalizedPosting], _ctx: &AnalysisContext) -> Result<Vec<RankedResult>> {
        let mut by_type: IndexMap<String, Groups<&str>> = IndexMap::new();
        for posting in postings {
            let job_type = JOB_CATEGORY.classify(posting.title());
            if job_type == UNKNOWN || posting.location == UNKNOWN {
                continue;
            }
            by_type
                .entry(job_type)
                .or_default()
                .entry(posting.location.as_str())
                .or_default()
                .record(posting);
        }

        let mut rows = Vec::new();
        for (job_type, mut locations) in by_type {
            retain_supported(&mut locations, MIN_POSTINGS);
            let scored: Vec<(&str, GroupStats, f64)> = locations
                .into_iter()
                .map(|(location, stats)| {
                    let score = composite_score(stats.count, stats.mean_salary().unwrap_or(0.0));
                    (location, stats, score)
                })
                .collect();
            let ranked = rank(scored, Self::TOP_PER_TYPE, |a, b| {
                descending(a.2, b.2).then(b.1.count.cmp(&a.1.count))
            });

            let title = first_word(&job_type);
            for (location, stats, score) in ranked {
                let related = RelatedQuery::new(RelatedFilter::TitleAndLocation {
                    title: title.clone(),
                    location: location.to_string(),
                })
                .ordered_by(RelatedOrder::SalaryDesc);
                rows.push(
                    RankedResult::new(related)
                        .with("job_type", job_type.as_str())
                        .with("location", location)
                        .with("job_count", stats.count)
                        .with("avg_salary", round2(stats.mean_salary().unwrap_or(0.0)))
                        .with("total_openings", stats.openings)
                        .scored(score),
                );
            }
        }
        Ok(rows)
    }
}
