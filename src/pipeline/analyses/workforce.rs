//! Analyses of who is being hired: seniority mix, experience requirements
//! over time and newly popular job titles.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{first_word, Analysis, AnalysisContext, Window};
use crate::constants::{EMERGING_JOB_TITLES, EXPERIENCE_LEVEL_DISTRIBUTION, EXPERIENCE_REQUIREMENTS};
use crate::domain::{
    Column, Condition, PostingField, PostingQuery, RankedResult, RelatedFilter, RelatedQuery, ResultTable,
};
use crate::error::Result;
use crate::pipeline::processing::aggregate::{
    descending, growth_rate, mean, percentage, rank, round2, round_to, GroupStats, Groups,
};
use crate::pipeline::processing::normalize::normalizers::category::EXPERIENCE_TRACK;
use crate::pipeline::processing::normalize::normalizers::experience::{experience_bounds, ExperienceBracket};
use crate::pipeline::processing::normalize::normalizers::title_case;
use crate::pipeline::processing::normalize::NormalizedPosting;

const SKILLS: &str = "skills";

static EXPERIENCE_DISTRIBUTION_TABLE: ResultTable = ResultTable {
    analysis: EXPERIENCE_LEVEL_DISTRIBUTION,
    table: "analysis_experience_distribution",
    columns: &[
        Column::text("experience_level"),
        Column::int("job_count"),
        Column::real("percentage"),
        Column::real("avg_salary"),
        Column::json("top_skills"),
    ],
};

/// Share of postings per seniority bracket.
pub struct ExperienceLevelDistribution;

impl Analysis for ExperienceLevelDistribution {
    fn table(&self) -> &'static ResultTable {
        &EXPERIENCE_DISTRIBUTION_TABLE
    }

    fn query(&self, _ctx: &AnalysisContext) -> PostingQuery {
        PostingQuery::all()
    }

    fn compute(&self, postings: &[NormalizedPosting], _ctx: &AnalysisContext) -> Result<Vec<RankedResult>> {
        let mut brackets: Groups<ExperienceBracket> = Groups::new();
        for posting in postings {
            let bracket = ExperienceBracket::classify(
                posting.raw.get(PostingField::MinimumExperience),
                posting.raw.get(PostingField::MaximumExperience),
                posting.raw.get(PostingField::Experience),
            );
            let stats = brackets.entry(bracket).or_default();
            stats.record(posting);
            for skill in &posting.tag_skills {
                stats.tally(SKILLS, skill);
            }
        }

        let total = postings.len();
        Ok(ExperienceBracket::RANKED
            .iter()
            .filter_map(|bracket| brackets.get(bracket).map(|stats| (bracket, stats)))
            .map(|(bracket, stats)| {
                let related = match bracket {
                    ExperienceBracket::Entry => RelatedQuery::new(RelatedFilter::EntryLevel),
                    _ => RelatedQuery::any(),
                };
                let share = percentage(stats.count, total);
                RankedResult::new(related)
                    .with("experience_level", bracket.label())
                    .with("job_count", stats.count)
                    .with("percentage", round2(share))
                    .with("avg_salary", round2(stats.mean_salary().unwrap_or(0.0)))
                    .with("top_skills", stats.top_keys(SKILLS, 5))
                    .scored(share)
            })
            .collect())
    }
}

static EXPERIENCE_REQUIREMENTS_TABLE: ResultTable = ResultTable {
    analysis: EXPERIENCE_REQUIREMENTS,
    table: "analysis_experience_requirements",
    columns: &[
        Column::text("job_category"),
        Column::real("avg_min_experience"),
        Column::real("avg_max_experience"),
        Column::text("experience_trend"),
        Column::int("job_count"),
    ],
};

#[derive(Debug, Default)]
struct ExperienceSamples {
    mins: Vec<f64>,
    maxs: Vec<f64>,
}

impl ExperienceSamples {
    fn push(&mut self, (min, max): (f64, f64)) {
        self.mins.push(min);
        self.maxs.push(max);
    }
}

/// Whether mean minimum experience per career track rose or fell between the
/// older postings and the recent window.
pub struct ExperienceRequirementsTrends;

impl ExperienceRequirementsTrends {
    const MIN_RECENT: usize = 3;
    const TOP_N: usize = 20;
}

impl Analysis for ExperienceRequirementsTrends {
    fn table(&self) -> &'static ResultTable {
        &EXPERIENCE_REQUIREMENTS_TABLE
    }

    fn query(&self, _ctx: &AnalysisContext) -> PostingQuery {
        PostingQuery::all()
            .require(Condition::NonEmpty(PostingField::Title))
            .require(Condition::NonEmpty(PostingField::CreatedAt))
    }

    fn compute(&self, postings: &[NormalizedPosting], ctx: &AnalysisContext) -> Result<Vec<RankedResult>> {
        let mut recent: IndexMap<String, ExperienceSamples> = IndexMap::new();
        let mut older: IndexMap<String, ExperienceSamples> = IndexMap::new();

        for posting in postings {
            let Some(window) = ctx.window_of(posting) else {
                continue;
            };
            let Some(bounds) = experience_bounds(
                posting.raw.get(PostingField::MinimumExperience),
                posting.raw.get(PostingField::MaximumExperience),
            ) else {
                continue;
            };
            let track = EXPERIENCE_TRACK.classify(posting.title());
            let samples = match window {
                Window::Recent => &mut recent,
                Window::Older => &mut older,
            };
            samples.entry(track).or_default().push(bounds);
        }

        let tracks: Vec<(String, f64, f64, &'static str, usize)> = recent
            .iter()
            .filter(|(_, samples)| samples.mins.len() >= Self::MIN_RECENT)
            .filter_map(|(track, samples)| {
                let avg_min = mean(&samples.mins)?;
                let avg_max = mean(&samples.maxs)?;
                let older_min = older.get(track).and_then(|o| mean(&o.mins)).unwrap_or(avg_min);
                let trend = if avg_min > older_min {
                    "Increasing"
                } else if avg_min < older_min {
                    "Decreasing"
                } else {
                    "Stable"
                };
                Some((track.clone(), avg_min, avg_max, trend, samples.mins.len()))
            })
            .collect();

        let ranked = rank(tracks, Self::TOP_N, |a, b| b.4.cmp(&a.4).then_with(|| a.0.cmp(&b.0)));
        Ok(ranked
            .into_iter()
            .map(|(track, avg_min, avg_max, trend, count)| {
                RankedResult::new(RelatedQuery::any())
                    .with("job_category", track)
                    .with("avg_min_experience", round_to(avg_min, 1))
                    .with("avg_max_experience", round_to(avg_max, 1))
                    .with("experience_trend", trend)
                    .with("job_count", count)
                    .scored(count as f64)
            })
            .collect())
    }
}

static EMERGING_TABLE: ResultTable = ResultTable {
    analysis: EMERGING_JOB_TITLES,
    table: "analysis_emerging_job_titles",
    columns: &[
        Column::text("job_title"),
        Column::int("recent_count"),
        Column::real("growth_rate"),
        Column::real("avg_salary"),
        Column::json("key_skills"),
    ],
};

static SENIORITY_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(senior|junior|sr|jr)\s+").expect("seniority pattern should compile"));
static LEVEL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+(i{1,3}|1|2|3)$").expect("level suffix pattern should compile"));

/// Title without seniority prefix or level suffix, title-cased. `None` for
/// titles of three characters or fewer once stripped.
pub fn clean_title(title: &str) -> Option<String> {
    let stripped = SENIORITY_PREFIX.replace(title.trim(), "");
    let stripped = LEVEL_SUFFIX.replace(&stripped, "");
    if stripped.chars().count() > 3 {
        Some(title_case(stripped.trim()))
    } else {
        None
    }
}

/// Titles posted often in the recent window that were rare or absent before.
pub struct EmergingJobTitles;

impl EmergingJobTitles {
    const MIN_RECENT: usize = 5;
    const MIN_GROWTH: f64 = 50.0;
    const TOP_N: usize = 30;
}

impl Analysis for EmergingJobTitles {
    fn table(&self) -> &'static ResultTable {
        &EMERGING_TABLE
    }

    fn query(&self, _ctx: &AnalysisContext) -> PostingQuery {
        PostingQuery::all()
            .require(Condition::NonEmpty(PostingField::Title))
            .require(Condition::NonEmpty(PostingField::CreatedAt))
    }

    fn compute(&self, postings: &[NormalizedPosting], ctx: &AnalysisContext) -> Result<Vec<RankedResult>> {
        let mut recent: Groups<String> = Groups::new();
        let mut older: Groups<String> = Groups::new();

        for posting in postings {
            let (Some(window), Some(title)) = (ctx.window_of(posting), posting.title().and_then(clean_title)) else {
                continue;
            };
            match window {
                Window::Recent => {
                    let stats = recent.entry(title).or_default();
                    stats.record(posting);
                    for skill in &posting.tag_skills {
                        stats.tally(SKILLS, skill);
                    }
                }
                Window::Older => older.entry(title).or_default().record(posting),
            }
        }

        let emerging: Vec<(String, GroupStats, f64)> = recent
            .into_iter()
            .filter(|(_, stats)| stats.count >= Self::MIN_RECENT)
            .filter_map(|(title, stats)| {
                let older_count = older.get(&title).map(|o| o.count).unwrap_or(0);
                let growth = growth_rate(older_count, stats.count);
                (growth >= Self::MIN_GROWTH || older_count == 0).then_some((title, stats, growth))
            })
            .collect();

        let ranked = rank(emerging, Self::TOP_N, |a, b| {
            descending(a.2, b.2).then(b.1.count.cmp(&a.1.count))
        });
        Ok(ranked
            .into_iter()
            .map(|(title, stats, growth)| {
                RankedResult::new(RelatedQuery::new(RelatedFilter::TitleContains(first_word(&title))))
                    .with("job_title", title)
                    .with("recent_count", stats.count)
                    .with("growth_rate", round2(growth))
                    .with("avg_salary", round2(stats.mean_salary().unwrap_or(0.0)))
                    .with("key_skills", stats.top_keys(SKILLS, 5))
                    .scored(growth)
            })
            .collect())
    }
}
