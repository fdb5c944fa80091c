//! Skill-centred analyses: per-role skills, trending skills, skills by
//! location and skill pairs that appear together.

use indexmap::{IndexMap, IndexSet};

use super::{title_stem, Analysis, AnalysisContext};
use crate::constants::{
    SKILLS_BY_LOCATION, SKILLS_CORRELATION, TOP_SKILLS_BY_JOB_TYPE, TRENDING_SKILLS, UNKNOWN,
};
use crate::domain::{
    Column, Condition, PostingField, PostingQuery, RankedResult, RelatedFilter, RelatedQuery, ResultTable,
};
use crate::error::Result;
use crate::pipeline::processing::aggregate::{
    descending, growth_rate, percentage, rank, retain_supported, round2, round_to, FrequencyTable, GroupStats,
    Groups,
};
use crate::pipeline::processing::normalize::normalizers::category::{PAIRING_FUNCTION, ROLE_FAMILY};
use crate::pipeline::processing::normalize::NormalizedPosting;

/// Skills longer than this are truncated fragments and are not counted.
const MAX_SKILL_CHARS: usize = 100;

const SKILLS: &str = "skills";
const JOB_TYPES: &str = "job_types";

fn countable(skill: &str) -> bool {
    skill.chars().count() <= MAX_SKILL_CHARS
}

static TOP_SKILLS_TABLE: ResultTable = ResultTable {
    analysis: TOP_SKILLS_BY_JOB_TYPE,
    table: "analysis_top_skills_by_job_type",
    columns: &[
        Column::text("job_type"),
        Column::text("skill"),
        Column::int("frequency"),
        Column::real("percentage"),
    ],
};

/// Most frequent skills within each role family.
pub struct TopSkillsByJobType;

impl TopSkillsByJobType {
    const MIN_POSTINGS: usize = 3;
    const TOP_N: usize = 15;
}

impl Analysis for TopSkillsByJobType {
    fn table(&self) -> &'static ResultTable {
        &TOP_SKILLS_TABLE
    }

    fn query(&self, _ctx: &AnalysisContext) -> PostingQuery {
        PostingQuery::all().require(Condition::AnyNonEmpty(vec![
            PostingField::TagsAndSkills,
            PostingField::JobDescription,
        ]))
    }

    fn compute(&self, postings: &[NormalizedPosting], _ctx: &AnalysisContext) -> Result<Vec<RankedResult>> {
        let mut families: Groups<String> = Groups::new();
        for posting in postings {
            let stats = families.entry(ROLE_FAMILY.classify(posting.title())).or_default();
            stats.record(posting);
            for skill in posting.skills.iter().filter(|s| countable(s)) {
                stats.tally(SKILLS, skill);
            }
        }
        retain_supported(&mut families, Self::MIN_POSTINGS);

        let mut rows = Vec::new();
        for (family, stats) in &families {
            let related = RelatedQuery::new(RelatedFilter::TitleContains(title_stem(family)));
            for (skill, frequency) in stats.top(SKILLS, Self::TOP_N) {
                rows.push(
                    RankedResult::new(related.clone())
                        .with("job_type", family.as_str())
                        .with("skill", skill)
                        .with("frequency", frequency)
                        .with("percentage", round2(percentage(frequency, stats.count)))
                        .scored(frequency as f64),
                );
            }
        }
        Ok(rows)
    }
}

static TRENDING_TABLE: ResultTable = ResultTable {
    analysis: TRENDING_SKILLS,
    table: "analysis_trending_skills",
    columns: &[
        Column::text("skill"),
        Column::int("current_frequency"),
        Column::real("growth_rate"),
        Column::text("trend_period"),
    ],
};

/// Skills whose mention count grew between the older and recent windows.
pub struct TrendingSkills;

impl TrendingSkills {
    const MIN_MENTIONS: usize = 5;
    const TOP_N: usize = 50;

    pub fn trend_period(growth: f64) -> &'static str {
        if growth > 100.0 {
            "Rapidly Growing (>100%)"
        } else if growth > 50.0 {
            "High Growth (50-100%)"
        } else if growth > 20.0 {
            "Moderate Growth (20-50%)"
        } else if growth > 0.0 {
            "Slight Growth (0-20%)"
        } else {
            "Declining"
        }
    }
}

impl Analysis for TrendingSkills {
    fn table(&self) -> &'static ResultTable {
        &TRENDING_TABLE
    }

    fn query(&self, ctx: &AnalysisContext) -> PostingQuery {
        PostingQuery::all()
            .require(Condition::NonEmpty(PostingField::TagsAndSkills))
            .require(Condition::CreatedOnOrAfter(ctx.history_start()))
    }

    fn compute(&self, postings: &[NormalizedPosting], ctx: &AnalysisContext) -> Result<Vec<RankedResult>> {
        let recent_start = ctx.recent_start();
        let history_start = ctx.history_start();
        let mut recent = FrequencyTable::new();
        let mut older = FrequencyTable::new();

        for posting in postings {
            let Some(created) = posting.raw.created_date() else {
                continue;
            };
            let window = if created >= recent_start {
                &mut recent
            } else if created >= history_start {
                &mut older
            } else {
                continue;
            };
            for skill in posting.skills.iter().filter(|s| countable(s)) {
                *window.entry(skill.clone()).or_insert(0) += 1;
            }
        }

        let skills: IndexSet<&String> = recent.keys().chain(older.keys()).collect();
        let trending: Vec<(&String, usize, f64)> = skills
            .into_iter()
            .filter_map(|skill| {
                let recent_count = recent.get(skill).copied().unwrap_or(0);
                let older_count = older.get(skill).copied().unwrap_or(0);
                (recent_count >= Self::MIN_MENTIONS || older_count >= Self::MIN_MENTIONS)
                    .then(|| (skill, recent_count, growth_rate(older_count, recent_count)))
            })
            .collect();

        let ranked = rank(trending, Self::TOP_N, |a, b| {
            descending(a.2, b.2).then(b.1.cmp(&a.1))
        });
        Ok(ranked
            .into_iter()
            .map(|(skill, recent_count, growth)| {
                RankedResult::new(RelatedQuery::new(RelatedFilter::Skill(skill.clone())))
                    .with("skill", skill.as_str())
                    .with("current_frequency", recent_count)
                    .with("growth_rate", round2(growth))
                    .with("trend_period", Self::trend_period(growth))
                    .scored(growth)
            })
            .collect())
    }
}

static SKILLS_BY_LOCATION_TABLE: ResultTable = ResultTable {
    analysis: SKILLS_BY_LOCATION,
    table: "analysis_skills_by_location",
    columns: &[
        Column::text("location"),
        Column::text("skill"),
        Column::int("frequency"),
        Column::int("job_count"),
        Column::real("avg_salary"),
    ],
};

/// Skills most asked for in each city.
pub struct SkillsDemandByLocation;

impl SkillsDemandByLocation {
    const MIN_DISTINCT_SKILLS: usize = 10;
    const MIN_FREQUENCY: usize = 3;
    const MAX_SKILL_WORDS: usize = 4;
    const TOP_N: usize = 25;
}

impl Analysis for SkillsDemandByLocation {
    fn table(&self) -> &'static ResultTable {
        &SKILLS_BY_LOCATION_TABLE
    }

    fn query(&self, _ctx: &AnalysisContext) -> PostingQuery {
        PostingQuery::all()
            .require(Condition::NonEmpty(PostingField::Location))
            .require(Condition::AnyNonEmpty(vec![
                PostingField::TagsAndSkills,
                PostingField::JobDescription,
            ]))
    }

    fn compute(&self, postings: &[NormalizedPosting], _ctx: &AnalysisContext) -> Result<Vec<RankedResult>> {
        let mut locations: IndexMap<&str, Groups<&str>> = IndexMap::new();
        for posting in postings {
            if posting.location == UNKNOWN || posting.location.chars().count() <= 2 {
                continue;
            }
            let skills = locations.entry(posting.location.as_str()).or_default();
            for skill in posting
                .skills
                .iter()
                .filter(|s| countable(s) && s.split_whitespace().count() <= Self::MAX_SKILL_WORDS)
            {
                skills.entry(skill.as_str()).or_default().add(posting.salary);
            }
        }

        let mut rows = Vec::new();
        for (location, skills) in locations {
            if skills.len() < Self::MIN_DISTINCT_SKILLS {
                continue;
            }
            let entries: Vec<(&str, GroupStats)> = skills.into_iter().collect();
            let top = rank(entries, Self::TOP_N, |a, b| b.1.count.cmp(&a.1.count));
            for (skill, stats) in top.into_iter().filter(|(_, s)| s.count >= Self::MIN_FREQUENCY) {
                let related = RelatedQuery::new(RelatedFilter::LocationAndSkill {
                    location: location.to_string(),
                    skill: skill.to_string(),
                });
                rows.push(
                    RankedResult::new(related)
                        .with("location", location)
                        .with("skill", skill)
                        .with("frequency", stats.count)
                        .with("job_count", stats.count)
                        .with("avg_salary", round2(stats.mean_salary().unwrap_or(0.0)))
                        .scored(stats.count as f64),
                );
            }
        }
        Ok(rows)
    }
}

static CORRELATION_TABLE: ResultTable = ResultTable {
    analysis: SKILLS_CORRELATION,
    table: "analysis_skills_correlation",
    columns: &[
        Column::text("skill_combination"),
        Column::real("correlation_strength"),
        Column::int("job_count"),
        Column::real("avg_salary"),
        Column::json("job_types"),
    ],
};

/// Pairs of common skills that are listed together on the same posting.
pub struct SkillsCorrelation;

impl SkillsCorrelation {
    /// A skill is common when it appears on at least this many postings.
    const COMMON_SKILL_POSTINGS: usize = 10;
    const MIN_PAIR_POSTINGS: usize = 5;
    const TOP_N: usize = 50;
}

impl Analysis for SkillsCorrelation {
    fn table(&self) -> &'static ResultTable {
        &CORRELATION_TABLE
    }

    fn query(&self, _ctx: &AnalysisContext) -> PostingQuery {
        PostingQuery::all().require(Condition::NonEmpty(PostingField::TagsAndSkills))
    }

    fn compute(&self, postings: &[NormalizedPosting], _ctx: &AnalysisContext) -> Result<Vec<RankedResult>> {
        let multi_skill: Vec<(&NormalizedPosting, Vec<&String>)> = postings
            .iter()
            .map(|p| (p, p.skills.iter().filter(|s| countable(s)).collect::<Vec<_>>()))
            .filter(|(_, skills)| skills.len() >= 2)
            .collect();
        let total = multi_skill.len();

        let mut skill_postings = FrequencyTable::new();
        for (_, skills) in &multi_skill {
            for skill in skills {
                *skill_postings.entry((*skill).clone()).or_insert(0) += 1;
            }
        }
        let common: IndexSet<&String> = skill_postings
            .iter()
            .filter(|(_, n)| **n >= Self::COMMON_SKILL_POSTINGS)
            .map(|(s, _)| s)
            .collect();
        if common.len() < 2 {
            return Ok(Vec::new());
        }

        let mut pairs: IndexMap<(String, String), GroupStats> = IndexMap::new();
        for (posting, skills) in &multi_skill {
            let mut present: Vec<&String> = skills.iter().copied().filter(|s| common.contains(s)).collect();
            present.sort();
            let job_type = PAIRING_FUNCTION.classify(posting.title());
            for (i, first) in present.iter().enumerate() {
                for second in &present[i + 1..] {
                    let stats = pairs.entry(((*first).clone(), (*second).clone())).or_default();
                    stats.add(posting.salary);
                    stats.tally(JOB_TYPES, &job_type);
                }
            }
        }

        let supported: Vec<((String, String), GroupStats)> = pairs
            .into_iter()
            .filter(|(_, stats)| stats.count >= Self::MIN_PAIR_POSTINGS)
            .collect();
        let ranked = rank(supported, Self::TOP_N, |a, b| b.1.count.cmp(&a.1.count));

        Ok(ranked
            .into_iter()
            .map(|((first, second), stats)| {
                let strength = stats.count as f64 / total as f64;
                RankedResult::new(RelatedQuery::new(RelatedFilter::SkillPair(first.clone(), second.clone())))
                    .with("skill_combination", format!("{} + {}", first, second))
                    .with("correlation_strength", round_to(strength, 3))
                    .with("job_count", stats.count)
                    .with("avg_salary", round2(stats.mean_salary().unwrap_or(0.0)))
                    .with("job_types", stats.top_keys(JOB_TYPES, 3))
                    .scored(stats.count as f64)
            })
            .collect())
    }
}
