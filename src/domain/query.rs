use chrono::NaiveDate;

use super::posting::{PostingField, RawPosting};

/// One filter applied when fetching postings for an analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    NonEmpty(PostingField),
    AnyNonEmpty(Vec<PostingField>),
    Positive(PostingField),
    CreatedOnOrAfter(NaiveDate),
    CreatedBefore(NaiveDate),
}

impl Condition {
    pub fn matches(&self, posting: &RawPosting) -> bool {
        match self {
            Condition::NonEmpty(field) => posting.text(*field).is_some(),
            Condition::AnyNonEmpty(fields) => fields.iter().any(|f| posting.text(*f).is_some()),
            Condition::Positive(field) => posting.number(*field).map(|v| v > 0.0).unwrap_or(false),
            Condition::CreatedOnOrAfter(day) => posting.created_date().map(|d| d >= *day).unwrap_or(false),
            Condition::CreatedBefore(day) => posting.created_date().map(|d| d < *day).unwrap_or(false),
        }
    }

    /// SQL narrowing for this condition. The result is never stricter than
    /// `matches`; date conditions return `None` and are checked in Rust only.
    pub fn sql_predicate(&self) -> Option<String> {
        match self {
            Condition::NonEmpty(field) => Some(non_empty_sql(*field)),
            Condition::AnyNonEmpty(fields) if !fields.is_empty() => Some(format!(
                "({})",
                fields
                    .iter()
                    .map(|f| non_empty_sql(*f))
                    .collect::<Vec<_>>()
                    .join(" OR ")
            )),
            Condition::AnyNonEmpty(_) => None,
            Condition::Positive(field) => Some(format!("CAST({} AS REAL) > 0", field.column())),
            Condition::CreatedOnOrAfter(_) | Condition::CreatedBefore(_) => None,
        }
    }
}

fn non_empty_sql(field: PostingField) -> String {
    format!("({0} IS NOT NULL AND TRIM({0}) != '')", field.column())
}

/// Conjunction of conditions selecting the postings an analysis reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostingQuery {
    pub conditions: Vec<Condition>,
}

impl PostingQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn require(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn matches(&self, posting: &RawPosting) -> bool {
        self.conditions.iter().all(|c| c.matches(posting))
    }

    pub fn sql_where(&self) -> Option<String> {
        let parts: Vec<String> = self.conditions.iter().filter_map(|c| c.sql_predicate()).collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" AND "))
        }
    }
}

/// Which open postings are related to a ranked row.
#[derive(Debug, Clone, PartialEq)]
pub enum RelatedFilter {
    Any,
    TitleContains(String),
    TitleAndLocation { title: String, location: String },
    Company(String),
    Skill(String),
    SkillPair(String, String),
    LocationAndSkill { location: String, skill: String },
    Sector { government: bool },
    EntryLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelatedOrder {
    #[default]
    Stored,
    ApplyCountDesc,
    SalaryDesc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelatedQuery {
    pub filter: RelatedFilter,
    pub order: RelatedOrder,
}

impl RelatedQuery {
    pub fn new(filter: RelatedFilter) -> Self {
        Self {
            filter,
            order: RelatedOrder::Stored,
        }
    }

    pub fn any() -> Self {
        Self::new(RelatedFilter::Any)
    }

    pub fn ordered_by(mut self, order: RelatedOrder) -> Self {
        self.order = order;
        self
    }

    /// Summaries carry application counts when ranked by them
    pub fn includes_counts(&self) -> bool {
        self.order == RelatedOrder::ApplyCountDesc
    }

    pub fn matches(&self, posting: &RawPosting) -> bool {
        match &self.filter {
            RelatedFilter::Any => true,
            RelatedFilter::TitleContains(title) => contains(posting, PostingField::Title, title),
            RelatedFilter::TitleAndLocation { title, location } => {
                contains(posting, PostingField::Title, title)
                    && contains(posting, PostingField::Location, location)
            }
            RelatedFilter::Company(company) => posting
                .text(PostingField::Company)
                .map(|c| c.trim().eq_ignore_ascii_case(company.trim()))
                .unwrap_or(false),
            RelatedFilter::Skill(skill) => mentions_skill(posting, skill),
            RelatedFilter::SkillPair(first, second) => {
                contains(posting, PostingField::TagsAndSkills, first)
                    && contains(posting, PostingField::TagsAndSkills, second)
            }
            RelatedFilter::LocationAndSkill { location, skill } => {
                contains(posting, PostingField::Location, location) && mentions_skill(posting, skill)
            }
            RelatedFilter::Sector { government } => posting.is_government() == *government,
            RelatedFilter::EntryLevel => {
                let no_minimum = match posting.text(PostingField::MinimumExperience) {
                    None => true,
                    Some(v) => v.trim().parse::<f64>().map(|n| n == 0.0).unwrap_or(false),
                };
                no_minimum || contains(posting, PostingField::Experience, "fresher")
            }
        }
    }

    /// SQL narrowing plus bound LIKE patterns. Never stricter than `matches`.
    pub fn sql_where(&self) -> (Option<String>, Vec<String>) {
        let like = |field: PostingField| format!("{} LIKE ? ESCAPE '\\'", field.column());
        match &self.filter {
            RelatedFilter::Any | RelatedFilter::Sector { .. } | RelatedFilter::EntryLevel => (None, vec![]),
            RelatedFilter::TitleContains(title) => (Some(like(PostingField::Title)), vec![like_pattern(title)]),
            RelatedFilter::TitleAndLocation { title, location } => (
                Some(format!("{} AND {}", like(PostingField::Title), like(PostingField::Location))),
                vec![like_pattern(title), like_pattern(location)],
            ),
            RelatedFilter::Company(company) => (
                Some("LOWER(TRIM(company)) = LOWER(?)".to_string()),
                vec![company.trim().to_string()],
            ),
            RelatedFilter::Skill(skill) => (
                Some(format!(
                    "({} OR {})",
                    like(PostingField::TagsAndSkills),
                    like(PostingField::JobDescription)
                )),
                vec![like_pattern(skill), like_pattern(skill)],
            ),
            RelatedFilter::SkillPair(first, second) => (
                Some(format!(
                    "{} AND {}",
                    like(PostingField::TagsAndSkills),
                    like(PostingField::TagsAndSkills)
                )),
                vec![like_pattern(first), like_pattern(second)],
            ),
            RelatedFilter::LocationAndSkill { location, skill } => (
                Some(format!(
                    "{} AND ({} OR {})",
                    like(PostingField::Location),
                    like(PostingField::TagsAndSkills),
                    like(PostingField::JobDescription)
                )),
                vec![like_pattern(location), like_pattern(skill), like_pattern(skill)],
            ),
        }
    }
}

fn contains(posting: &RawPosting, field: PostingField, needle: &str) -> bool {
    posting
        .get(field)
        .map(|value| value.to_ascii_lowercase().contains(&needle.to_ascii_lowercase()))
        .unwrap_or(false)
}

fn mentions_skill(posting: &RawPosting, skill: &str) -> bool {
    contains(posting, PostingField::TagsAndSkills, skill) || contains(posting, PostingField::JobDescription, skill)
}

fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(title: &str, location: &str, tags: &str) -> RawPosting {
        RawPosting {
            title: Some(title.to_string()),
            location: Some(location.to_string()),
            tags_and_skills: Some(tags.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn query_conditions_are_conjunctive() {
        let mut p = posting("Backend Developer", "Pune", "rust, sql");
        p.apply_count = Some("12".to_string());
        p.created_at = Some("2024-06-01".to_string());

        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let query = PostingQuery::all()
            .require(Condition::NonEmpty(PostingField::TagsAndSkills))
            .require(Condition::Positive(PostingField::ApplyCount))
            .require(Condition::CreatedOnOrAfter(day));
        assert!(query.matches(&p));

        p.apply_count = Some("0".to_string());
        assert!(!query.matches(&p));
    }

    #[test]
    fn undated_postings_fall_outside_windows() {
        let p = posting("QA Engineer", "Delhi", "selenium");
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(!Condition::CreatedOnOrAfter(day).matches(&p));
        assert!(!Condition::CreatedBefore(day).matches(&p));
    }

    #[test]
    fn sql_where_skips_date_conditions() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let query = PostingQuery::all()
            .require(Condition::CreatedBefore(day))
            .require(Condition::NonEmpty(PostingField::Title));
        assert_eq!(
            query.sql_where().as_deref(),
            Some("(title IS NOT NULL AND TRIM(title) != '')")
        );
        assert_eq!(PostingQuery::all().sql_where(), None);
    }

    #[test]
    fn related_filters_are_case_insensitive() {
        let p = posting("Senior DATA Engineer", "Bengaluru, Karnataka", "Python, SQL, Spark");
        let query = RelatedQuery::new(RelatedFilter::TitleAndLocation {
            title: "data".to_string(),
            location: "bengaluru".to_string(),
        });
        assert!(query.matches(&p));

        let pair = RelatedQuery::new(RelatedFilter::SkillPair("python".to_string(), "spark".to_string()));
        assert!(pair.matches(&p));

        let missing = RelatedQuery::new(RelatedFilter::Skill("Kotlin".to_string()));
        assert!(!missing.matches(&p));
    }

    #[test]
    fn entry_level_accepts_missing_minimum_or_fresher() {
        let mut p = posting("Trainee", "Pune", "");
        assert!(RelatedQuery::new(RelatedFilter::EntryLevel).matches(&p));

        p.minimum_experience = Some("3".to_string());
        assert!(!RelatedQuery::new(RelatedFilter::EntryLevel).matches(&p));

        p.experience = Some("Freshers welcome".to_string());
        assert!(RelatedQuery::new(RelatedFilter::EntryLevel).matches(&p));
    }

    #[test]
    fn like_patterns_escape_wildcards() {
        assert_eq!(like_pattern("c_sharp%"), "%c\\_sharp\\%%");
    }
}
