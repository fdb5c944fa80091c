pub mod normalizers;

use serde::Serialize;

use crate::domain::{PostingField, RawPosting};
use normalizers::{
    extract_skills, merge_skills, normalize_experience, normalize_location, normalize_salary, Delimiters,
    ExperienceRange,
};

/// A posting with its free-text fields resolved to canonical values.
/// The raw record is kept for fields analyses classify on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPosting {
    pub raw: RawPosting,
    /// Annual salary; `None` when undisclosed or unparseable
    pub salary: Option<f64>,
    pub experience: ExperienceRange,
    pub location: String,
    /// Skills listed in the tag field
    pub tag_skills: Vec<String>,
    /// Tag skills followed by any further skills found in the description
    pub skills: Vec<String>,
}

impl NormalizedPosting {
    pub fn title(&self) -> Option<&str> {
        self.raw.text(PostingField::Title)
    }

    pub fn has_salary(&self) -> bool {
        self.salary.map(|s| s > 0.0).unwrap_or(false)
    }
}

/// Trait for turning raw postings into normalized ones
pub trait Normalizer {
    fn normalize(&self, posting: &RawPosting) -> NormalizedPosting;

    fn normalize_batch(&self, postings: &[RawPosting]) -> Vec<NormalizedPosting> {
        postings.iter().map(|p| self.normalize(p)).collect()
    }
}

/// Applies every field normalizer with the standard delimiter rules
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNormalizer;

impl Normalizer for DefaultNormalizer {
    fn normalize(&self, posting: &RawPosting) -> NormalizedPosting {
        let salary = normalize_salary(
            posting.get(PostingField::Salary),
            posting.get(PostingField::SalaryDetail),
        );
        let experience = normalize_experience(
            posting.get(PostingField::MinimumExperience),
            posting.get(PostingField::MaximumExperience),
            posting.get(PostingField::Experience),
        );
        let location = normalize_location(posting.get(PostingField::Location));
        let tag_skills = extract_skills(posting.get(PostingField::TagsAndSkills), Delimiters::Tags);
        let description_skills =
            extract_skills(posting.get(PostingField::JobDescription), Delimiters::FreeText);
        let skills = merge_skills(&tag_skills, &description_skills);

        NormalizedPosting {
            raw: posting.clone(),
            salary,
            experience,
            location,
            tag_skills,
            skills,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_every_field() {
        let raw = RawPosting {
            title: Some("Backend Developer".to_string()),
            salary: Some("10-14 Lacs PA".to_string()),
            experience: Some("3+ years".to_string()),
            location: Some("Hybrid - Bengaluru(Whitefield)".to_string()),
            tags_and_skills: Some("Python, Django, SQL".to_string()),
            job_description: Some("Work with sql daily\nKafka".to_string()),
            ..Default::default()
        };

        let normalized = DefaultNormalizer.normalize(&raw);
        assert_eq!(normalized.salary, Some(1_200_000.0));
        assert_eq!(normalized.experience, ExperienceRange { min: 3.0, max: 8.0 });
        assert_eq!(normalized.location, "Bangalore");
        assert_eq!(normalized.tag_skills, vec!["Python", "Django", "Sql"]);
        assert_eq!(
            normalized.skills,
            vec!["Python", "Django", "Sql", "Work Sql Daily", "Kafka"]
        );
        assert_eq!(normalized.title(), Some("Backend Developer"));
    }

    #[test]
    fn empty_posting_normalizes_to_unknowns() {
        let normalized = DefaultNormalizer.normalize(&RawPosting::default());
        assert_eq!(normalized.salary, None);
        assert_eq!(normalized.experience, ExperienceRange::default());
        assert_eq!(normalized.location, "Unknown");
        assert!(normalized.skills.is_empty());
        assert!(!normalized.has_salary());
    }
}
