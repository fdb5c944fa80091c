use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Columns of a job posting as stored in the posting tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostingField {
    JobId,
    Title,
    Company,
    Location,
    Salary,
    SalaryDetail,
    Experience,
    MinimumExperience,
    MaximumExperience,
    TagsAndSkills,
    JobDescription,
    Openings,
    ApplyCount,
    CreatedAt,
    IsGovt,
    Duration,
    PositionType,
}

impl PostingField {
    pub const ALL: [PostingField; 17] = [
        PostingField::JobId,
        PostingField::Title,
        PostingField::Company,
        PostingField::Location,
        PostingField::Salary,
        PostingField::SalaryDetail,
        PostingField::Experience,
        PostingField::MinimumExperience,
        PostingField::MaximumExperience,
        PostingField::TagsAndSkills,
        PostingField::JobDescription,
        PostingField::Openings,
        PostingField::ApplyCount,
        PostingField::CreatedAt,
        PostingField::IsGovt,
        PostingField::Duration,
        PostingField::PositionType,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            PostingField::JobId => "job_id",
            PostingField::Title => "title",
            PostingField::Company => "company",
            PostingField::Location => "location",
            PostingField::Salary => "salary",
            PostingField::SalaryDetail => "salary_detail",
            PostingField::Experience => "experience",
            PostingField::MinimumExperience => "minimum_experience",
            PostingField::MaximumExperience => "maximum_experience",
            PostingField::TagsAndSkills => "tags_and_skills",
            PostingField::JobDescription => "job_description",
            PostingField::Openings => "openings",
            PostingField::ApplyCount => "apply_count",
            PostingField::CreatedAt => "created_at",
            PostingField::IsGovt => "is_govt",
            PostingField::Duration => "duration",
            PostingField::PositionType => "position_type",
        }
    }
}

/// One job advertisement exactly as ingested.
///
/// Every field is optional free text. Numbers and booleans in the input are
/// kept as their textual form so the normalizers see the same shape whether a
/// posting came from JSON or from a database row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPosting {
    #[serde(default, deserialize_with = "lenient_text")]
    pub job_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub salary: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub salary_detail: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub experience: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub minimum_experience: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub maximum_experience: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub tags_and_skills: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub job_description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub openings: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub apply_count: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub is_govt: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub position_type: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(if b { "1" } else { "0" }.to_string()),
        // salary_detail often arrives as an embedded object
        Some(other) => Some(other.to_string()),
    })
}

impl RawPosting {
    pub fn get(&self, field: PostingField) -> Option<&str> {
        let value = match field {
            PostingField::JobId => &self.job_id,
            PostingField::Title => &self.title,
            PostingField::Company => &self.company,
            PostingField::Location => &self.location,
            PostingField::Salary => &self.salary,
            PostingField::SalaryDetail => &self.salary_detail,
            PostingField::Experience => &self.experience,
            PostingField::MinimumExperience => &self.minimum_experience,
            PostingField::MaximumExperience => &self.maximum_experience,
            PostingField::TagsAndSkills => &self.tags_and_skills,
            PostingField::JobDescription => &self.job_description,
            PostingField::Openings => &self.openings,
            PostingField::ApplyCount => &self.apply_count,
            PostingField::CreatedAt => &self.created_at,
            PostingField::IsGovt => &self.is_govt,
            PostingField::Duration => &self.duration,
            PostingField::PositionType => &self.position_type,
        };
        value.as_deref()
    }

    pub fn set(&mut self, field: PostingField, value: Option<String>) {
        let slot = match field {
            PostingField::JobId => &mut self.job_id,
            PostingField::Title => &mut self.title,
            PostingField::Company => &mut self.company,
            PostingField::Location => &mut self.location,
            PostingField::Salary => &mut self.salary,
            PostingField::SalaryDetail => &mut self.salary_detail,
            PostingField::Experience => &mut self.experience,
            PostingField::MinimumExperience => &mut self.minimum_experience,
            PostingField::MaximumExperience => &mut self.maximum_experience,
            PostingField::TagsAndSkills => &mut self.tags_and_skills,
            PostingField::JobDescription => &mut self.job_description,
            PostingField::Openings => &mut self.openings,
            PostingField::ApplyCount => &mut self.apply_count,
            PostingField::CreatedAt => &mut self.created_at,
            PostingField::IsGovt => &mut self.is_govt,
            PostingField::Duration => &mut self.duration,
            PostingField::PositionType => &mut self.position_type,
        };
        *slot = value;
    }

    /// The field's text when it has non-whitespace content.
    pub fn text(&self, field: PostingField) -> Option<&str> {
        self.get(field).filter(|v| !v.trim().is_empty())
    }

    /// Numeric view of a count-like field; unparseable text is absent.
    pub fn number(&self, field: PostingField) -> Option<f64> {
        self.text(field)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Openings, treating missing or non-positive values as a single opening.
    pub fn openings_or_one(&self) -> i64 {
        match self.number(PostingField::Openings) {
            Some(v) if v >= 1.0 => v as i64,
            _ => 1,
        }
    }

    pub fn apply_count(&self) -> i64 {
        self.number(PostingField::ApplyCount)
            .filter(|v| *v > 0.0)
            .map(|v| v as i64)
            .unwrap_or(0)
    }

    pub fn is_government(&self) -> bool {
        match self.text(PostingField::IsGovt) {
            Some(v) => {
                let v = v.trim().to_lowercase();
                matches!(v.as_str(), "1" | "true" | "yes" | "y")
                    || v.parse::<f64>().map(|n| n == 1.0).unwrap_or(false)
            }
            None => false,
        }
    }

    /// Calendar date of `created_at`, accepting RFC 3339 or any text that
    /// starts with `YYYY-MM-DD`.
    pub fn created_date(&self) -> Option<NaiveDate> {
        let text = self.text(PostingField::CreatedAt)?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.with_timezone(&Utc).date_naive());
        }
        text.get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
    }
}
