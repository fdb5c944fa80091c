use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::posting::{PostingField, RawPosting};
use super::query::RelatedQuery;

/// Storage type of an output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
    /// A list of strings, stored as a JSON array
    Json,
}

impl ColumnKind {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Real => "REAL",
            ColumnKind::Text | ColumnKind::Json => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn int(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Integer }
    }

    pub const fn real(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Real }
    }

    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Text }
    }

    pub const fn json(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Json }
    }
}

/// Output table owned by one analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultTable {
    pub analysis: &'static str,
    pub table: &'static str,
    pub columns: &'static [Column],
}

/// A single value in a ranked row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
    Null,
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<usize> for FieldValue {
    fn from(v: usize) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(v: Option<f64>) -> Self {
        v.map(FieldValue::Float).unwrap_or(FieldValue::Null)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(v: Vec<String>) -> Self {
        FieldValue::List(v)
    }
}

/// Compact description of an open posting attached to a ranked row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingSummary {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openings: Option<i64>,
}

impl PostingSummary {
    pub fn from_posting(posting: &RawPosting, with_counts: bool) -> Self {
        Self {
            title: posting.title.clone(),
            company: posting.company.clone(),
            location: posting.location.clone(),
            salary: posting.salary.clone(),
            job_id: posting.job_id.clone(),
            apply_count: with_counts.then(|| posting.apply_count()),
            openings: with_counts.then(|| {
                posting
                    .number(PostingField::Openings)
                    .map(|v| v as i64)
                    .unwrap_or(1)
            }),
        }
    }
}

/// One output row of an analysis: ordered fields in column order, the score
/// it was ranked by, and the related open postings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub fields: IndexMap<&'static str, FieldValue>,
    pub score: f64,
    #[serde(skip)]
    pub related: RelatedQuery,
    pub related_postings: Vec<PostingSummary>,
}

impl RankedResult {
    pub fn new(related: RelatedQuery) -> Self {
        Self {
            fields: IndexMap::new(),
            score: 0.0,
            related,
            related_postings: Vec::new(),
        }
    }

    pub fn with(mut self, name: &'static str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name, value.into());
        self
    }

    pub fn scored(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn related_jobs_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.related_postings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_keep_insertion_order() {
        let row = RankedResult::new(RelatedQuery::any())
            .with("job_type", "Software Development")
            .with("job_count", 12usize)
            .with("avg_salary", Some(1_250_000.0))
            .with("top_skills", vec!["Rust".to_string()]);

        let names: Vec<&str> = row.fields.keys().copied().collect();
        assert_eq!(names, vec!["job_type", "job_count", "avg_salary", "top_skills"]);
        assert_eq!(row.text("job_type"), Some("Software Development"));
    }

    #[test]
    fn summary_counts_only_when_requested() {
        let posting = RawPosting {
            title: Some("Analyst".to_string()),
            apply_count: Some("40".to_string()),
            ..Default::default()
        };

        let plain = serde_json::to_value(PostingSummary::from_posting(&posting, false)).unwrap();
        assert!(plain.get("apply_count").is_none());

        let counted = PostingSummary::from_posting(&posting, true);
        assert_eq!(counted.apply_count, Some(40));
        assert_eq!(counted.openings, Some(1));
    }
}
