use std::fs;
use std::path::Path;

use tracing::debug;

use crate::domain::RawPosting;
use crate::error::{AnalyticsError, Result};

/// Read postings from a JSON array or JSON-lines file.
pub fn read_postings(path: &Path) -> Result<Vec<RawPosting>> {
    let content = fs::read_to_string(path)?;
    let postings = parse_postings(&content)?;
    debug!("Read {} postings from {}", postings.len(), path.display());
    Ok(postings)
}

/// Parse a JSON array of postings, or one posting object per line.
/// Blank lines in JSON-lines input are skipped.
pub fn parse_postings(content: &str) -> Result<Vec<RawPosting>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    let mut postings = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let posting = serde_json::from_str(line).map_err(|source| AnalyticsError::InvalidPosting {
            line: index + 1,
            source,
        })?;
        postings.push(posting);
    }
    Ok(postings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array_with_numeric_fields() {
        let postings = parse_postings(
            r#"[{"title": "Developer", "apply_count": 42, "is_govt": true}, {"company": "Acme"}]"#,
        )
        .unwrap();
        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].apply_count.as_deref(), Some("42"));
        assert_eq!(postings[0].is_govt.as_deref(), Some("1"));
        assert_eq!(postings[1].company.as_deref(), Some("Acme"));
    }

    #[test]
    fn parses_json_lines_skipping_blanks() {
        let postings = parse_postings("{\"title\": \"A\"}\n\n{\"title\": \"B\"}\n").unwrap();
        let titles: Vec<_> = postings.iter().filter_map(|p| p.title.as_deref()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn reports_the_bad_line() {
        let err = parse_postings("{\"title\": \"A\"}\nnot json\n").unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidPosting { line: 2, .. }));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(parse_postings("").unwrap().is_empty());
    }
}
