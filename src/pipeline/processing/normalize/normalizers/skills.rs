use std::collections::HashSet;

use super::text::{title_case, truncate_chars};

const STOPWORDS: [&str; 10] = ["and", "or", "with", "in", "of", "for", "to", "the", "a", "an"];
const MAX_SKILL_CHARS: usize = 100;
const MAX_SKILL_WORDS: usize = 5;

/// Token separators for skill extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiters {
    /// `,` `;` `|` as used in tag lists
    Tags,
    /// Tag separators plus line breaks and tabs, for descriptions
    FreeText,
}

impl Delimiters {
    fn is_separator(&self, c: char) -> bool {
        match self {
            Delimiters::Tags => matches!(c, ',' | ';' | '|'),
            Delimiters::FreeText => matches!(c, ',' | ';' | '|' | '\n' | '\r' | '\t'),
        }
    }
}

/// Split a skill list into distinct, title-cased skills in first-seen order.
pub fn extract_skills(text: Option<&str>, delimiters: Delimiters) -> Vec<String> {
    let text = match text {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Vec::new(),
    };

    let mut seen = HashSet::new();
    let mut skills = Vec::new();
    for token in text.split(|c| delimiters.is_separator(c)) {
        if let Some(skill) = clean_token(token) {
            if seen.insert(skill.to_lowercase()) {
                skills.push(skill);
            }
        }
    }
    skills
}

fn clean_token(token: &str) -> Option<String> {
    let token = token.trim();
    if token.chars().count() <= 1 {
        return None;
    }

    let words: Vec<&str> = token
        .split_whitespace()
        .filter(|w| !STOPWORDS.contains(&w.to_lowercase().as_str()))
        .collect();
    let mut cleaned = words.join(" ");
    if cleaned.chars().count() > MAX_SKILL_CHARS {
        cleaned = format!("{}...", truncate_chars(&cleaned, MAX_SKILL_CHARS));
    }

    let word_count = cleaned.split_whitespace().count();
    if cleaned.chars().count() > 2 && word_count <= MAX_SKILL_WORDS {
        Some(title_case(&cleaned))
    } else {
        None
    }
}

/// Concatenate two skill sets, keeping the first spelling of each skill.
pub fn merge_skills(primary: &[String], secondary: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    primary
        .iter()
        .chain(secondary.iter())
        .filter(|s| seen.insert(s.to_lowercase()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_tags_and_title_cases() {
        let skills = extract_skills(Some("python, Java ; react|node.js"), Delimiters::Tags);
        assert_eq!(skills, vec!["Python", "Java", "React", "Node.Js"]);
    }

    #[test]
    fn dedupes_case_insensitively_keeping_first() {
        let skills = extract_skills(Some("SQL, sql, Sql, Spark"), Delimiters::Tags);
        assert_eq!(skills, vec!["Sql", "Spark"]);
    }

    #[test]
    fn drops_noise_and_long_phrases() {
        let skills = extract_skills(
            Some("a, Go, the, design and build of distributed systems at scale, AWS"),
            Delimiters::Tags,
        );
        assert_eq!(skills, vec!["Aws"]);
    }

    #[test]
    fn stopwords_are_removed_word_wise() {
        let skills = extract_skills(Some("Machine learning and AI"), Delimiters::Tags);
        assert_eq!(skills, vec!["Machine Learning Ai"]);
    }

    #[test]
    fn free_text_splits_lines() {
        let text = "Kubernetes\nDocker\tTerraform";
        assert_eq!(
            extract_skills(Some(text), Delimiters::Tags),
            vec!["Kubernetes Docker Terraform"]
        );
        assert_eq!(
            extract_skills(Some(text), Delimiters::FreeText),
            vec!["Kubernetes", "Docker", "Terraform"]
        );
    }

    #[test]
    fn overlong_tokens_are_truncated_then_filtered_by_word_count() {
        let long = "x".repeat(150);
        let skills = extract_skills(Some(&long), Delimiters::Tags);
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].chars().count(), 103);
        assert!(skills[0].ends_with("..."));
    }

    #[test]
    fn merge_keeps_first_spelling() {
        let merged = merge_skills(
            &["Python".to_string(), "Sql".to_string()],
            &["SQL".to_string(), "Airflow".to_string()],
        );
        assert_eq!(merged, vec!["Python", "Sql", "Airflow"]);
    }

    #[test]
    fn empty_input() {
        assert!(extract_skills(None, Delimiters::Tags).is_empty());
        assert!(extract_skills(Some("  "), Delimiters::FreeText).is_empty());
    }
}
