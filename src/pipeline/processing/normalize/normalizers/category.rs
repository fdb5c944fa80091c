//! Keyword taxonomies that map free-text job titles to category labels.
//!
//! A taxonomy is an ordered rule table. Rules are checked top to bottom
//! against the lower-cased title and the first match decides the label, so
//! more specific rules must precede the general ones they overlap with.

use super::text::{title_case, truncate_chars};
use crate::constants::{OTHER, UNKNOWN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordRule {
    /// At least one of these must occur in the title
    pub any_of: &'static [&'static str],
    /// When non-empty, at least one of these must also occur
    pub also_any_of: &'static [&'static str],
    /// None of these may occur
    pub none_of: &'static [&'static str],
    pub label: &'static str,
}

impl KeywordRule {
    pub const fn new(any_of: &'static [&'static str], label: &'static str) -> Self {
        Self {
            any_of,
            also_any_of: &[],
            none_of: &[],
            label,
        }
    }

    pub const fn requiring(mut self, also_any_of: &'static [&'static str]) -> Self {
        self.also_any_of = also_any_of;
        self
    }

    pub const fn excluding(mut self, none_of: &'static [&'static str]) -> Self {
        self.none_of = none_of;
        self
    }

    pub fn matches(&self, lowered_title: &str) -> bool {
        let any = |words: &[&str]| words.iter().any(|w| lowered_title.contains(w));
        any(self.any_of)
            && (self.also_any_of.is_empty() || any(self.also_any_of))
            && !any(self.none_of)
    }
}

/// Label used when no rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Label(&'static str),
    /// The original title, title-cased and cut to the given number of characters
    TitleCase(usize),
}

#[derive(Debug, Clone, Copy)]
pub struct Taxonomy {
    pub name: &'static str,
    pub rules: &'static [KeywordRule],
    /// Label for a missing or blank title
    pub empty: &'static str,
    pub fallback: Fallback,
}

impl Taxonomy {
    pub fn classify(&self, title: Option<&str>) -> String {
        let title = match title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => t,
            None => return self.empty.to_string(),
        };
        let lowered = title.to_lowercase();
        if let Some(rule) = self.rules.iter().find(|r| r.matches(&lowered)) {
            return rule.label.to_string();
        }
        match self.fallback {
            Fallback::Label(label) => label.to_string(),
            Fallback::TitleCase(max) => truncate_chars(&title_case(title), max),
        }
    }
}

const ENGINEERING: &[&str] = &["engineer", "developer", "programmer"];
const ENGINEER_OR_DEVELOPER: &[&str] = &["engineer", "developer"];
const TITLE_LIMIT: usize = 100;

/// Broad job categories used for location rankings.
pub static JOB_CATEGORY: Taxonomy = Taxonomy {
    name: "job_category",
    rules: &[
        KeywordRule::new(
            &["software engineer", "developer", "programmer", "backend", "frontend"],
            "Software Development",
        ),
        KeywordRule::new(
            &["data engineer", "data scientist", "data analyst"],
            "Data Science & Analytics",
        ),
        KeywordRule::new(&["ai engineer", "ml engineer", "machine learning"], "AI/Machine Learning"),
        KeywordRule::new(&["qa engineer", "test engineer", "quality"], "Quality Assurance"),
        KeywordRule::new(&["manager", "lead", "head", "director"], "Management & Leadership"),
        KeywordRule::new(&["consultant", "advisor"], "Consulting"),
        KeywordRule::new(&["designer", "ui", "ux"], "Design & UX"),
        KeywordRule::new(&["marketing", "sales"], "Marketing & Sales"),
        KeywordRule::new(&["intern", "trainee"], "Internships"),
    ],
    empty: UNKNOWN,
    fallback: Fallback::Label(OTHER),
};

/// Role families for per-role skill rankings.
pub static ROLE_FAMILY: Taxonomy = Taxonomy {
    name: "role_family",
    rules: &[
        KeywordRule::new(ENGINEERING, "Data Engineer/Developer").requiring(&["data"]),
        KeywordRule::new(ENGINEERING, "Software Engineer/Developer")
            .requiring(&["software", "backend", "frontend", "full stack"]),
        KeywordRule::new(ENGINEERING, "AI/ML Engineer").requiring(&["ai", "ml", "machine learning"]),
        KeywordRule::new(ENGINEERING, "QA/Test Engineer").requiring(&["qa", "test"]),
        KeywordRule::new(ENGINEERING, "Engineer/Developer"),
        KeywordRule::new(&["analyst"], "Data Analyst").requiring(&["data"]),
        KeywordRule::new(&["analyst"], "Business Analyst").requiring(&["business"]),
        KeywordRule::new(&["analyst"], "Analyst"),
        KeywordRule::new(&["manager", "lead", "head"], "Management/Leadership"),
        KeywordRule::new(&["scientist"], "Data Scientist"),
        KeywordRule::new(&["intern", "trainee"], "Internship/Trainee"),
        KeywordRule::new(&["consultant", "advisor"], "Consultant/Advisor"),
        KeywordRule::new(&["designer", "ui", "ux"], "Design/UX"),
        KeywordRule::new(&["marketing", "sales"], "Marketing/Sales"),
    ],
    empty: UNKNOWN,
    fallback: Fallback::Label(OTHER),
};

/// Pay grades for salary rankings; seniority is checked before function.
pub static PAY_GRADE: Taxonomy = Taxonomy {
    name: "pay_grade",
    rules: &[
        KeywordRule::new(&["cto", "ceo", "director", "vp", "vice president"], "C-Level/Executive"),
        KeywordRule::new(
            &["senior manager", "senior lead", "principal manager"],
            "Senior Management",
        ),
        KeywordRule::new(&["manager", "lead", "head"], "Management/Lead").excluding(&["assistant"]),
        KeywordRule::new(
            &["senior engineer", "senior developer", "sr engineer", "senior software"],
            "Senior Engineer/Developer",
        ),
        KeywordRule::new(
            &["architect", "principal engineer", "staff engineer"],
            "Architect/Principal Engineer",
        ),
        KeywordRule::new(&["data scientist"], "Data Scientist"),
        KeywordRule::new(
            &["ml engineer", "ai engineer", "machine learning engineer"],
            "AI/ML Engineer",
        ),
        KeywordRule::new(
            &["software engineer", "developer", "programmer"],
            "Software Engineer/Developer",
        )
        .excluding(&["senior"]),
        KeywordRule::new(&["consultant"], "Consultant"),
        KeywordRule::new(&["analyst"], "Data Analyst").requiring(&["data"]),
        KeywordRule::new(&["analyst"], "Business Analyst").requiring(&["business"]),
        KeywordRule::new(&["analyst"], "Analyst"),
        KeywordRule::new(&["intern", "trainee"], "Internship/Trainee"),
    ],
    empty: UNKNOWN,
    fallback: Fallback::TitleCase(TITLE_LIMIT),
};

/// Roles for application-volume rankings.
pub static DEMAND_ROLE: Taxonomy = Taxonomy {
    name: "demand_role",
    rules: &[
        KeywordRule::new(ENGINEERING, "Data Engineer/Developer").requiring(&["data"]),
        KeywordRule::new(ENGINEERING, "Software Engineer/Developer")
            .requiring(&["software", "backend", "frontend"]),
        KeywordRule::new(ENGINEERING, "AI/ML Engineer").requiring(&["ai", "ml"]),
        KeywordRule::new(ENGINEERING, "QA/Test Engineer").requiring(&["qa", "test"]),
        KeywordRule::new(ENGINEERING, "Engineer/Developer"),
        KeywordRule::new(&["analyst"], "Data Analyst").requiring(&["data"]),
        KeywordRule::new(&["analyst"], "Business Analyst"),
        KeywordRule::new(&["manager", "lead"], "Management/Leadership"),
        KeywordRule::new(&["scientist"], "Data Scientist"),
        KeywordRule::new(&["intern", "trainee"], "Internship/Trainee"),
    ],
    empty: UNKNOWN,
    fallback: Fallback::TitleCase(TITLE_LIMIT),
};

/// Roles for applications-per-opening rankings.
pub static COMPETITION_ROLE: Taxonomy = Taxonomy {
    name: "competition_role",
    rules: &[
        KeywordRule::new(ENGINEER_OR_DEVELOPER, "Data Engineer/Developer").requiring(&["data"]),
        KeywordRule::new(ENGINEER_OR_DEVELOPER, "Software Engineer/Developer").requiring(&["software"]),
        KeywordRule::new(ENGINEER_OR_DEVELOPER, "AI/ML Engineer").requiring(&["ai", "ml"]),
        KeywordRule::new(ENGINEER_OR_DEVELOPER, "Engineer/Developer"),
        KeywordRule::new(&["analyst"], "Data Analyst").requiring(&["data"]),
        KeywordRule::new(&["analyst"], "Business Analyst"),
        KeywordRule::new(&["manager"], "Management"),
        KeywordRule::new(&["scientist"], "Data Scientist"),
    ],
    empty: UNKNOWN,
    fallback: Fallback::TitleCase(TITLE_LIMIT),
};

/// Coarse work functions for employer and contract-type breakdowns.
pub static WORK_FUNCTION: Taxonomy = Taxonomy {
    name: "work_function",
    rules: &[
        KeywordRule::new(ENGINEER_OR_DEVELOPER, "Engineering"),
        KeywordRule::new(&["analyst"], "Analytics"),
        KeywordRule::new(&["manager"], "Management"),
    ],
    empty: OTHER,
    fallback: Fallback::Label(OTHER),
};

/// Work functions for the public/private sector comparison.
pub static SECTOR_FUNCTION: Taxonomy = Taxonomy {
    name: "sector_function",
    rules: &[
        KeywordRule::new(ENGINEER_OR_DEVELOPER, "Engineering"),
        KeywordRule::new(&["analyst"], "Analytics"),
        KeywordRule::new(&["manager"], "Management"),
        KeywordRule::new(&["consultant"], "Consulting"),
    ],
    empty: OTHER,
    fallback: Fallback::Label(OTHER),
};

/// Work functions attached to correlated skill pairs.
pub static PAIRING_FUNCTION: Taxonomy = Taxonomy {
    name: "pairing_function",
    rules: &[
        KeywordRule::new(ENGINEER_OR_DEVELOPER, "Engineering"),
        KeywordRule::new(&["analyst"], "Analytics"),
        KeywordRule::new(&["scientist"], "Data Science"),
        KeywordRule::new(&["manager"], "Management"),
    ],
    empty: OTHER,
    fallback: Fallback::Label(OTHER),
};

/// Career tracks for experience requirement trends.
pub static EXPERIENCE_TRACK: Taxonomy = Taxonomy {
    name: "experience_track",
    rules: &[
        KeywordRule::new(&["software engineer", "developer", "programmer"], "Software Development"),
        KeywordRule::new(&["data engineer", "data scientist", "data analyst"], "Data Science"),
        KeywordRule::new(&["ai", "ml", "machine learning"], "AI/Machine Learning"),
        KeywordRule::new(&["product manager", "project manager"], "Product Management"),
        KeywordRule::new(&["qa", "test", "quality"], "Quality Assurance"),
        KeywordRule::new(&["designer", "ui", "ux"], "Design"),
        KeywordRule::new(&["marketing", "sales"], "Marketing/Sales"),
        KeywordRule::new(&["consultant", "analyst"], "Consulting/Analysis"),
    ],
    empty: OTHER,
    fallback: Fallback::Label(OTHER),
};
