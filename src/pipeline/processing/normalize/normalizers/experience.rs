use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Years added to the lower bound of an open-ended requirement such as "3+".
const OPEN_ENDED_SPAN: f64 = 5.0;

static OPEN_ENDED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\+").expect("open-ended pattern should compile"));
static DASH_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)-(\d+(?:\.\d+)?)").expect("dash range pattern should compile")
});
static WORDED_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(?:to|-)\s*(\d+(?:\.\d+)?)")
        .expect("worded range pattern should compile")
});
static SINGLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)").expect("single number pattern should compile"));

/// Required experience in years. `min` and `max` are non-negative and `max >= min`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ExperienceRange {
    pub min: f64,
    pub max: f64,
}

impl ExperienceRange {
    pub fn new(min: f64, max: f64) -> Self {
        let min = min.max(0.0);
        Self { min, max: max.max(min) }
    }
}

fn parse_years(value: Option<&str>) -> Option<f64> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Resolve an experience range from the numeric columns, falling back to the
/// free-text requirement when either bound is missing or zero.
pub fn normalize_experience(
    min_exp: Option<&str>,
    max_exp: Option<&str>,
    exp_text: Option<&str>,
) -> ExperienceRange {
    let min = parse_years(min_exp).unwrap_or(0.0);
    let max = parse_years(max_exp).unwrap_or(0.0);
    if min > 0.0 && max > 0.0 {
        return ExperienceRange::new(min, max);
    }

    match exp_text.and_then(|t| from_text(&t.to_lowercase())) {
        Some(range) => range,
        None => ExperienceRange::new(min, max),
    }
}

fn from_text(text: &str) -> Option<ExperienceRange> {
    let number = |caps: &regex::Captures, i: usize| caps.get(i).and_then(|m| m.as_str().parse::<f64>().ok());

    if let Some(caps) = OPEN_ENDED.captures(text) {
        let n = number(&caps, 1)?;
        return Some(ExperienceRange::new(n, n + OPEN_ENDED_SPAN));
    }
    for pattern in [&*DASH_RANGE, &*WORDED_RANGE] {
        if let Some(caps) = pattern.captures(text) {
            return Some(ExperienceRange::new(number(&caps, 1)?, number(&caps, 2)?));
        }
    }
    let caps = SINGLE.captures(text)?;
    let n = number(&caps, 1)?;
    if text.contains('+') {
        Some(ExperienceRange::new(n, n + OPEN_ENDED_SPAN))
    } else {
        Some(ExperienceRange::new(n, n))
    }
}

/// Seniority bracket used by the experience distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExperienceBracket {
    Entry,
    Junior,
    Mid,
    Senior,
    Expert,
    Unknown,
}

impl ExperienceBracket {
    pub const RANKED: [ExperienceBracket; 5] = [
        ExperienceBracket::Entry,
        ExperienceBracket::Junior,
        ExperienceBracket::Mid,
        ExperienceBracket::Senior,
        ExperienceBracket::Expert,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ExperienceBracket::Entry => "Entry Level (0-1 years)",
            ExperienceBracket::Junior => "Junior Level (1-3 years)",
            ExperienceBracket::Mid => "Mid Level (3-7 years)",
            ExperienceBracket::Senior => "Senior Level (7-12 years)",
            ExperienceBracket::Expert => "Expert Level (12+ years)",
            ExperienceBracket::Unknown => "Unknown",
        }
    }

    /// Thresholds apply to both bounds at once. A present but non-numeric
    /// bound switches to keyword matching on the free text.
    pub fn classify(min_exp: Option<&str>, max_exp: Option<&str>, exp_text: Option<&str>) -> Self {
        match experience_bounds(min_exp, max_exp) {
            Some((min, max)) => Self::from_bounds(min, max),
            None => Self::from_text(exp_text),
        }
    }

    pub fn from_bounds(min: f64, max: f64) -> Self {
        if min == 0.0 && max <= 1.0 {
            ExperienceBracket::Entry
        } else if min <= 2.0 && max <= 3.0 {
            ExperienceBracket::Junior
        } else if min <= 4.0 && max <= 7.0 {
            ExperienceBracket::Mid
        } else if min <= 8.0 && max <= 12.0 {
            ExperienceBracket::Senior
        } else {
            ExperienceBracket::Expert
        }
    }

    fn from_text(exp_text: Option<&str>) -> Self {
        let text = match exp_text.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => t.to_lowercase(),
            None => return ExperienceBracket::Unknown,
        };
        let has_any = |digits: &[char]| text.chars().any(|c| digits.contains(&c));
        if text.contains("fresher") || has_any(&['0']) {
            ExperienceBracket::Entry
        } else if has_any(&['1', '2', '3']) {
            ExperienceBracket::Junior
        } else if has_any(&['4', '5', '6', '7']) {
            ExperienceBracket::Mid
        } else {
            ExperienceBracket::Senior
        }
    }
}

/// Missing minimum counts as zero and missing maximum as the minimum.
/// Returns `None` when a present bound is not a number.
pub fn experience_bounds(min_exp: Option<&str>, max_exp: Option<&str>) -> Option<(f64, f64)> {
    fn present(v: Option<&str>) -> Option<&str> {
        v.map(str::trim).filter(|v| !v.is_empty())
    }

    let min = match present(min_exp) {
        Some(v) => v.parse::<f64>().ok().filter(|v| v.is_finite())?,
        None => 0.0,
    };
    let max = match present(max_exp) {
        Some(v) => v.parse::<f64>().ok().filter(|v| v.is_finite())?,
        None => min,
    };
    Some((min, max))
}

/// Span buckets for the salary-by-experience curve, in ascending order.
pub const EXPERIENCE_SPANS: [&str; 6] = [
    "0-1 years",
    "2-3 years",
    "4-5 years",
    "6-8 years",
    "9-12 years",
    "12+ years",
];

/// Bucket the midpoint of the numeric bounds; `None` when a bound is not a number.
pub fn experience_span(min_exp: Option<&str>, max_exp: Option<&str>) -> Option<&'static str> {
    let (min, max) = experience_bounds(min_exp, max_exp)?;
    let midpoint = (min + max) / 2.0;
    let index = if midpoint <= 1.0 {
        0
    } else if midpoint <= 3.0 {
        1
    } else if midpoint <= 5.0 {
        2
    } else if midpoint <= 8.0 {
        3
    } else if midpoint <= 12.0 {
        4
    } else {
        5
    };
    Some(EXPERIENCE_SPANS[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_bounds_win_when_both_positive() {
        let range = normalize_experience(Some("2"), Some("5"), Some("10+ years"));
        assert_eq!(range, ExperienceRange { min: 2.0, max: 5.0 });
    }

    #[test]
    fn open_ended_adds_five_years() {
        let range = normalize_experience(None, None, Some("3+ years"));
        assert_eq!(range, ExperienceRange { min: 3.0, max: 8.0 });
    }

    #[test]
    fn text_ranges() {
        assert_eq!(
            normalize_experience(None, None, Some("2-5 Yrs")),
            ExperienceRange { min: 2.0, max: 5.0 }
        );
        assert_eq!(
            normalize_experience(Some("0"), None, Some("4 to 6 years")),
            ExperienceRange { min: 4.0, max: 6.0 }
        );
        assert_eq!(
            normalize_experience(None, None, Some("7 years")),
            ExperienceRange { min: 7.0, max: 7.0 }
        );
    }

    #[test]
    fn no_text_keeps_partial_numbers() {
        assert_eq!(normalize_experience(Some("3"), None, None), ExperienceRange { min: 3.0, max: 3.0 });
        assert_eq!(normalize_experience(Some("abc"), Some("x"), Some("fresher")), ExperienceRange::default());
    }

    #[test]
    fn max_never_below_min() {
        let range = normalize_experience(None, None, Some("8-3 years"));
        assert!(range.max >= range.min);
    }

    #[test]
    fn brackets_follow_conjunctive_thresholds() {
        assert_eq!(ExperienceBracket::classify(Some("0"), Some("1"), None), ExperienceBracket::Entry);
        assert_eq!(ExperienceBracket::classify(None, None, None), ExperienceBracket::Entry);
        assert_eq!(ExperienceBracket::classify(Some("1"), Some("3"), None), ExperienceBracket::Junior);
        assert_eq!(ExperienceBracket::classify(Some("3"), Some("6"), None), ExperienceBracket::Mid);
        assert_eq!(ExperienceBracket::classify(Some("8"), Some("12"), None), ExperienceBracket::Senior);
        assert_eq!(ExperienceBracket::classify(Some("2"), Some("15"), None), ExperienceBracket::Expert);
    }

    #[test]
    fn brackets_fall_back_to_text_keywords() {
        assert_eq!(ExperienceBracket::classify(Some("n/a"), None, Some("Fresher")), ExperienceBracket::Entry);
        assert_eq!(ExperienceBracket::classify(Some("n/a"), None, Some("2 yrs")), ExperienceBracket::Junior);
        assert_eq!(ExperienceBracket::classify(Some("n/a"), None, Some("5 yrs")), ExperienceBracket::Mid);
        assert_eq!(ExperienceBracket::classify(Some("n/a"), None, Some("lots")), ExperienceBracket::Senior);
        assert_eq!(ExperienceBracket::classify(Some("n/a"), None, None), ExperienceBracket::Unknown);
    }

    #[test]
    fn spans_bucket_the_midpoint() {
        assert_eq!(experience_span(Some("0"), Some("2")), Some("0-1 years"));
        assert_eq!(experience_span(Some("2"), Some("4")), Some("2-3 years"));
        assert_eq!(experience_span(Some("10"), None), Some("9-12 years"));
        assert_eq!(experience_span(Some("15"), Some("20")), Some("12+ years"));
        assert_eq!(experience_span(Some("senior"), None), None);
    }
}
