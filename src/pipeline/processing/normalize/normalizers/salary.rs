use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

const LAKH: f64 = 100_000.0;
const CRORE: f64 = 10_000_000.0;

/// Phrases that mean the employer did not state a figure.
const UNDISCLOSED: [&str; 3] = ["not disclosed", "as per market standards", "unpaid"];

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("salary number pattern should compile"));
static THOUSANDS_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\dk").expect("thousands suffix pattern should compile"));

/// Annual salary in whole currency units, or `None` when it cannot be determined.
///
/// The structured `salary_detail` payload wins when it carries a positive
/// minimum or maximum; otherwise the free text is parsed.
pub fn normalize_salary(salary_text: Option<&str>, salary_detail: Option<&str>) -> Option<f64> {
    if let Some(amount) = salary_detail.and_then(from_detail) {
        return Some(amount);
    }

    let text = salary_text?.trim();
    if text.is_empty() {
        return None;
    }
    let lowered = text.to_lowercase();
    if UNDISCLOSED.contains(&lowered.as_str()) {
        return None;
    }

    let compact: String = lowered.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    let numbers: Vec<f64> = NUMBER
        .find_iter(&compact)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect();
    let first = *numbers.first()?;

    let is_range = compact.contains('-') || compact.contains("to");
    let value = if numbers.len() >= 2 && is_range {
        (first + numbers[1]) / 2.0
    } else {
        first
    };

    Some(apply_unit(value, &compact))
}

fn from_detail(detail: &str) -> Option<f64> {
    let parsed: Value = serde_json::from_str(detail).ok()?;
    let min = parsed.get("minimumSalary").and_then(Value::as_f64).unwrap_or(0.0);
    let max = parsed.get("maximumSalary").and_then(Value::as_f64).unwrap_or(0.0);
    match (min > 0.0, max > 0.0) {
        (true, true) => Some((min + max) / 2.0),
        (true, false) => Some(min),
        (false, true) => Some(max),
        (false, false) => None,
    }
}

/// First matching unit marker wins. `compact` has separators and whitespace
/// removed, so multi-word markers appear joined ("perannum", "permonth").
fn apply_unit(value: f64, compact: &str) -> f64 {
    if ["lpa", "perannum", "pa", "annually"].iter().any(|u| compact.contains(u)) {
        value * LAKH
    } else if compact.contains("crore") {
        value * CRORE
    } else if compact.contains("lakh") || compact.contains("lac") {
        value * LAKH
    } else if compact.contains("/month") || compact.contains("permonth") {
        value * 12.0
    } else if THOUSANDS_SUFFIX.is_match(compact) && value < 1000.0 {
        value * 1000.0
    } else if value > 100_000.0 {
        value
    } else if value > 1000.0 {
        value * 1000.0
    } else {
        value * LAKH
    }
}
