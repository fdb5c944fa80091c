use once_cell::sync::Lazy;
use regex::Regex;

use super::text::title_case;
use crate::constants::UNKNOWN;

static HYBRID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)hybrid\s*-\s*([^,()]+)").expect("hybrid pattern should compile"));
static PARENTHESIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)").expect("parenthesized pattern should compile"));

/// Substring to canonical city. Checked in order, first containment wins.
const CITY_ALIASES: [(&str, &str); 25] = [
    ("bengaluru", "Bangalore"),
    ("bangalore", "Bangalore"),
    ("mumbai", "Mumbai"),
    ("pune", "Pune"),
    ("delhi", "Delhi"),
    ("new delhi", "Delhi"),
    ("gurgaon", "Gurgaon"),
    ("gurugram", "Gurgaon"),
    ("hyderabad", "Hyderabad"),
    ("chennai", "Chennai"),
    ("kolkata", "Kolkata"),
    ("ahmedabad", "Ahmedabad"),
    ("noida", "Noida"),
    ("kochi", "Kochi"),
    ("cochin", "Kochi"),
    ("thiruvananthapuram", "Thiruvananthapuram"),
    ("coimbatore", "Coimbatore"),
    ("indore", "Indore"),
    ("jaipur", "Jaipur"),
    ("lucknow", "Lucknow"),
    ("chandigarh", "Chandigarh"),
    ("bhubaneswar", "Bhubaneswar"),
    ("patna", "Patna"),
    ("surat", "Surat"),
    ("vadodara", "Vadodara"),
];

/// Canonical city for a free-text location. Multi-city postings resolve to
/// the first listed city; unmapped places are title-cased.
pub fn normalize_location(text: Option<&str>) -> String {
    let mut location = match text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => t.to_string(),
        None => return UNKNOWN.to_string(),
    };

    if location.to_lowercase().contains("hybrid") {
        if let Some(city) = HYBRID.captures(&location).and_then(|c| c.get(1)) {
            location = city.as_str().trim().to_string();
        }
    }

    if let Some((first, _)) = location.split_once(',') {
        location = first.trim().to_string();
    }

    let location = PARENTHESIZED.replace_all(&location, "").trim().to_string();
    let lowered = location.to_lowercase();
    if let Some((_, city)) = CITY_ALIASES.iter().find(|(alias, _)| lowered.contains(alias)) {
        return city.to_string();
    }

    if location.chars().count() > 2 {
        title_case(&location)
    } else {
        UNKNOWN.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> String {
        normalize_location(Some(s))
    }

    #[test]
    fn hybrid_marker_with_area_detail() {
        assert_eq!(norm("Hybrid - Bengaluru(BTM Layout)"), "Bangalore");
        assert_eq!(norm("hybrid - Pune, Mumbai"), "Pune");
    }

    #[test]
    fn first_listed_city_wins() {
        assert_eq!(norm("Mumbai, Pune"), "Mumbai");
        assert_eq!(norm("Gurugram, Haryana"), "Gurgaon");
    }

    #[test]
    fn aliases_match_by_containment() {
        assert_eq!(norm("New Delhi"), "Delhi");
        assert_eq!(norm("Navi Mumbai"), "Mumbai");
        assert_eq!(norm("Cochin (Ernakulam)"), "Kochi");
    }

    #[test]
    fn unmapped_cities_are_title_cased() {
        assert_eq!(norm("MYSORE"), "Mysore");
        assert_eq!(norm("remote"), "Remote");
    }

    #[test]
    fn empty_or_tiny_is_unknown() {
        assert_eq!(normalize_location(None), "Unknown");
        assert_eq!(norm("   "), "Unknown");
        assert_eq!(norm("NA"), "Unknown");
        assert_eq!(norm("(Remote)"), "Unknown");
    }
}
