use super::text::contains_any;

/// Engagement type derived from the duration and position-type fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationCategory {
    Permanent,
    SixMonthContract,
    ThreeMonthContract,
    OneYearContract,
    Internship,
    OtherContract,
}

impl DurationCategory {
    pub fn label(&self) -> &'static str {
        match self {
            DurationCategory::Permanent => "Permanent",
            DurationCategory::SixMonthContract => "6 Months Contract",
            DurationCategory::ThreeMonthContract => "3 Months Contract",
            DurationCategory::OneYearContract => "1 Year Contract",
            DurationCategory::Internship => "Internship",
            DurationCategory::OtherContract => "Contract (Other)",
        }
    }

    /// Keyword precedence: permanent markers, fixed contract lengths,
    /// internships, then any other contract. Unrecognized text is permanent.
    pub fn classify(duration: Option<&str>, position_type: Option<&str>) -> Self {
        let duration = duration.unwrap_or("").to_lowercase();
        let position = position_type.unwrap_or("").to_lowercase();
        if duration.trim().is_empty() && position.trim().is_empty() {
            return DurationCategory::Permanent;
        }

        if contains_any(&duration, &["permanent", "full time"]) || position.contains("full time") {
            DurationCategory::Permanent
        } else if contains_any(&duration, &["6 months", "6month", "six months"]) {
            DurationCategory::SixMonthContract
        } else if contains_any(&duration, &["3 months", "3month", "three months"]) {
            DurationCategory::ThreeMonthContract
        } else if contains_any(&duration, &["1 year", "12 months", "one year"]) {
            DurationCategory::OneYearContract
        } else if duration.contains("intern") || position.contains("intern") {
            DurationCategory::Internship
        } else if duration.contains("contract") || position.contains("contract") {
            DurationCategory::OtherContract
        } else {
            DurationCategory::Permanent
        }
    }
}
