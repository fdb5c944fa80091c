// Pure field normalizers: each maps one free-text field to a canonical value
// and never fails.
pub mod category;
pub mod duration;
pub mod experience;
pub mod location;
pub mod salary;
pub mod skills;
pub mod text;

// Re-export the main components
pub use category::{KeywordRule, Taxonomy};
pub use duration::DurationCategory;
pub use experience::{experience_bounds, experience_span, normalize_experience, ExperienceBracket, ExperienceRange};
pub use location::normalize_location;
pub use salary::normalize_salary;
pub use skills::{extract_skills, merge_skills, Delimiters};
pub use text::title_case;
