/// Analysis name constants to ensure consistency between the CLI, the registry and storage.
/// Each analysis owns exactly one output table.

pub const TOP_SKILLS_BY_JOB_TYPE: &str = "top_skills_by_job_type";
pub const TRENDING_SKILLS: &str = "trending_skills_analysis";
pub const TOP_PAYING_JOBS: &str = "top_paying_jobs";
pub const MOST_DEMANDED_JOBS: &str = "most_demanded_jobs";
pub const BEST_LOCATIONS_BY_JOB_TYPE: &str = "best_locations_by_job_type";
pub const EXPERIENCE_LEVEL_DISTRIBUTION: &str = "experience_level_distribution";
pub const COMPANY_HIRING_TRENDS: &str = "company_hiring_trends";
pub const SALARY_BY_EXPERIENCE: &str = "salary_by_experience_trends";
pub const GOVT_VS_PRIVATE: &str = "govt_vs_private_analysis";
pub const JOB_DURATION: &str = "job_duration_analysis";
pub const SKILLS_BY_LOCATION: &str = "skills_demand_by_location";
pub const MOST_COMPETITIVE_JOBS: &str = "most_competitive_jobs";
pub const EMERGING_JOB_TITLES: &str = "emerging_job_titles";
pub const EXPERIENCE_REQUIREMENTS: &str = "experience_requirements_trends";
pub const SKILLS_CORRELATION: &str = "skills_correlation_analysis";

/// Run order used by `run` without `--analysis`
pub const ALL_ANALYSES: [&str; 15] = [
    TOP_SKILLS_BY_JOB_TYPE,
    TRENDING_SKILLS,
    TOP_PAYING_JOBS,
    MOST_DEMANDED_JOBS,
    BEST_LOCATIONS_BY_JOB_TYPE,
    EXPERIENCE_LEVEL_DISTRIBUTION,
    COMPANY_HIRING_TRENDS,
    SALARY_BY_EXPERIENCE,
    GOVT_VS_PRIVATE,
    JOB_DURATION,
    SKILLS_BY_LOCATION,
    MOST_COMPETITIVE_JOBS,
    EMERGING_JOB_TITLES,
    EXPERIENCE_REQUIREMENTS,
    SKILLS_CORRELATION,
];

/// Hard upper bound on related postings per ranked row
pub const MAX_RELATED_POSTINGS: usize = 5;

/// Column holding the serialized related postings in every result table
pub const RELATED_JOBS_COLUMN: &str = "related_jobs";

/// Column holding the write timestamp in every result table
pub const ANALYSIS_DATE_COLUMN: &str = "analysis_date";

pub const UNKNOWN: &str = "Unknown";
pub const OTHER: &str = "Other";
