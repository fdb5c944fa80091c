use indexmap::IndexMap;

use super::compensation::{SalaryByExperience, TopPayingJobs};
use super::demand::{BestLocationsByJobType, MostCompetitiveJobs, MostDemandedJobs};
use super::employers::{CompanyHiringTrends, GovtVsPrivate, JobDurationAnalysis};
use super::skills::{SkillsCorrelation, SkillsDemandByLocation, TopSkillsByJobType, TrendingSkills};
use super::workforce::{EmergingJobTitles, ExperienceLevelDistribution, ExperienceRequirementsTrends};
use super::Analysis;
use crate::error::{AnalyticsError, Result};

/// Registry of analyses by name, in registration order
pub struct AnalysisRegistry {
    analyses: IndexMap<&'static str, Box<dyn Analysis>>,
}

impl Default for AnalysisRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AnalysisRegistry {
    pub fn empty() -> Self {
        Self {
            analyses: IndexMap::new(),
        }
    }

    /// Registry holding every built-in analysis
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(TopSkillsByJobType));
        registry.register(Box::new(TrendingSkills));
        registry.register(Box::new(TopPayingJobs));
        registry.register(Box::new(MostDemandedJobs));
        registry.register(Box::new(BestLocationsByJobType));
        registry.register(Box::new(ExperienceLevelDistribution));
        registry.register(Box::new(CompanyHiringTrends));
        registry.register(Box::new(SalaryByExperience));
        registry.register(Box::new(GovtVsPrivate));
        registry.register(Box::new(JobDurationAnalysis));
        registry.register(Box::new(SkillsDemandByLocation));
        registry.register(Box::new(MostCompetitiveJobs));
        registry.register(Box::new(EmergingJobTitles));
        registry.register(Box::new(ExperienceRequirementsTrends));
        registry.register(Box::new(SkillsCorrelation));
        registry
    }

    /// Register an analysis under its own name, replacing any previous one
    pub fn register(&mut self, analysis: Box<dyn Analysis>) {
        self.analyses.insert(analysis.name(), analysis);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Analysis> {
        self.analyses.get(name).map(|a| a.as_ref())
    }

    /// Look up an analysis, failing for names that are not registered
    pub fn require(&self, name: &str) -> Result<&dyn Analysis> {
        self.get(name)
            .ok_or_else(|| AnalyticsError::UnknownAnalysis(name.to_string()))
    }

    /// All registered names
    pub fn list(&self) -> Vec<&'static str> {
        self.analyses.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Analysis> {
        self.analyses.values().map(|a| a.as_ref())
    }

    pub fn len(&self) -> usize {
        self.analyses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ALL_ANALYSES;

    #[test]
    fn builtin_registers_all_fifteen_in_order() {
        let registry = AnalysisRegistry::builtin();
        assert_eq!(registry.len(), 15);
        assert_eq!(registry.list(), ALL_ANALYSES.to_vec());
    }

    #[test]
    fn table_names_are_unique_and_prefixed() {
        let registry = AnalysisRegistry::builtin();
        let mut tables: Vec<_> = registry.iter().map(|a| a.table().table).collect();
        assert!(tables.iter().all(|t| t.starts_with("analysis_")));
        tables.sort();
        tables.dedup();
        assert_eq!(tables.len(), 15);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let registry = AnalysisRegistry::builtin();
        assert!(registry.get("top_paying_jobs").is_some());
        assert!(matches!(
            registry.require("nope"),
            Err(AnalyticsError::UnknownAnalysis(name)) if name == "nope"
        ));
    }
}
