//! Group-and-rank building blocks shared by every analysis.
//!
//! Groups live in insertion-ordered maps so that iteration order, and with it
//! every tie-break, depends only on the order postings were read.

use std::cmp::Ordering;
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

use super::normalize::NormalizedPosting;
use crate::domain::PostingField;

/// Occurrence counts keyed by value, in first-seen order.
pub type FrequencyTable = IndexMap<String, usize>;

/// Running totals for one group of postings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupStats {
    pub count: usize,
    pub salaries: Vec<f64>,
    pub companies: IndexSet<String>,
    pub openings: i64,
    pub applications: i64,
    pub tables: IndexMap<&'static str, FrequencyTable>,
}

impl GroupStats {
    /// Fold one posting into the group's count, salary list, companies,
    /// openings and applications.
    pub fn record(&mut self, posting: &NormalizedPosting) {
        self.add(posting.salary);
        if let Some(company) = posting.raw.text(PostingField::Company) {
            self.companies.insert(company.trim().to_string());
        }
        // Counts come from ingested text and may be arbitrarily large
        self.openings = self.openings.saturating_add(posting.raw.openings_or_one());
        self.applications = self.applications.saturating_add(posting.raw.apply_count());
    }

    /// Count one occurrence, keeping the salary when positive.
    pub fn add(&mut self, salary: Option<f64>) {
        self.count += 1;
        if let Some(salary) = salary.filter(|s| *s > 0.0) {
            self.salaries.push(salary);
        }
    }

    pub fn tally(&mut self, table: &'static str, key: &str) {
        *self
            .tables
            .entry(table)
            .or_default()
            .entry(key.to_string())
            .or_insert(0) += 1;
    }

    pub fn table(&self, table: &str) -> Option<&FrequencyTable> {
        self.tables.get(table)
    }

    /// Most frequent keys of a named table.
    pub fn top(&self, table: &str, n: usize) -> Vec<(String, usize)> {
        self.table(table).map(|t| top_frequencies(t, n)).unwrap_or_default()
    }

    pub fn top_keys(&self, table: &str, n: usize) -> Vec<String> {
        self.top(table, n).into_iter().map(|(k, _)| k).collect()
    }

    pub fn mean_salary(&self) -> Option<f64> {
        mean(&self.salaries)
    }

    pub fn median_salary(&self) -> Option<f64> {
        median(&self.salaries)
    }

    pub fn min_salary(&self) -> Option<f64> {
        self.salaries.iter().copied().reduce(f64::min)
    }

    pub fn max_salary(&self) -> Option<f64> {
        self.salaries.iter().copied().reduce(f64::max)
    }
}

/// Accumulator for one grouping key.
pub type Groups<K> = IndexMap<K, GroupStats>;

/// Drop groups below the minimum support.
pub fn retain_supported<K: Hash + Eq>(groups: &mut Groups<K>, min_support: usize) {
    groups.retain(|_, stats| stats.count >= min_support);
}

/// Most common entries; ties keep first-seen order.
pub fn top_frequencies(table: &FrequencyTable, n: usize) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = table.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(n);
    entries
}

/// Stable sort with `compare`, then keep the first `top_n`.
pub fn rank<T, F>(mut items: Vec<T>, top_n: usize, compare: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    items.sort_by(compare);
    items.truncate(top_n);
    items
}

/// Ordering that puts the larger value first.
pub fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Middle value, averaging the two middle values of an even-length list.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Percentage change between two window counts. A group with no history
/// counts as fully new when it has any recent postings.
pub fn growth_rate(older: usize, recent: usize) -> f64 {
    if older == 0 {
        if recent > 0 {
            100.0
        } else {
            0.0
        }
    } else {
        (recent as f64 - older as f64) / older as f64 * 100.0
    }
}

/// Blend of posting volume and pay, with salary measured in lakhs.
pub fn composite_score(count: usize, avg_salary: f64) -> f64 {
    count as f64 * 0.6 + (avg_salary / 100_000.0) * 0.4
}

pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawPosting;
    use crate::pipeline::processing::normalize::{DefaultNormalizer, Normalizer};

    #[test]
    fn growth_from_nothing_is_one_hundred_percent() {
        assert_eq!(growth_rate(0, 5), 100.0);
        assert_eq!(growth_rate(0, 0), 0.0);
        assert_eq!(growth_rate(4, 6), 50.0);
        assert_eq!(growth_rate(10, 5), -50.0);
    }

    #[test]
    fn minimum_support_discards_small_groups() {
        let mut groups: Groups<&str> = Groups::new();
        groups.entry("big").or_default().count = 3;
        groups.entry("small").or_default().count = 2;
        retain_supported(&mut groups, 3);
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec!["big"]);
    }

    #[test]
    fn frequency_ties_keep_first_seen_order() {
        let mut stats = GroupStats::default();
        for skill in ["Sql", "Python", "Sql", "Rust", "Python", "Go"] {
            stats.tally("skills", skill);
        }
        assert_eq!(
            stats.top("skills", 3),
            vec![("Sql".to_string(), 2), ("Python".to_string(), 2), ("Rust".to_string(), 1)]
        );
        assert!(stats.top("missing", 3).is_empty());
    }

    #[test]
    fn rank_is_stable_for_equal_scores() {
        let items = vec![("a", 1.0), ("b", 2.0), ("c", 1.0), ("d", 0.5)];
        let ranked = rank(items, 3, |x, y| descending(x.1, y.1));
        assert_eq!(ranked.iter().map(|i| i.0).collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn median_and_mean() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
    }

    #[test]
    fn record_accumulates_totals() {
        let raw = RawPosting {
            company: Some(" Acme ".to_string()),
            salary: Some("10 LPA".to_string()),
            openings: Some("2".to_string()),
            apply_count: Some("30".to_string()),
            ..Default::default()
        };
        let posting = DefaultNormalizer.normalize(&raw);
        let mut stats = GroupStats::default();
        stats.record(&posting);
        stats.record(&DefaultNormalizer.normalize(&RawPosting::default()));

        assert_eq!(stats.count, 2);
        assert_eq!(stats.salaries, vec![1_000_000.0]);
        assert_eq!(stats.openings, 3);
        assert_eq!(stats.applications, 30);
        assert!(stats.companies.contains("Acme"));
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let raw = RawPosting {
            openings: Some("9e18".to_string()),
            apply_count: Some("9e18".to_string()),
            ..Default::default()
        };
        let posting = DefaultNormalizer.normalize(&raw);
        let mut stats = GroupStats::default();
        stats.record(&posting);
        stats.record(&posting);

        assert_eq!(stats.count, 2);
        assert_eq!(stats.openings, i64::MAX);
        assert_eq!(stats.applications, i64::MAX);
    }

    #[test]
    fn composite_and_rounding() {
        assert_eq!(composite_score(10, 500_000.0), 8.0);
        assert_eq!(round2(12.3456), 12.35);
        assert_eq!(round_to(0.12345, 3), 0.123);
        assert_eq!(percentage(1, 3), 100.0 / 3.0);
        assert_eq!(percentage(1, 0), 0.0);
    }
}
