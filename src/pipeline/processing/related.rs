use std::cmp::Ordering;

use super::normalize::normalizers::normalize_salary;
use crate::constants::MAX_RELATED_POSTINGS;
use crate::domain::{PostingField, PostingSummary, RawPosting, RelatedOrder, RelatedQuery};

/// Pick up to `limit` open postings matching `query`, in the query's order.
/// Candidates are expected in storage order; equal keys keep that order.
pub fn select_related<'a, I>(candidates: I, query: &RelatedQuery, limit: usize) -> Vec<PostingSummary>
where
    I: IntoIterator<Item = &'a RawPosting>,
{
    let limit = limit.min(MAX_RELATED_POSTINGS);
    let matching = candidates.into_iter().filter(|p| query.matches(p));

    let picked: Vec<&RawPosting> = match query.order {
        RelatedOrder::Stored => matching.take(limit).collect(),
        RelatedOrder::ApplyCountDesc => {
            let mut all: Vec<&RawPosting> = matching.collect();
            all.sort_by(|a, b| b.apply_count().cmp(&a.apply_count()));
            all.into_iter().take(limit).collect()
        }
        RelatedOrder::SalaryDesc => {
            let mut all: Vec<(&RawPosting, Option<f64>)> = matching
                .map(|p| {
                    let salary = normalize_salary(p.get(PostingField::Salary), p.get(PostingField::SalaryDetail));
                    (p, salary)
                })
                .collect();
            all.sort_by(|a, b| salary_desc(a.1, b.1));
            all.into_iter().take(limit).map(|(p, _)| p).collect()
        }
    };

    let with_counts = query.includes_counts();
    picked
        .into_iter()
        .map(|p| PostingSummary::from_posting(p, with_counts))
        .collect()
}

/// Known salaries first, highest first.
fn salary_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RelatedFilter;

    fn posting(id: &str, title: &str, salary: &str, applies: &str) -> RawPosting {
        RawPosting {
            job_id: Some(id.to_string()),
            title: Some(title.to_string()),
            salary: Some(salary.to_string()),
            apply_count: Some(applies.to_string()),
            ..Default::default()
        }
    }

    fn pool() -> Vec<RawPosting> {
        vec![
            posting("1", "Data Engineer", "8 LPA", "10"),
            posting("2", "Data Analyst", "Not disclosed", "90"),
            posting("3", "Data Scientist", "20 LPA", "40"),
            posting("4", "Chef", "3 LPA", "500"),
        ]
    }

    #[test]
    fn never_more_than_five() {
        let many: Vec<RawPosting> = (0..12).map(|i| posting(&i.to_string(), "Dev", "", "0")).collect();
        let picked = select_related(&many, &RelatedQuery::any(), 50);
        assert_eq!(picked.len(), 5);
        assert_eq!(picked[0].job_id.as_deref(), Some("0"));
    }

    #[test]
    fn orders_by_salary_with_unknown_last() {
        let pool = pool();
        let query = RelatedQuery::new(RelatedFilter::TitleContains("data".to_string()))
            .ordered_by(RelatedOrder::SalaryDesc);
        let ids: Vec<_> = select_related(&pool, &query, 5)
            .into_iter()
            .filter_map(|s| s.job_id)
            .collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn orders_by_applications_and_includes_counts() {
        let pool = pool();
        let query = RelatedQuery::new(RelatedFilter::TitleContains("data".to_string()))
            .ordered_by(RelatedOrder::ApplyCountDesc);
        let picked = select_related(&pool, &query, 2);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].job_id.as_deref(), Some("2"));
        assert_eq!(picked[0].apply_count, Some(90));
        assert_eq!(picked[1].apply_count, Some(40));
    }

    #[test]
    fn summaries_round_trip_through_json() {
        let pool = pool();
        let picked = select_related(&pool, &RelatedQuery::any(), 5);
        let json = serde_json::to_string(&picked).unwrap();
        let decoded: Vec<PostingSummary> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, picked);
        assert!(decoded.len() <= 5);
    }
}
