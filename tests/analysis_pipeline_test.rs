use std::sync::Arc;

use chrono::NaiveDate;
use job_insights::app::RunAnalysisUseCase;
use job_insights::constants::{ALL_ANALYSES, MAX_RELATED_POSTINGS};
use job_insights::domain::{FieldValue, PostingSummary, RawPosting};
use job_insights::pipeline::analyses::compensation::TopPayingJobs;
use job_insights::pipeline::analyses::employers::GovtVsPrivate;
use job_insights::pipeline::storage::InMemoryStore;
use job_insights::pipeline::{Analysis, AnalysisContext, AnalysisRegistry};

const TITLES: [&str; 4] = ["Data Scientist", "Software Engineer", "Sales Executive", "Accountant"];
const CITIES: [&str; 3] = ["Bengaluru", "Hybrid - Pune", "Mumbai, Thane"];
const SKILLS: [&str; 3] = ["Python, SQL, Machine Learning", "Java, SQL, Spring", "Excel, Tally, GST"];

/// A deterministic mixed batch: several titles, cities, sectors and dates.
fn postings() -> Vec<RawPosting> {
    (0..48)
        .map(|i| RawPosting {
            job_id: Some(i.to_string()),
            title: Some(TITLES[i % TITLES.len()].to_string()),
            company: Some(format!("Company {}", i % 5)),
            location: Some(CITIES[i % CITIES.len()].to_string()),
            salary: Some(format!("{} LPA", 6 + i % 10)),
            minimum_experience: Some((i % 8).to_string()),
            maximum_experience: Some((i % 8 + 3).to_string()),
            tags_and_skills: Some(SKILLS[i % SKILLS.len()].to_string()),
            openings: Some((1 + i % 3).to_string()),
            apply_count: Some((10 * (i + 1)).to_string()),
            created_at: Some(if i % 2 == 0 { "2024-05-01" } else { "2023-09-15" }.to_string()),
            is_govt: Some(if i % 4 == 0 { "1" } else { "0" }.to_string()),
            duration: Some(if i % 6 == 0 { "Contract" } else { "Full Time" }.to_string()),
            ..Default::default()
        })
        .collect()
}

fn ctx() -> AnalysisContext {
    AnalysisContext::new(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap())
}

fn use_case(store: &Arc<InMemoryStore>) -> RunAnalysisUseCase {
    RunAnalysisUseCase::new(store.clone(), store.clone(), store.clone())
}

#[tokio::test]
async fn test_run_all_reports_every_analysis_in_order() {
    let store = Arc::new(InMemoryStore::with_postings(postings()));
    let registry = AnalysisRegistry::builtin();

    let reports = use_case(&store).run_all(&registry, &ctx()).await;
    let names: Vec<_> = reports.iter().map(|r| r.name).collect();
    assert_eq!(names, ALL_ANALYSES.to_vec());

    let stored = store.results("analysis_govt_vs_private").await.unwrap();
    let sectors: Vec<_> = stored.iter().filter_map(|r| r.text("sector")).collect();
    assert_eq!(sectors, vec!["Government", "Private"]);
    assert_eq!(stored[0].get("job_count"), Some(&FieldValue::Int(12)));
}

#[tokio::test]
async fn test_rerun_produces_identical_results() {
    let store = Arc::new(InMemoryStore::with_postings(postings()));
    let registry = AnalysisRegistry::builtin();
    let use_case = use_case(&store);

    use_case.run_all(&registry, &ctx()).await;
    let mut first = Vec::new();
    for analysis in registry.iter() {
        first.push(store.results(analysis.table().table).await);
    }

    use_case.run_all(&registry, &ctx()).await;
    for (analysis, before) in registry.iter().zip(first) {
        assert_eq!(store.results(analysis.table().table).await, before, "{}", analysis.name());
    }
}

#[tokio::test]
async fn test_related_postings_decode_to_at_most_five() {
    let store = Arc::new(InMemoryStore::with_postings(postings()));
    let registry = AnalysisRegistry::builtin();
    use_case(&store).run_all(&registry, &ctx()).await;

    for analysis in registry.iter() {
        let Some(rows) = store.results(analysis.table().table).await else {
            continue;
        };
        for row in rows {
            let json = row.related_jobs_json().unwrap();
            let decoded: Vec<PostingSummary> = serde_json::from_str(&json).unwrap();
            assert!(decoded.len() <= MAX_RELATED_POSTINGS);
        }
    }
}

#[tokio::test]
async fn test_groups_below_minimum_support_are_dropped() {
    // Only two salaried postings for the grade: below the three needed.
    let batch: Vec<RawPosting> = postings().into_iter().filter(|p| p.title.as_deref() == Some("Accountant")).take(2).collect();
    let store = Arc::new(InMemoryStore::with_postings(batch));

    let outcome = use_case(&store).run(&TopPayingJobs, &ctx()).await.unwrap();
    assert_eq!(outcome.stored, 0);
    assert_eq!(store.results("analysis_top_paying_jobs").await, Some(Vec::new()));
}

#[tokio::test]
async fn test_empty_store_fails_and_keeps_previous_results() {
    let store = Arc::new(InMemoryStore::with_postings(postings()));
    use_case(&store).run(&GovtVsPrivate, &ctx()).await.unwrap();

    let empty = Arc::new(InMemoryStore::new());
    let failing = RunAnalysisUseCase::new(empty.clone(), empty.clone(), store.clone());
    assert!(failing.run(&GovtVsPrivate, &ctx()).await.is_err());
    assert_eq!(store.results("analysis_govt_vs_private").await.map(|r| r.len()), Some(2));
}
