//! Unit tests for whole-author runs

use super::*;
use crate::test_fixtures::FakeRegistry;
use modstat_cache::MemoStore;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

async fn mount_author(registry: &FakeRegistry, author: &str, packages: &[&str]) {
    let objects: Vec<_> = packages
        .iter()
        .map(|name| serde_json::json!({ "package": { "name": name } }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/-/v1/search"))
        .and(query_param("text", format!("author:{}", author)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "objects": objects,
            "total": packages.len()
        })))
        .mount(&registry.server)
        .await;
}

#[tokio::test]
async fn test_author_summary_end_to_end() {
    let registry = FakeRegistry::start().await;
    mount_author(&registry, "acme", &["a", "b"]).await;
    registry.publish("a", &[("1.0.0", 100, Some("module"))]).await;
    registry.publish("b", &[("2.0.0", 50, None)]).await;

    let report = Summarizer::new(registry.analyzer())
        .summarize("acme")
        .await
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.processed, 2);

    let summary = &report.summary;
    assert_eq!(summary.author_name, "acme");
    assert_eq!(summary.total_packages, 2);
    assert_eq!(summary.total_versions, 2);
    assert_eq!(summary.total_downloads, 150);
    assert_eq!(summary.total_esm, 100);
    assert_eq!(summary.total_cjs, 50);
    assert!((summary.percent_esm - 66.67).abs() < 0.01);
    assert_eq!(summary.top_esm[0].package_name, "a");
    assert_eq!(summary.top_cjs[0].package_name, "b");
}

#[tokio::test]
async fn test_packages_without_downloads_are_counted_but_excluded() {
    let registry = FakeRegistry::start().await;
    registry.publish("live", &[("1.0.0", 10, None)]).await;
    registry.publish_metadata("dead", &[("1.0.0", 0, None)], &[]).await;

    let report = Summarizer::new(registry.analyzer())
        .summarize_packages("acme", vec!["live".to_string(), "dead".to_string()])
        .await
        .unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.summary.total_packages, 1);
    assert_eq!(report.summary.packages[0].package_name, "live");
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn test_failing_package_does_not_stop_the_run() {
    let registry = FakeRegistry::start().await;
    registry.publish("a", &[("1.0.0", 5, Some("module"))]).await;
    registry.publish("c", &[("1.0.0", 7, None)]).await;

    let report = Summarizer::new(registry.analyzer())
        .with_concurrency(2)
        .summarize_packages(
            "acme",
            vec!["a".to_string(), "gone".to_string(), "c".to_string()],
        )
        .await
        .unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.processed, 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].package_name, "gone");
    assert!(report.failures[0].error.contains("404"));

    let names: Vec<_> = report
        .summary
        .packages
        .iter()
        .map(|p| p.package_name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "c"]);
    assert_eq!(report.summary.total_downloads, 12);
}

#[tokio::test]
async fn test_author_package_list_is_cached() {
    let registry = FakeRegistry::start().await;
    mount_author(&registry, "acme", &["a", "@acme/b"]).await;

    let summarizer = Summarizer::new(registry.analyzer());
    let first = summarizer.get_packages("acme").await.unwrap();
    assert_eq!(first, vec!["a", "@acme/b"]);
    let requests = registry.request_count().await;

    let second = Summarizer::new(registry.analyzer())
        .get_packages("acme")
        .await
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(registry.request_count().await, requests);

    let store = MemoStore::new(registry.cache_root());
    assert!(store.contains("packages-by-author/acme.json").await.unwrap());
}

#[tokio::test]
async fn test_empty_author() {
    let registry = FakeRegistry::start().await;
    mount_author(&registry, "nobody", &[]).await;

    let report = Summarizer::new(registry.analyzer())
        .summarize("nobody")
        .await
        .unwrap();

    assert_eq!(report.processed, 0);
    assert_eq!(report.summary.total_packages, 0);
    assert!(report.summary.percent_esm.is_nan());
}
