//! JSON-lines store tests.

use std::path::PathBuf;

use research_advisor::error::AppError;
use research_advisor::models::{Paper, Source};
use research_advisor::store::{JsonlStore, PaperStore, StoredPaper};

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("research-advisor-{}", uuid::Uuid::new_v4()))
        .join(name)
}

fn papers() -> Vec<Paper> {
    vec![
        Paper::new("Drone Imaging", Source::Arxiv)
            .with_authors(vec!["Jane Doe".to_string()])
            .with_url("http://arxiv.org/abs/1"),
        Paper::new("Soil Carbon", Source::Crossref).with_doi(Some("10.1/soil".to_string())),
    ]
}

#[tokio::test]
async fn test_store_appends_json_lines() {
    let path = scratch_path("papers.jsonl");
    let store = JsonlStore::new(&path);

    assert_eq!(store.store(&papers()).await.unwrap(), 2);
    assert_eq!(store.store(&papers()[..1]).await.unwrap(), 1);

    let contents = tokio::fs::read_to_string(&path).await.unwrap();
    let records: Vec<StoredPaper> =
        contents.lines().map(|line| serde_json::from_str(line).unwrap()).collect();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].paper, papers()[0]);
    assert_eq!(records[1].paper.doi.as_deref(), Some("10.1/soil"));

    // One capture id per batch.
    assert_eq!(records[0].capture_id, records[1].capture_id);
    assert_ne!(records[0].capture_id, records[2].capture_id);

    let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
}

#[tokio::test]
async fn test_store_empty_batch_writes_nothing() {
    let path = scratch_path("empty.jsonl");
    let store = JsonlStore::new(&path);

    assert_eq!(store.store(&[]).await.unwrap(), 0);
    assert!(!path.exists());
    assert_eq!(store.path(), path.as_path());
}

#[tokio::test]
async fn test_store_write_failure_is_store_error() {
    // The target is a directory, so opening it for append fails.
    let dir = scratch_path("not-a-file");
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let store = JsonlStore::new(&dir);

    let err = store.store(&papers()).await.unwrap_err();
    assert!(matches!(err, AppError::Store(_)));
    assert!(err.to_string().contains("not-a-file"));

    let _ = tokio::fs::remove_dir_all(dir.parent().unwrap()).await;
}
