//! End-to-end runs over a queries tree with an in-memory executor.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use hunt_core::{InvestigationConfig, OutputFormat};
use hunt_kusto::{KustoColumn, QueryResult, StaticExecutor};
use hunt_pipeline::{PipelineOptions, PipelineRunner};
use hunt_rules::IdPolicy;
use serde_yaml::Value;
use tempfile::TempDir;

fn document(id: &str, table: &str) -> String {
    format!(
        r#"title: Activity on {table}
id: {id}
status: test
description: Activity for the device under investigation.
references: []
author: hunt team
date: 2025/01/14
modified: 2025/01/14
tags: [attack.execution]
logsource:
  product: windows
  table: {table}
  category: process_creation
kql: |
  {table} | where DeviceName =~ '{{{{ device_name }}}}'
falsepositives: []
level: low
"#
    )
}

fn options(queries: &Path, results: &Path) -> PipelineOptions {
    PipelineOptions {
        queries_root: queries.to_path_buf(),
        results_root: results.to_path_buf(),
        workspace_id: "ws-test".into(),
        timespan: None,
        output_format: OutputFormat::Csv,
        id_policy: IdPolicy::UuidV4,
    }
}

fn investigation() -> InvestigationConfig {
    let mut values = BTreeMap::new();
    values.insert("device_name".to_string(), Value::String("DESKTOP-ABC123".into()));
    InvestigationConfig::from_map(values)
}

fn two_rows() -> QueryResult {
    QueryResult::new(
        vec![
            KustoColumn::new("DeviceName", "string"),
            KustoColumn::new("ProcessCount", "long"),
        ],
        vec![
            vec![Some("DESKTOP-ABC123".into()), Some("4".into())],
            vec![Some("DESKTOP-ABC123".into()), None],
        ],
    )
}

fn write(root: &Path, rel: &str, body: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, body).unwrap();
    path
}

#[tokio::test]
async fn invalid_document_does_not_stop_the_batch() {
    let dir = TempDir::new().unwrap();
    let queries = dir.path().join("queries");
    let results = dir.path().join("results");
    write(&queries, "a/first.yaml", &document("0b7c2f4e-1d3a-4e5b-8c6d-7e8f9a0b1c2d", "DeviceProcessEvents"));
    write(&queries, "b/second.yaml", &document("not-a-uuid", "DeviceNetworkEvents"));
    write(&queries, "c/third.yml", &document("5d4c3b2a-1f0e-4d9c-8b7a-6f5e4d3c2b1a", "DeviceFileEvents"));
    write(&queries, ".hidden/skipped.yaml", "kql: nope");
    write(&queries, "notes.txt", "not a query");

    let exec = StaticExecutor::new(two_rows());
    let runner = PipelineRunner::new(options(&queries, &results), &investigation(), &exec);
    let summary = runner.run().await.unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.executed, 2);
    assert_eq!(summary.persisted, 2);
    assert_eq!(summary.failed, 1);
    assert!(!summary.is_success());

    let failures = summary.failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].0.ends_with("b/second.yaml"));
    assert!(failures[0].1.contains("Field 'id' must be a valid UUID string."));

    // Only the valid documents reach the executor, in path order.
    let calls = exec.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].query.starts_with("DeviceProcessEvents | where DeviceName =~ 'DESKTOP-ABC123'"));
    assert!(calls[1].query.starts_with("DeviceFileEvents"));

    let first = fs::read_to_string(results.join("a/first.csv")).unwrap();
    assert_eq!(first, "DeviceName,ProcessCount\nDESKTOP-ABC123,4\nDESKTOP-ABC123,\n");
    assert!(results.join("c/third.csv").is_file());
    assert!(!results.join("b").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn dangling_symlink_fails_only_its_own_document() {
    let dir = TempDir::new().unwrap();
    let queries = dir.path().join("queries");
    let results = dir.path().join("results");
    write(&queries, "a.yaml", &document("0b7c2f4e-1d3a-4e5b-8c6d-7e8f9a0b1c2d", "DeviceProcessEvents"));
    std::os::unix::fs::symlink(queries.join("missing.yaml"), queries.join("b.yaml")).unwrap();

    let exec = StaticExecutor::new(two_rows());
    let runner = PipelineRunner::new(options(&queries, &results), &investigation(), &exec);
    let summary = runner.run().await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.persisted, 1);
    assert!(summary.outcomes[0].succeeded());
    assert!(results.join("a.csv").is_file());

    let failures = summary.failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].0.ends_with("b.yaml"));
    assert!(failures[0].1.starts_with("Unexpected error: Query YAML file not found"));
}

#[tokio::test]
async fn persist_failure_keeps_execution_state() {
    let dir = TempDir::new().unwrap();
    let queries = dir.path().join("queries");
    // A file where the results directory should be.
    let results = dir.path().join("results");
    fs::write(&results, "occupied").unwrap();
    write(&queries, "nested/q.yaml", &document("0b7c2f4e-1d3a-4e5b-8c6d-7e8f9a0b1c2d", "DeviceEvents"));

    let exec = StaticExecutor::new(two_rows());
    let runner = PipelineRunner::new(options(&queries, &results), &investigation(), &exec);
    let summary = runner.run().await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.executed, 1);
    assert_eq!(summary.persisted, 0);
    let outcome = &summary.outcomes[0];
    assert!(outcome.executed);
    assert!(!outcome.persisted);
    assert_eq!(outcome.record_count, 2);
    assert!(outcome.output_path.is_none());
    assert!(outcome.error.as_deref().unwrap().starts_with("Persist error: "));
}

#[tokio::test]
async fn empty_tree_is_not_a_success() {
    let dir = TempDir::new().unwrap();
    let queries = dir.path().join("queries");
    fs::create_dir_all(&queries).unwrap();

    let exec = StaticExecutor::new(two_rows());
    let runner = PipelineRunner::new(options(&queries, &dir.path().join("results")), &investigation(), &exec);
    let summary = runner.run().await.unwrap();

    assert_eq!(summary.total, 0);
    assert!(!summary.is_success());
}

#[tokio::test]
async fn shipped_queries_run_with_example_case() {
    let repo = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let config = InvestigationConfig::load(repo.join("investigations/example-case/config.yaml")).unwrap();
    let results = TempDir::new().unwrap();

    let mut opts = options(&repo.join("queries"), results.path());
    opts.output_format = OutputFormat::Parquet;
    let exec = StaticExecutor::new(two_rows());
    let runner = PipelineRunner::new(opts, &config, &exec);
    let summary = runner.run().await.unwrap();

    assert!(summary.is_success(), "{:?}", summary.failures());
    assert_eq!(summary.total, exec.calls().len());
    for outcome in &summary.outcomes {
        let path = outcome.output_path.as_ref().unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("parquet"));
        assert!(path.is_file());
    }
    assert!(exec.calls().iter().all(|c| !c.query.contains("{{")));
}
