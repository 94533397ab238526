//! End-to-end tests writing real CSV files and audit log files

mod common;

use chrono::Utc;
use common::*;
use std::fs;
use tempfile::TempDir;
use vigil::adapters::audit_file::DailyFileEventLog;
use vigil::adapters::flatfile::{CsvExportSink, DryRunSink};
use vigil::core::audit::{CompositeEventLog, MemoryEventLog};
use vigil::core::export::ExtractionOrchestrator;
use vigil::core::integrity::IntegrityChecker;

#[tokio::test]
async fn test_run_writes_csv_files_and_audit_log() {
    let temp = TempDir::new().unwrap();
    let out_dir = temp.path().join("extracted");
    let log_dir = temp.path().join("logs");

    let source = FakeSource::new()
        .table("customers", FakeTable::new(2, 0).with_rows(customer_rows(2)))
        .table("products", FakeTable::new(1, 0).with_rows(product_rows(1)));
    let sink = CsvExportSink::new(&out_dir).with_prefix("PSQL_");
    let log = DailyFileEventLog::new(&log_dir);

    let summary = ExtractionOrchestrator::new(IntegrityChecker::default())
        .run(&[customers(), products()], &source, &sink, &log)
        .await;

    assert!(summary.is_successful());

    let customers_csv = fs::read_to_string(out_dir.join("PSQL_customers.csv")).unwrap();
    assert_eq!(customers_csv, "id,name\n1,Customer 1\n2,Customer 2\n");

    let products_csv = fs::read_to_string(out_dir.join("PSQL_products.csv")).unwrap();
    assert_eq!(products_csv, "id,name,price\n1,auto,99.5\n");

    let outcome = &summary.outcomes[0];
    assert_eq!(outcome.checksum.as_ref().map(String::len), Some(64));
    assert!(outcome.location.as_deref().unwrap().ends_with("PSQL_customers.csv"));

    let audit_file = log.file_for(Utc::now());
    let audit = fs::read_to_string(audit_file).unwrap();
    assert!(audit.lines().all(|line| line.starts_with('[')));
    assert!(audit.contains("] customers: 2 rows, 0 nulls, ratio 0.0000"));
    assert!(audit.contains("Query session released"));
}

#[tokio::test]
async fn test_rerun_overwrites_previous_export() {
    let temp = TempDir::new().unwrap();
    let sink = CsvExportSink::new(temp.path());
    let orchestrator = ExtractionOrchestrator::default();

    let first = FakeSource::new().table("customers", FakeTable::new(3, 0).with_rows(customer_rows(3)));
    orchestrator
        .run(&[customers()], &first, &sink, &MemoryEventLog::new())
        .await;

    let second = FakeSource::new().table("customers", FakeTable::new(1, 0).with_rows(customer_rows(1)));
    orchestrator
        .run(&[customers()], &second, &sink, &MemoryEventLog::new())
        .await;

    let csv = fs::read_to_string(temp.path().join("customers.csv")).unwrap();
    assert_eq!(csv, "id,name\n1,Customer 1\n");
}

#[tokio::test]
async fn test_halted_run_leaves_existing_exports_untouched() {
    let temp = TempDir::new().unwrap();
    let previous = temp.path().join("customers.csv");
    fs::write(&previous, "id,name\n7,Earlier\n").unwrap();

    let source = FakeSource::new().table("customers", FakeTable::new(10, 9).with_rows(customer_rows(1)));
    let summary = ExtractionOrchestrator::default()
        .run(
            &[customers()],
            &source,
            &CsvExportSink::new(temp.path()),
            &MemoryEventLog::new(),
        )
        .await;

    assert!(summary.halted());
    assert_eq!(fs::read_to_string(&previous).unwrap(), "id,name\n7,Earlier\n");
}

#[tokio::test]
async fn test_dry_run_writes_no_files() {
    let temp = TempDir::new().unwrap();
    let out_dir = temp.path().join("extracted");
    let sink = DryRunSink::new(CsvExportSink::new(&out_dir));
    let log = CompositeEventLog::new().with(DailyFileEventLog::new(temp.path().join("logs")));

    let summary = ExtractionOrchestrator::default()
        .with_dry_run(true)
        .run(&all_entities(), &healthy_source(), &sink, &log)
        .await;

    assert!(summary.is_successful());
    assert!(summary.dry_run);
    assert_eq!(summary.exported_count(), 3);
    assert!(!out_dir.exists());
    assert!(summary.outcomes[0]
        .location
        .as_deref()
        .unwrap()
        .ends_with("(dry run)"));
    assert!(temp.path().join("logs").exists());
}
