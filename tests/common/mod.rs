//! In-memory implementations of the pipeline capabilities
//!
//! Shared by the integration tests; not every test binary uses every helper.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vigil::adapters::database::{QuerySession, SessionSource};
use vigil::adapters::flatfile::{ExportReceipt, ExportSink};
use vigil::domain::{
    ColumnSpec, Dataset, EntitySpec, ExportError, QueryError, Record, Result, Value, VigilError,
};

/// Contents of one fake table
#[derive(Debug, Clone, Default)]
pub struct FakeTable {
    pub total: u64,
    pub nulls: u64,
    pub rows: Vec<Record>,
}

impl FakeTable {
    pub fn new(total: u64, nulls: u64) -> Self {
        Self {
            total,
            nulls,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<Record>) -> Self {
        self.rows = rows;
        self
    }
}

/// Call counters shared between a source and its sessions
#[derive(Debug, Default)]
pub struct Calls {
    pub acquired: AtomicUsize,
    pub released: AtomicUsize,
    pub counts: AtomicUsize,
    pub null_counts: AtomicUsize,
    pub fetches: AtomicUsize,
}

impl Calls {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn counts(&self) -> usize {
        self.counts.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
struct Behaviour {
    tables: HashMap<String, FakeTable>,
    fail_count_call: Option<usize>,
    fail_fetch: HashSet<String>,
    unavailable: bool,
}

/// Session source backed by in-memory tables
#[derive(Debug, Default)]
pub struct FakeSource {
    behaviour: Arc<Behaviour>,
    calls: Arc<Calls>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn behaviour_mut(&mut self) -> &mut Behaviour {
        Arc::get_mut(&mut self.behaviour).expect("configure before sharing")
    }

    pub fn table(mut self, name: &str, table: FakeTable) -> Self {
        self.behaviour_mut().tables.insert(name.to_string(), table);
        self
    }

    /// The `n`th call to `count` (1-based) fails with a lost connection
    pub fn failing_count_call(mut self, n: usize) -> Self {
        self.behaviour_mut().fail_count_call = Some(n);
        self
    }

    pub fn failing_fetch(mut self, entity: &str) -> Self {
        self.behaviour_mut().fail_fetch.insert(entity.to_string());
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.behaviour_mut().unavailable = true;
        self
    }

    pub fn calls(&self) -> Arc<Calls> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl SessionSource for FakeSource {
    async fn acquire(&self) -> Result<Box<dyn QuerySession>> {
        if self.behaviour.unavailable {
            return Err(VigilError::Connectivity(
                "connection refused (localhost:5432)".to_string(),
            ));
        }
        self.calls.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            behaviour: Arc::clone(&self.behaviour),
            calls: Arc::clone(&self.calls),
        }))
    }

    fn describe(&self) -> String {
        "fake://insurance_company".to_string()
    }
}

struct FakeSession {
    behaviour: Arc<Behaviour>,
    calls: Arc<Calls>,
}

impl FakeSession {
    fn table(&self, entity: &EntitySpec) -> std::result::Result<&FakeTable, QueryError> {
        self.behaviour
            .tables
            .get(&entity.name)
            .ok_or_else(|| QueryError::Failed(format!("relation \"{}\" does not exist", entity.name)))
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.calls.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl QuerySession for FakeSession {
    async fn count(&self, entity: &EntitySpec) -> std::result::Result<u64, QueryError> {
        let call = self.calls.counts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.behaviour.fail_count_call == Some(call) {
            return Err(QueryError::ConnectionLost("connection reset by peer".to_string()));
        }
        Ok(self.table(entity)?.total)
    }

    async fn count_where_any_null(
        &self,
        entity: &EntitySpec,
        required_columns: &[&str],
    ) -> std::result::Result<u64, QueryError> {
        self.calls.null_counts.fetch_add(1, Ordering::SeqCst);
        if required_columns.is_empty() {
            return Ok(0);
        }
        Ok(self.table(entity)?.nulls)
    }

    async fn fetch_rows(
        &self,
        entity: &EntitySpec,
        _columns: &[&str],
        _key_column: &str,
    ) -> std::result::Result<Vec<Record>, QueryError> {
        self.calls.fetches.fetch_add(1, Ordering::SeqCst);
        if self.behaviour.fail_fetch.contains(&entity.name) {
            return Err(QueryError::Failed("canceling statement due to statement timeout".to_string()));
        }
        Ok(self.table(entity)?.rows.clone())
    }
}

/// Dataset as seen by a [`RecordingSink`]
#[derive(Debug, Clone, PartialEq)]
pub struct Written {
    pub dataset: String,
    pub columns: Vec<String>,
    pub rows: usize,
}

/// Sink that records every write attempt
#[derive(Debug, Default)]
pub struct RecordingSink {
    attempts: Mutex<Vec<Written>>,
    fail_for: HashSet<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, dataset: &str) -> Self {
        self.fail_for.insert(dataset.to_string());
        self
    }

    pub fn attempts(&self) -> Vec<Written> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn datasets(&self) -> Vec<String> {
        self.attempts().into_iter().map(|w| w.dataset).collect()
    }
}

impl ExportSink for RecordingSink {
    fn write(&self, dataset: &Dataset) -> std::result::Result<ExportReceipt, ExportError> {
        self.attempts.lock().unwrap().push(Written {
            dataset: dataset.name().to_string(),
            columns: dataset.columns().to_vec(),
            rows: dataset.row_count(),
        });

        if self.fail_for.contains(dataset.name()) {
            return Err(ExportError::WriteFailed {
                dataset: dataset.name().to_string(),
                message: "No space left on device".to_string(),
            });
        }

        Ok(ExportReceipt {
            dataset: dataset.name().to_string(),
            location: format!("memory://{}", dataset.name()),
            rows_written: dataset.row_count(),
            bytes_written: 0,
            checksum: None,
        })
    }

    fn describe(&self) -> String {
        "recording".to_string()
    }
}

pub fn customers() -> EntitySpec {
    EntitySpec::builder("customers")
        .key_column("id")
        .column(ColumnSpec::new("id").required())
        .column(ColumnSpec::new("name").required())
        .build()
        .unwrap()
}

pub fn products() -> EntitySpec {
    EntitySpec::builder("products")
        .key_column("id")
        .column(ColumnSpec::new("id").required())
        .column(ColumnSpec::new("type").renamed("name").required())
        .column(ColumnSpec::new("price"))
        .build()
        .unwrap()
}

pub fn purchases() -> EntitySpec {
    EntitySpec::builder("purchases")
        .key_column("id")
        .column(ColumnSpec::new("id").required())
        .column(ColumnSpec::new("customer_id").required())
        .column(ColumnSpec::new("product_id").required())
        .column(ColumnSpec::new("purchased_at"))
        .build()
        .unwrap()
}

pub fn customer_rows(n: i64) -> Vec<Record> {
    (1..=n)
        .map(|id| Record::new(vec![Value::Integer(id), Value::Text(format!("Customer {id}"))]))
        .collect()
}

pub fn product_rows(n: i64) -> Vec<Record> {
    (1..=n)
        .map(|id| {
            Record::new(vec![
                Value::Integer(id),
                Value::Text("auto".to_string()),
                Value::Float(99.5),
            ])
        })
        .collect()
}

pub fn purchase_rows(n: i64) -> Vec<Record> {
    (1..=n)
        .map(|id| {
            Record::new(vec![
                Value::Integer(id),
                Value::Integer(1),
                Value::Integer(1),
                Value::Null,
            ])
        })
        .collect()
}

/// Source with the three reference tables, all within the default threshold
pub fn healthy_source() -> FakeSource {
    FakeSource::new()
        .table("customers", FakeTable::new(100, 5).with_rows(customer_rows(95)))
        .table("products", FakeTable::new(10, 1).with_rows(product_rows(9)))
        .table("purchases", FakeTable::new(50, 0).with_rows(purchase_rows(50)))
}

pub fn all_entities() -> Vec<EntitySpec> {
    vec![customers(), products(), purchases()]
}
