//! In-memory `RecordStore` for exercising the CRUD handlers without a database.
//!
//! Filters are evaluated through the real translator: each call builds a
//! [`MemoryQuery`] with `apply_filters` and matches rows against it.

#![allow(dead_code)]

use async_trait::async_trait;
use rowgate_core::{BackendError, Filter, FilterBuilder, FilterOp, Record, RecordStore, apply_filters};
use serde_json::{Value, json};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Record>>>,
    next_id: AtomicUsize,
    calls: AtomicUsize,
    fail_next: Mutex<Option<BackendError>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicUsize::new(1000),
            ..Default::default()
        }
    }

    /// A store holding the `members` fixture.
    pub fn seeded() -> Self {
        let store = Self::new();
        store.put(
            "members",
            vec![
                record(json!({"id": 1, "name": "Aroha", "country": "New Zealand", "status": "active", "age": 34})),
                record(json!({"id": 2, "name": "Ben", "country": "Australia", "status": "inactive", "age": 41})),
                record(json!({"id": 3, "name": "Chloe", "country": "New Zealand", "status": "active", "age": 27})),
                record(json!({"id": 4, "name": "Dmitri", "country": "Estonia", "status": "inactive", "age": 52})),
                record(json!({"id": 123, "name": "Eve", "country": "Japan", "status": "pending", "age": 30})),
            ],
        );
        store
    }

    pub fn put(&self, table: &str, rows: Vec<Record>) {
        self.tables.lock().unwrap().insert(table.to_string(), rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Record> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of statements the store has been asked to run.
    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    /// Make the next call fail with `err`.
    pub fn fail_next(&self, err: BackendError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    fn begin(&self, table: &str) -> Result<(), BackendError> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        if let Some(err) = self.fail_next.lock().unwrap().take() {
            return Err(err);
        }
        if !self.tables.lock().unwrap().contains_key(table) {
            return Err(BackendError::new(format!("relation \"{table}\" does not exist"))
                .with_code("42P01"));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, table: &str, records: &[Record]) -> Result<Vec<Record>, BackendError> {
        self.begin(table)?;
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();

        let mut created = Vec::with_capacity(records.len());
        for record in records {
            let mut row = record.clone();
            if !row.contains_key("id") {
                let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst);
                row.insert("id".to_string(), json!(id));
            }
            created.push(row);
        }
        rows.extend(created.iter().cloned());
        Ok(created)
    }

    async fn select(
        &self,
        table: &str,
        columns: &str,
        filters: &[Filter],
    ) -> Result<Vec<Record>, BackendError> {
        self.begin(table)?;
        let query = MemoryQuery::new(filters);
        let tables = self.tables.lock().unwrap();
        let selected = tables[table]
            .iter()
            .filter(|row| query.matches(row))
            .map(|row| project(row, columns))
            .collect();
        Ok(selected)
    }

    async fn update(
        &self,
        table: &str,
        changes: &Record,
        filters: &[Filter],
    ) -> Result<Vec<Record>, BackendError> {
        self.begin(table)?;
        let query = MemoryQuery::new(filters);
        let mut tables = self.tables.lock().unwrap();
        let mut updated = Vec::new();
        for row in tables.get_mut(table).into_iter().flatten() {
            if query.matches(row) {
                for (column, value) in changes {
                    row.insert(column.clone(), value.clone());
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Record>, BackendError> {
        self.begin(table)?;
        let query = MemoryQuery::new(filters);
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let (deleted, kept): (Vec<Record>, Vec<Record>) =
            rows.drain(..).partition(|row| query.matches(row));
        *rows = kept;
        Ok(deleted)
    }
}

fn project(row: &Record, columns: &str) -> Record {
    if columns.trim() == "*" {
        return row.clone();
    }
    columns
        .split(',')
        .map(str::trim)
        .filter_map(|c| row.get(c).map(|v| (c.to_string(), v.clone())))
        .collect()
}

/// Predicates collected through [`FilterBuilder`].
#[derive(Default)]
pub struct MemoryQuery {
    predicates: Vec<(String, FilterOp, Value)>,
}

impl MemoryQuery {
    pub fn new(filters: &[Filter]) -> Self {
        let mut query = Self::default();
        apply_filters(&mut query, filters);
        query
    }

    pub fn matches(&self, row: &Record) -> bool {
        static NULL: Value = Value::Null;
        self.predicates.iter().all(|(column, op, expected)| {
            let actual = row.get(column).unwrap_or(&NULL);
            match op {
                FilterOp::Eq => actual == expected,
                FilterOp::Neq => !actual.is_null() && actual != expected,
                FilterOp::Gt => compare(actual, expected) == Some(Ordering::Greater),
                FilterOp::Lt => compare(actual, expected) == Some(Ordering::Less),
                FilterOp::Gte => matches!(
                    compare(actual, expected),
                    Some(Ordering::Greater | Ordering::Equal)
                ),
                FilterOp::Lte => matches!(
                    compare(actual, expected),
                    Some(Ordering::Less | Ordering::Equal)
                ),
                FilterOp::Like => match (actual.as_str(), expected.as_str()) {
                    (Some(text), Some(pattern)) => like(text, pattern),
                    _ => false,
                },
                FilterOp::In => expected
                    .as_array()
                    .is_some_and(|values| values.contains(actual)),
            }
        })
    }

    fn push(&mut self, column: &str, op: FilterOp, value: &Value) {
        self.predicates.push((column.to_string(), op, value.clone()));
    }
}

impl FilterBuilder for MemoryQuery {
    fn eq(&mut self, column: &str, value: &Value) {
        self.push(column, FilterOp::Eq, value);
    }
    fn neq(&mut self, column: &str, value: &Value) {
        self.push(column, FilterOp::Neq, value);
    }
    fn gt(&mut self, column: &str, value: &Value) {
        self.push(column, FilterOp::Gt, value);
    }
    fn lt(&mut self, column: &str, value: &Value) {
        self.push(column, FilterOp::Lt, value);
    }
    fn gte(&mut self, column: &str, value: &Value) {
        self.push(column, FilterOp::Gte, value);
    }
    fn lte(&mut self, column: &str, value: &Value) {
        self.push(column, FilterOp::Lte, value);
    }
    fn like(&mut self, column: &str, pattern: &Value) {
        self.push(column, FilterOp::Like, pattern);
    }
    fn in_(&mut self, column: &str, values: &Value) {
        self.push(column, FilterOp::In, values);
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// SQL `LIKE` with `%` and `_` wildcards.
fn like(text: &str, pattern: &str) -> bool {
    fn go(t: &[char], p: &[char]) -> bool {
        match p.split_first() {
            None => t.is_empty(),
            Some((&'%', rest)) => (0..=t.len()).any(|i| go(&t[i..], rest)),
            Some((&'_', rest)) => !t.is_empty() && go(&t[1..], rest),
            Some((c, rest)) => t.first() == Some(c) && go(&t[1..], rest),
        }
    }
    let t: Vec<char> = text.chars().collect();
    let p: Vec<char> = pattern.chars().collect();
    go(&t, &p)
}

pub fn record(value: Value) -> Record {
    value.as_object().cloned().expect("record literal must be an object")
}

pub fn ids(records: &[Record]) -> Vec<i64> {
    let mut ids: Vec<i64> = records.iter().filter_map(|r| r["id"].as_i64()).collect();
    ids.sort();
    ids
}
