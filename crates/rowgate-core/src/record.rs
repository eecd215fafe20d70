//! Row payloads.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single row: column name to value.
pub type Record = Map<String, Value>;

/// One record or several, as accepted by `create_records`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RecordBatch {
    Many(Vec<Record>),
    One(Record),
}

impl RecordBatch {
    /// Normalize to a sequence, preserving order.
    pub fn into_vec(self) -> Vec<Record> {
        match self {
            RecordBatch::Many(records) => records,
            RecordBatch::One(record) => vec![record],
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RecordBatch::Many(records) => records.len(),
            RecordBatch::One(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Record> for RecordBatch {
    fn from(record: Record) -> Self {
        RecordBatch::One(record)
    }
}

impl From<Vec<Record>> for RecordBatch {
    fn from(records: Vec<Record>) -> Self {
        RecordBatch::Many(records)
    }
}

/// Union of the keys of `records`.
///
/// Columns are ordered by the first record that names them. Keys within one
/// record follow the map's own ordering, which is sorted by name.
pub fn column_union(records: &[Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}
