//! SQL statement construction.
//!
//! Every statement wraps its rows in `to_jsonb(...)` so results come back as
//! plain JSON objects whatever the column types are. Values supplied by the
//! caller are always bound as JSON.
//!
//! Inserted and assigned values go through
//! `jsonb_populate_record(NULL::<table>, ...)`, which parses `"2024-01-01"`
//! into a `date` or `"42"` into an `int` exactly as storing a literal in that
//! column would, length and precision limits included.
//!
//! Filter values are cast to the column's base type from [`ColumnTypes`]
//! instead, without its length or precision, so `1.004` stays `1.004` when
//! compared against a `numeric(5,2)` column and an over-long string simply
//! matches nothing.

use rowgate_core::filter::{Filter, FilterBuilder, apply_filters};
use rowgate_core::record::{Record, column_union};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};
use std::collections::HashMap;

/// Alias used for the row source wrapped by `to_jsonb`.
const ROW_ALIAS: &str = "_rowgate_rows";

/// Base type of each column of a table, as `format_type(atttypid, NULL)`
/// reports it (`character varying`, `numeric`, `integer[]`, ...).
#[derive(Debug, Clone, Default)]
pub struct ColumnTypes {
    types: HashMap<String, String>,
}

impl ColumnTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.types.get(column).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<(String, String)> for ColumnTypes {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().collect(),
        }
    }
}

/// Catalog query listing the base type of every live column of a table.
///
/// `$1` is the quoted table name, resolved through `regclass`.
pub const COLUMN_TYPES_SQL: &str = "SELECT a.attname::text, format_type(a.atttypid, NULL) \
     FROM pg_attribute a \
     WHERE a.attrelid = $1::regclass AND a.attnum > 0 AND NOT a.attisdropped";

/// A statement under construction plus the table it targets.
pub struct PgStatement {
    builder: QueryBuilder<'static, Postgres>,
    table: String,
    column_types: ColumnTypes,
    has_predicate: bool,
}

impl PgStatement {
    fn new(head: impl Into<String>, table: String) -> Self {
        Self {
            builder: QueryBuilder::new(head.into()),
            table,
            column_types: ColumnTypes::default(),
            has_predicate: false,
        }
    }

    /// `SELECT <columns> FROM <table> [WHERE ...]`
    pub fn select(table: &str, columns: &str, filters: &[Filter], types: &ColumnTypes) -> Self {
        let table = table_ident(table);
        let mut stmt = Self::new(
            format!(
                "SELECT to_jsonb({ROW_ALIAS}) AS row FROM (SELECT {} FROM {}",
                column_list(columns),
                table
            ),
            table,
        );
        stmt.apply(filters, types);
        stmt.builder.push(format!(") AS {ROW_ALIAS}"));
        stmt
    }

    /// `INSERT INTO <table> ... RETURNING *` for all records at once.
    pub fn insert(table: &str, records: &[Record]) -> Self {
        let table = table_ident(table);
        let columns = column_union(records);

        let mut stmt = if columns.is_empty() {
            Self::insert_defaults(table, records.len())
        } else {
            let column_list = columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ");
            let mut stmt = Self::new(
                format!(
                    "WITH {ROW_ALIAS} AS (INSERT INTO {table} ({column_list}) SELECT {column_list} FROM jsonb_populate_recordset(NULL::{table}, "
                ),
                table,
            );
            let rows = records.iter().cloned().map(Value::Object).collect();
            stmt.builder.push_bind(Json(Value::Array(rows)));
            stmt.builder.push(")");
            stmt
        };

        stmt.builder
            .push(format!(" RETURNING *) SELECT to_jsonb({ROW_ALIAS}) AS row FROM {ROW_ALIAS}"));
        stmt
    }

    /// Rows made only of column defaults.
    fn insert_defaults(table: String, count: usize) -> Self {
        if count <= 1 {
            return Self::new(
                format!("WITH {ROW_ALIAS} AS (INSERT INTO {table} DEFAULT VALUES"),
                table,
            );
        }
        let mut stmt = Self::new(
            format!("WITH {ROW_ALIAS} AS (INSERT INTO {table} SELECT FROM generate_series(1, "),
            table,
        );
        stmt.builder.push_bind(count as i64);
        stmt.builder.push(")");
        stmt
    }

    /// `UPDATE <table> SET ... [WHERE ...] RETURNING *`
    pub fn update(
        table: &str,
        changes: &Record,
        filters: &[Filter],
        types: &ColumnTypes,
    ) -> Self {
        let table = table_ident(table);
        let mut stmt = Self::new(format!("WITH {ROW_ALIAS} AS (UPDATE {table} SET "), table);

        for (i, (column, value)) in changes.iter().enumerate() {
            if i > 0 {
                stmt.builder.push(", ");
            }
            let col = quote_ident(column);
            stmt.builder.push(format!(
                "{col} = (SELECT {col} FROM jsonb_populate_record(NULL::{}, ",
                stmt.table
            ));
            stmt.builder.push_bind(Json(single_field(column, value)));
            stmt.builder.push("))");
        }

        stmt.apply(filters, types);
        stmt.builder
            .push(format!(" RETURNING *) SELECT to_jsonb({ROW_ALIAS}) AS row FROM {ROW_ALIAS}"));
        stmt
    }

    /// `DELETE FROM <table> [WHERE ...] RETURNING *`
    pub fn delete(table: &str, filters: &[Filter], types: &ColumnTypes) -> Self {
        let table = table_ident(table);
        let mut stmt = Self::new(format!("WITH {ROW_ALIAS} AS (DELETE FROM {table}"), table);
        stmt.apply(filters, types);
        stmt.builder
            .push(format!(" RETURNING *) SELECT to_jsonb({ROW_ALIAS}) AS row FROM {ROW_ALIAS}"));
        stmt
    }

    /// The SQL text built so far.
    pub fn sql(&self) -> &str {
        self.builder.sql()
    }

    pub fn into_builder(self) -> QueryBuilder<'static, Postgres> {
        self.builder
    }

    fn apply(&mut self, filters: &[Filter], types: &ColumnTypes) {
        self.column_types = types.clone();
        apply_filters(self, filters);
    }

    fn begin_predicate(&mut self) {
        if self.has_predicate {
            self.builder.push(" AND ");
        } else {
            self.builder.push(" WHERE ");
            self.has_predicate = true;
        }
    }

    fn compare(&mut self, column: &str, sql_op: &str, value: &Value) {
        self.begin_predicate();
        let col = quote_ident(column);
        match self.column_types.get(column).map(str::to_string) {
            Some(base_type) => {
                self.builder.push(format!("{col} {sql_op} CAST(("));
                self.builder.push_bind(Json(value.clone()));
                self.builder.push(format!("::jsonb #>> '{{}}') AS {base_type})"));
            }
            // Unknown column: PostgreSQL reports it while parsing.
            None => {
                self.builder.push(format!(
                    "{col} {sql_op} (SELECT {col} FROM jsonb_populate_record(NULL::{}, ",
                    self.table
                ));
                self.builder.push_bind(Json(single_field(column, value)));
                self.builder.push("))");
            }
        }
    }
}

impl FilterBuilder for PgStatement {
    fn eq(&mut self, column: &str, value: &Value) {
        self.compare(column, "=", value);
    }

    fn neq(&mut self, column: &str, value: &Value) {
        self.compare(column, "<>", value);
    }

    fn gt(&mut self, column: &str, value: &Value) {
        self.compare(column, ">", value);
    }

    fn lt(&mut self, column: &str, value: &Value) {
        self.compare(column, "<", value);
    }

    fn gte(&mut self, column: &str, value: &Value) {
        self.compare(column, ">=", value);
    }

    fn lte(&mut self, column: &str, value: &Value) {
        self.compare(column, "<=", value);
    }

    fn like(&mut self, column: &str, pattern: &Value) {
        self.begin_predicate();
        let col = quote_ident(column);
        self.builder.push(format!("{col}::text LIKE ("));
        self.builder.push_bind(Json(pattern.clone()));
        self.builder.push("::jsonb #>> '{}')");
    }

    fn in_(&mut self, column: &str, values: &Value) {
        self.begin_predicate();
        let col = quote_ident(column);
        match self.column_types.get(column).map(str::to_string) {
            // A non-array is forwarded as-is and rejected by PostgreSQL.
            Some(base_type) => {
                self.builder.push(format!(
                    "{col} IN (SELECT CAST(_rowgate_value AS {base_type}) FROM jsonb_array_elements_text("
                ));
                self.builder.push_bind(Json(values.clone()));
                self.builder.push("::jsonb) AS _rowgate_value)");
            }
            None => {
                self.builder.push(format!(
                    "{col} IN (SELECT {col} FROM jsonb_populate_recordset(NULL::{}, ",
                    self.table
                ));
                let rows = match values {
                    Value::Array(items) => {
                        Value::Array(items.iter().map(|v| single_field(column, v)).collect())
                    }
                    other => other.clone(),
                };
                self.builder.push_bind(Json(rows));
                self.builder.push("))");
            }
        }
    }
}

fn single_field(column: &str, value: &Value) -> Value {
    let mut obj = Map::new();
    obj.insert(column.to_string(), value.clone());
    Value::Object(obj)
}

/// Double-quote an identifier, doubling any embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a table name, treating `schema.table` as two identifiers.
pub fn table_ident(table: &str) -> String {
    table
        .split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Quote a comma-separated column selection; `*` and blank select everything.
pub fn column_list(columns: &str) -> String {
    let columns = columns.trim();
    if columns.is_empty() {
        return "*".to_string();
    }
    columns
        .split(',')
        .map(str::trim)
        .map(|c| if c == "*" { "*".to_string() } else { quote_ident(c) })
        .collect::<Vec<_>>()
        .join(", ")
}
