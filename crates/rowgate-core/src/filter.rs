//! Filter expressions and their translation onto query builders.
//!
//! A filter arrives on the wire as a loosely typed [`FilterSpec`]
//! (`["column", "operator", value]`). Before anything touches a query
//! builder, the whole list is validated into typed [`Filter`]s with
//! [`parse_filters`]; an unknown operator rejects the list as a whole so
//! no predicate is ever partially applied. [`apply_filters`] then forwards
//! each filter, in order, to the matching [`FilterBuilder`] method.
//!
//! Filters are conjunctive only. Values are never coerced here; the
//! backend decides whether a value fits the column.

use crate::error::UnsupportedOperatorError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Comparison operator supported by a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
    Like,
    In,
}

impl FilterOp {
    /// All operators, in their canonical order.
    pub const ALL: [FilterOp; 8] = [
        FilterOp::Eq,
        FilterOp::Neq,
        FilterOp::Gt,
        FilterOp::Lt,
        FilterOp::Gte,
        FilterOp::Lte,
        FilterOp::Like,
        FilterOp::In,
    ];

    /// Look up an operator by its wire name (`eq`, `neq`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "eq" => Some(FilterOp::Eq),
            "neq" => Some(FilterOp::Neq),
            "gt" => Some(FilterOp::Gt),
            "lt" => Some(FilterOp::Lt),
            "gte" => Some(FilterOp::Gte),
            "lte" => Some(FilterOp::Lte),
            "like" => Some(FilterOp::Like),
            "in" => Some(FilterOp::In),
            _ => None,
        }
    }

    /// The wire name of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Neq => "neq",
            FilterOp::Gt => "gt",
            FilterOp::Lt => "lt",
            FilterOp::Gte => "gte",
            FilterOp::Lte => "lte",
            FilterOp::Like => "like",
            FilterOp::In => "in",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A filter as received from a tool call, before validation.
///
/// Accepts either the positional form `["id", "eq", 1]` or the named form
/// `{"column": "id", "operator": "eq", "value": 1}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FilterSpec {
    /// `[column, operator, value]`
    Tuple(String, String, Value),
    /// `{"column": ..., "operator": ..., "value": ...}`
    Named {
        /// Column name.
        column: String,
        /// One of eq, neq, gt, lt, gte, lte, like, in.
        operator: String,
        /// Comparison value; an array for `in`, a `%` pattern for `like`.
        value: Value,
    },
}

impl FilterSpec {
    /// Build a positional filter spec.
    pub fn new(column: impl Into<String>, operator: impl Into<String>, value: Value) -> Self {
        FilterSpec::Tuple(column.into(), operator.into(), value)
    }

    pub fn column(&self) -> &str {
        match self {
            FilterSpec::Tuple(column, _, _) => column,
            FilterSpec::Named { column, .. } => column,
        }
    }

    pub fn operator(&self) -> &str {
        match self {
            FilterSpec::Tuple(_, operator, _) => operator,
            FilterSpec::Named { operator, .. } => operator,
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            FilterSpec::Tuple(_, _, value) => value,
            FilterSpec::Named { value, .. } => value,
        }
    }

    /// Validate the operator and produce a typed [`Filter`].
    pub fn parse(&self) -> Result<Filter, UnsupportedOperatorError> {
        let op = FilterOp::from_name(self.operator()).ok_or_else(|| UnsupportedOperatorError {
            operator: self.operator().to_string(),
            column: self.column().to_string(),
        })?;

        Ok(Filter {
            column: self.column().to_string(),
            op,
            value: self.value().clone(),
        })
    }
}

/// A validated filter predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(column: impl Into<String>, op: FilterOp, value: Value) -> Self {
        Self {
            column: column.into(),
            op,
            value,
        }
    }
}

/// Validate a whole filter list.
///
/// Stops at the first unsupported operator; nothing is returned for the
/// filters that did parse.
pub fn parse_filters(specs: &[FilterSpec]) -> Result<Vec<Filter>, UnsupportedOperatorError> {
    specs.iter().map(FilterSpec::parse).collect()
}

/// Query-builder surface the translator drives.
///
/// Each method appends one predicate, ANDed with whatever was appended
/// before it.
pub trait FilterBuilder {
    fn eq(&mut self, column: &str, value: &Value);
    fn neq(&mut self, column: &str, value: &Value);
    fn gt(&mut self, column: &str, value: &Value);
    fn lt(&mut self, column: &str, value: &Value);
    fn gte(&mut self, column: &str, value: &Value);
    fn lte(&mut self, column: &str, value: &Value);
    /// Pattern match; wildcards are supplied by the caller.
    fn like(&mut self, column: &str, pattern: &Value);
    /// Membership in the supplied collection.
    fn in_(&mut self, column: &str, values: &Value);
}

/// Apply filters to a builder, one predicate per filter, in input order.
pub fn apply_filters<B: FilterBuilder + ?Sized>(builder: &mut B, filters: &[Filter]) {
    for filter in filters {
        let column = filter.column.as_str();
        let value = &filter.value;
        match filter.op {
            FilterOp::Eq => builder.eq(column, value),
            FilterOp::Neq => builder.neq(column, value),
            FilterOp::Gt => builder.gt(column, value),
            FilterOp::Lt => builder.lt(column, value),
            FilterOp::Gte => builder.gte(column, value),
            FilterOp::Lte => builder.lte(column, value),
            FilterOp::Like => builder.like(column, value),
            FilterOp::In => builder.in_(column, value),
        }
    }
}
