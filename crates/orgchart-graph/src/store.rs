//! The seam between the repository and a transactional graph store.
//!
//! The repository only ever talks to a [`GraphTxn`]: it hands over named,
//! parameterized Cypher [`Statement`]s and reads back [`Record`]s. Opening,
//! committing and rolling back transactions belongs to the caller.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;

use orgchart_core::{OrgError, SortOrder};

use crate::client::GraphError;

/// Whether a transaction only reads or may also write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// A scalar bound as a parameter or returned in a record column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Int(i64),
    String(String),
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

/// A Cypher template with its bound parameters.
///
/// `name` identifies the operation (used for logging and by stores that
/// interpret statements natively); `columns` lists the result columns the
/// template returns, in order. `order` is the direction of the template's
/// `ORDER BY` clause, if it has one.
#[derive(Debug, Clone)]
pub struct Statement {
    name: &'static str,
    text: String,
    params: BTreeMap<&'static str, Value>,
    columns: &'static [&'static str],
    order: Option<SortOrder>,
}

impl Statement {
    pub fn new(name: &'static str, text: impl Into<String>) -> Self {
        Self {
            name,
            text: text.into(),
            params: BTreeMap::new(),
            columns: &[],
            order: None,
        }
    }

    pub fn param(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.params.insert(key, value.into());
        self
    }

    pub fn returns(mut self, columns: &'static [&'static str]) -> Self {
        self.columns = columns;
        self
    }

    pub fn ordered(mut self, order: Option<SortOrder>) -> Self {
        self.order = order;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &BTreeMap<&'static str, Value> {
        &self.params
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    pub fn order(&self) -> Option<SortOrder> {
        self.order
    }

    /// A string parameter, if bound.
    pub fn str_param(&self, key: &str) -> Option<&str> {
        match self.params.get(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

/// One result row, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(column.into(), value.into());
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        self.fields.insert(column.into(), value);
    }

    pub fn get_str(&self, column: &str) -> Result<&str, GraphError> {
        match self.fields.get(column) {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(GraphError::Decode(format!(
                "column {column} is not a string: {other:?}"
            ))),
            None => Err(GraphError::Decode(format!("missing column {column}"))),
        }
    }

    pub fn get_int(&self, column: &str) -> Result<i64, GraphError> {
        match self.fields.get(column) {
            Some(Value::Int(n)) => Ok(*n),
            Some(other) => Err(GraphError::Decode(format!(
                "column {column} is not an integer: {other:?}"
            ))),
            None => Err(GraphError::Decode(format!("missing column {column}"))),
        }
    }
}

/// An open transaction against a graph store.
#[async_trait]
pub trait GraphTxn: Send {
    /// Run a statement and collect all of its rows.
    async fn execute(&mut self, statement: Statement) -> Result<Vec<Record>, GraphError>;

    async fn commit(self: Box<Self>) -> Result<(), GraphError>;

    async fn rollback(self: Box<Self>) -> Result<(), GraphError>;
}

/// A transactional graph store. Implementations are cheap to share.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn begin(&self, mode: AccessMode) -> Result<Box<dyn GraphTxn>, GraphError>;
}

/// Commit `txn` if `outcome` succeeded, roll it back otherwise.
///
/// A failed rollback is logged; the caller still sees the original error.
pub async fn finish<T>(
    txn: Box<dyn GraphTxn>,
    outcome: Result<T, OrgError>,
) -> Result<T, OrgError> {
    match outcome {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
