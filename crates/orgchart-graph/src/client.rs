//! Neo4j connection management and shared graph client.

use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph, Query, Txn};

use orgchart_core::config::Neo4jSettings;
use orgchart_core::OrgError;

use crate::store::{AccessMode, GraphStore, GraphTxn, Record, Statement, Value};

/// Errors from graph store operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Failed to decode result: {0}")]
    Decode(String),

    #[error("Unsupported statement: {0}")]
    Unsupported(String),
}

impl From<GraphError> for OrgError {
    fn from(err: GraphError) -> Self {
        OrgError::Store(err.to_string())
    }
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Neo4jSettings::default().into()
    }
}

impl From<Neo4jSettings> for GraphConfig {
    fn from(settings: Neo4jSettings) -> Self {
        Self {
            uri: settings.uri,
            user: settings.user,
            password: settings.password,
            database: settings.database,
            max_connections: settings.max_connections,
            fetch_size: settings.fetch_size,
        }
    }
}

/// Thread-safe Neo4j graph client with connection pooling.
///
/// Construct once and pass it to whatever needs a [`GraphStore`].
/// Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, database = %config.database, "Connected to Neo4j");
        Ok(Self { graph })
    }
}

#[async_trait]
impl GraphStore for GraphClient {
    async fn begin(&self, mode: AccessMode) -> Result<Box<dyn GraphTxn>, GraphError> {
        let txn = self.graph.start_txn().await?;
        tracing::debug!(%mode, "Started Neo4j transaction");
        Ok(Box::new(Neo4jTxn { txn }))
    }
}

/// A live neo4rs transaction.
struct Neo4jTxn {
    txn: Txn,
}

#[async_trait]
impl GraphTxn for Neo4jTxn {
    async fn execute(&mut self, statement: Statement) -> Result<Vec<Record>, GraphError> {
        tracing::debug!(statement = statement.name(), "Executing statement");
        let mut stream = self.txn.execute(to_query(&statement)).await?;

        let mut records = Vec::new();
        while let Some(row) = stream.next(self.txn.handle()).await? {
            records.push(row_to_record(&row, statement.columns()));
        }
        Ok(records)
    }

    async fn commit(self: Box<Self>) -> Result<(), GraphError> {
        self.txn.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), GraphError> {
        self.txn.rollback().await?;
        Ok(())
    }
}

/// Bind a statement's parameters onto a neo4rs query.
fn to_query(statement: &Statement) -> Query {
    statement
        .params()
        .iter()
        .fold(query(statement.text()), |q, (key, value)| match value {
            Value::Null => q.param(key, None::<String>),
            Value::Int(n) => q.param(key, *n),
            Value::String(s) => q.param(key, s.clone()),
        })
}

/// Read the declared columns of a row. Columns are strings, integers, or null.
fn row_to_record(row: &neo4rs::Row, columns: &[&str]) -> Record {
    let mut record = Record::new();
    for column in columns {
        let value = if let Ok(s) = row.get::<String>(column) {
            Value::String(s)
        } else if let Ok(n) = row.get::<i64>(column) {
            Value::Int(n)
        } else {
            Value::Null
        };
        record.insert(*column, value);
    }
    record
}
