//! Neo4j schema initialization - constraints and indexes.

use orgchart_core::Result;

use crate::store::{finish, AccessMode, GraphStore, Statement};

/// Statements that declare the schema. All are idempotent (`IF NOT EXISTS`).
pub fn schema_statements() -> Vec<Statement> {
    vec![
        // Application ids are the only identity used for lookups.
        Statement::new(
            "ensure_constraint",
            "CREATE CONSTRAINT employee_id_unique IF NOT EXISTS
             FOR (e:Employee) REQUIRE e.id IS UNIQUE",
        ),
        Statement::new(
            "ensure_constraint",
            "CREATE CONSTRAINT department_id_unique IF NOT EXISTS
             FOR (d:Department) REQUIRE d.id IS UNIQUE",
        ),
        // Linking and filtering match on names.
        Statement::new(
            "ensure_index",
            "CREATE INDEX employee_name IF NOT EXISTS
             FOR (e:Employee) ON (e.name)",
        ),
        Statement::new(
            "ensure_index",
            "CREATE INDEX department_name IF NOT EXISTS
             FOR (d:Department) ON (d.name)",
        ),
    ]
}

/// Initialize the schema. Safe to call on every startup.
///
/// Each statement runs in its own write transaction: Neo4j does not allow
/// schema changes to share a transaction with other work.
pub async fn ensure_schema(store: &dyn GraphStore) -> Result<()> {
    for statement in schema_statements() {
        let mut txn = store.begin(AccessMode::Write).await?;
        let outcome = txn.execute(statement).await.map(|_| ()).map_err(Into::into);
        finish(txn, outcome).await?;
    }

    tracing::info!("Neo4j schema initialized (constraints and indexes ensured)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGraph;

    #[test]
    fn schema_declares_unique_ids() {
        let statements = schema_statements();
        let constraints: Vec<_> = statements
            .iter()
            .filter(|s| s.name() == "ensure_constraint")
            .collect();
        assert_eq!(constraints.len(), 2);
        assert!(constraints
            .iter()
            .all(|s| s.text().contains("IF NOT EXISTS") && s.text().contains("IS UNIQUE")));
    }

    #[tokio::test]
    async fn ensure_schema_is_repeatable() {
        let graph = MemoryGraph::new();
        ensure_schema(&graph).await.unwrap();
        ensure_schema(&graph).await.unwrap();
    }
}
