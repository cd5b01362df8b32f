//! Integration tests for orgchart-graph against a live Neo4j instance.
//!
//! These tests require a Neo4j server reachable with the default settings
//! (bolt://localhost:7687, neo4j/orgchart-dev).
//! Run with: cargo test --package orgchart-graph --test integration -- --ignored
//!
//! Skipped automatically if Neo4j is not available.

use orgchart_core::{EmployeeFilter, Handover, Position};
use orgchart_graph::schema::ensure_schema;
use orgchart_graph::{
    AccessMode, GraphClient, GraphConfig, GraphStore, OrgGraphRepository, Statement,
};

async fn connect_or_skip() -> Option<GraphClient> {
    let config = GraphConfig::default();
    match GraphClient::connect(&config).await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test (Neo4j not available): {e}");
            None
        }
    }
}

/// Suffix that keeps one test's nodes apart from everything else in the database.
fn unique_suffix() -> String {
    format!("-{}", uuid::Uuid::new_v4().simple())
}

async fn cleanup(client: &GraphClient, suffix: &str) {
    let mut txn = client.begin(AccessMode::Write).await.unwrap();
    let statement = Statement::new(
        "cleanup",
        "MATCH (n) WHERE (n:Employee OR n:Department) AND n.name ENDS WITH $suffix
         DETACH DELETE n",
    )
    .param("suffix", suffix);
    let _ = txn.execute(statement).await;
    let _ = txn.commit().await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_schema_is_idempotent() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    ensure_schema(&client).await.unwrap();
    ensure_schema(&client).await.unwrap();
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_link_is_idempotent() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let suffix = unique_suffix();
    let alice = format!("Alice{suffix}");
    let eng = format!("Eng{suffix}");

    let mut txn = client.begin(AccessMode::Write).await.unwrap();
    let mut repo = OrgGraphRepository::new(&mut *txn);
    repo.create_employee(&alice).await.unwrap();
    repo.create_department(&eng).await.unwrap();
    assert!(repo.link_works_in(&alice, &eng).await.unwrap());
    assert!(repo.link_works_in(&alice, &eng).await.unwrap());
    txn.commit().await.unwrap();

    let mut txn = client.begin(AccessMode::Read).await.unwrap();
    let mut repo = OrgGraphRepository::new(&mut *txn);
    let filter = EmployeeFilter {
        name: Some(alice.clone()),
        ..Default::default()
    };
    let records = repo.list_employees(&filter).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].position, Position::WorksIn);
    assert_eq!(records[0].department, eng);
    txn.rollback().await.unwrap();

    cleanup(&client, &suffix).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_delete_manager_hands_over() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let suffix = unique_suffix();
    let alice = format!("Alice{suffix}");
    let bob = format!("Bob{suffix}");
    let eng = format!("Eng{suffix}");

    let mut txn = client.begin(AccessMode::Write).await.unwrap();
    let mut repo = OrgGraphRepository::new(&mut *txn);
    let alice_id = repo.create_employee(&alice).await.unwrap().id;
    repo.create_employee(&bob).await.unwrap();
    let eng_id = repo.create_department(&eng).await.unwrap().id;
    repo.link_manages(&alice, &eng).await.unwrap();
    repo.link_works_in(&bob, &eng).await.unwrap();
    txn.commit().await.unwrap();

    let mut txn = client.begin(AccessMode::Write).await.unwrap();
    let mut repo = OrgGraphRepository::new(&mut *txn);
    let report = repo.delete_employee(&alice_id).await.unwrap();
    txn.commit().await.unwrap();
    assert!(matches!(
        report.handover,
        Some(Handover::Reassigned { ref manager, .. }) if manager.name == bob
    ));

    let mut txn = client.begin(AccessMode::Read).await.unwrap();
    let mut repo = OrgGraphRepository::new(&mut *txn);
    assert_eq!(
        repo.list_department_employees(&eng_id).await.unwrap(),
        vec![bob.clone()]
    );
    txn.rollback().await.unwrap();

    cleanup(&client, &suffix).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_delete_last_employee_removes_department() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let suffix = unique_suffix();
    let carl = format!("Carl{suffix}");
    let ops = format!("Ops{suffix}");

    let mut txn = client.begin(AccessMode::Write).await.unwrap();
    let mut repo = OrgGraphRepository::new(&mut *txn);
    let carl_id = repo.create_employee(&carl).await.unwrap().id;
    repo.create_department(&ops).await.unwrap();
    repo.link_manages(&carl, &ops).await.unwrap();
    repo.delete_employee(&carl_id).await.unwrap();
    assert!(!repo.department_name_taken(&ops).await.unwrap());
    txn.commit().await.unwrap();

    cleanup(&client, &suffix).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_summary_counts_members() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let suffix = unique_suffix();
    let dana = format!("Dana{suffix}");
    let eve = format!("Eve{suffix}");
    let ops = format!("Ops{suffix}");

    let mut txn = client.begin(AccessMode::Write).await.unwrap();
    let mut repo = OrgGraphRepository::new(&mut *txn);
    let dana_id = repo.create_employee(&dana).await.unwrap().id;
    repo.create_employee(&eve).await.unwrap();
    repo.create_department(&ops).await.unwrap();
    repo.link_works_in(&dana, &ops).await.unwrap();
    repo.link_works_in(&eve, &ops).await.unwrap();

    let summary = repo.employee_department_summary(&dana_id).await.unwrap();
    assert_eq!(summary.department_name, ops);
    assert_eq!(summary.num_employees, 2);
    txn.commit().await.unwrap();

    cleanup(&client, &suffix).await;
}
