//! Endpoint behavior over the in-memory graph store.

use serde_json::json;

use orgchart_api::requests::{
    DepartmentQuery, EmployeeChanges, EmployeeQuery, NewDepartment, NewEmployee,
    RelationshipRequest,
};
use orgchart_api::{ApiResponse, OrgApi};
use orgchart_core::{EmployeeId, Position};
use orgchart_graph::seed::demo_org;
use orgchart_graph::{cypher, AccessMode, GraphStore, MemoryGraph};

fn employee(name: &str) -> Option<NewEmployee> {
    Some(NewEmployee {
        name: Some(name.to_string()),
    })
}

fn department(name: &str) -> Option<NewDepartment> {
    Some(NewDepartment {
        name: Some(name.to_string()),
    })
}

fn relationship(employee: &str, department: &str) -> Option<RelationshipRequest> {
    Some(RelationshipRequest {
        employee: Some(employee.to_string()),
        department: Some(department.to_string()),
    })
}

fn created_id(response: &ApiResponse) -> String {
    assert_eq!(response.status, 201, "{:?}", response.body);
    response.body["id"].as_str().unwrap().to_string()
}

fn message(response: &ApiResponse) -> &str {
    response.body["message"].as_str().unwrap()
}

struct Fixture {
    graph: MemoryGraph,
    api: OrgApi,
    alice: String,
    bob: String,
    eng: String,
}

/// Alice manages Eng, Bob works in Eng.
async fn fixture() -> Fixture {
    let graph = MemoryGraph::new();
    let api = OrgApi::new(graph.clone());

    let alice = created_id(&api.add_employee(employee("Alice")).await);
    let bob = created_id(&api.add_employee(employee("Bob")).await);
    let eng = created_id(&api.add_department(department("Eng")).await);
    assert_eq!(api.add_manages(relationship("Alice", "Eng")).await.status, 201);
    assert_eq!(api.add_works_in(relationship("Bob", "Eng")).await.status, 201);

    Fixture {
        graph,
        api,
        alice,
        bob,
        eng,
    }
}

// ── Creation ─────────────────────────────────────────────────────

#[tokio::test]
async fn add_employee_rejects_missing_and_duplicate_names() {
    let graph = MemoryGraph::new();
    let api = OrgApi::new(graph.clone());

    let response = api.add_employee(None).await;
    assert_eq!(response.status, 400);
    assert_eq!(message(&response), "Request body is empty or wrong data");

    assert_eq!(api.add_employee(employee("")).await.status, 400);

    let response = api.add_employee(employee("Ada")).await;
    assert_eq!(message(&response), "Employee created successfully");
    created_id(&response);

    let response = api.add_employee(employee("Ada")).await;
    assert_eq!(response.status, 400);
    assert!(message(&response).contains("Employee already exists"));

    // A longer name containing an existing one is not a duplicate.
    created_id(&api.add_employee(employee("Ada Lovelace")).await);
    assert_eq!(graph.employee_names().await, vec!["Ada", "Ada Lovelace"]);
}

#[tokio::test]
async fn add_department_rejects_missing_and_duplicate_names() {
    let graph = MemoryGraph::new();
    let api = OrgApi::new(graph.clone());

    assert_eq!(api.add_department(None).await.status, 400);
    created_id(&api.add_department(department("Ops")).await);

    let response = api.add_department(department("Ops")).await;
    assert_eq!(response.status, 400);
    assert!(message(&response).contains("Department already exists"));
    assert_eq!(graph.department_names().await, vec!["Ops"]);
}

#[tokio::test]
async fn relationship_requests_need_both_names() {
    let f = fixture().await;

    let response = f.api.add_works_in(None).await;
    assert_eq!(response.status, 400);
    assert_eq!(message(&response), "Request body is empty");

    let partial = Some(RelationshipRequest {
        employee: Some("Bob".to_string()),
        department: None,
    });
    assert_eq!(f.api.add_manages(partial).await.status, 400);
}

#[tokio::test]
async fn linking_unknown_names_still_succeeds() {
    let f = fixture().await;

    let response = f.api.add_works_in(relationship("Nobody", "Eng")).await;
    assert_eq!(response.status, 201);
    assert_eq!(response.body["linked"], json!(false));
    assert_eq!(f.graph.relationships().await.len(), 2);
}

#[tokio::test]
async fn managing_two_departments_is_a_bad_request() {
    let f = fixture().await;
    created_id(&f.api.add_department(department("Ops")).await);

    let response = f.api.add_manages(relationship("Alice", "Ops")).await;
    assert_eq!(response.status, 400);
    assert!(message(&response).contains("already manages"));
}

// ── Listings ─────────────────────────────────────────────────────

#[tokio::test]
async fn employee_listing_filters_by_department() {
    let graph = MemoryGraph::new();
    let api = OrgApi::new(graph.clone());
    assert_eq!(api.seed(&demo_org()).await.status, 201);

    let query = EmployeeQuery {
        department: Some("Sal".to_string()),
        order: Some("asc".to_string()),
        ..Default::default()
    };
    let response = api.list_employees(&query).await;
    assert_eq!(response.status, 200);

    let records = response.body.as_array().unwrap();
    assert_eq!(records.len(), 5);
    assert_eq!(
        records[3],
        json!({ "name": "Jane Smith", "position": "MANAGES", "department": "Sales" })
    );
    assert!(records
        .iter()
        .all(|r| r["department"] == "Sales"));
}

#[tokio::test]
async fn invalid_order_is_a_bad_request() {
    let f = fixture().await;

    let query = EmployeeQuery {
        order: Some("random".to_string()),
        ..Default::default()
    };
    assert_eq!(f.api.list_employees(&query).await.status, 400);

    let query = DepartmentQuery {
        order: Some("random".to_string()),
        ..Default::default()
    };
    assert_eq!(f.api.list_departments(&query).await.status, 400);
}

#[tokio::test]
async fn department_listing_is_ordered() {
    let f = fixture().await;
    created_id(&f.api.add_department(department("Design")).await);

    let query = DepartmentQuery {
        order: Some("DESC".to_string()),
        ..Default::default()
    };
    let response = f.api.list_departments(&query).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!(["Eng", "Design"]));
}

#[tokio::test]
async fn id_lookups() {
    let f = fixture().await;

    let response = f.api.subordinates(&f.alice).await;
    assert_eq!(response.body, json!(["Bob"]));

    let response = f.api.department_employees(&f.eng).await;
    assert_eq!(response.body, json!(["Bob"]));

    let response = f.api.employee_department(&f.bob).await;
    assert_eq!(response.status, 200);
    assert_eq!(
        response.body,
        json!({ "department_name": "Eng", "num_employees": 1 })
    );

    let response = f.api.employee_department(&f.alice).await;
    assert_eq!(response.status, 404);
    assert_eq!(
        message(&response),
        "Employee not found or does not work in a department"
    );
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let f = fixture().await;

    assert_eq!(f.api.subordinates("42").await.status, 400);
    assert_eq!(f.api.department_employees("not-a-uuid").await.status, 400);
    assert_eq!(f.api.employee_department("42").await.status, 400);
    assert_eq!(f.api.delete_employee("42").await.status, 400);
    let changes = EmployeeChanges {
        name: Some("X".to_string()),
        ..Default::default()
    };
    assert_eq!(f.api.update_employee("42", Some(changes)).await.status, 400);
}

// ── Update and delete ────────────────────────────────────────────

#[tokio::test]
async fn update_employee_statuses() {
    let f = fixture().await;

    let response = f.api.update_employee(&f.bob, None).await;
    assert_eq!(response.status, 400);
    assert_eq!(message(&response), "No JSON data provided");

    let bad_position = EmployeeChanges {
        position: Some("INTERN".to_string()),
        ..Default::default()
    };
    assert_eq!(
        f.api.update_employee(&f.bob, Some(bad_position)).await.status,
        400
    );

    let rename = EmployeeChanges {
        name: Some("Robert".to_string()),
        ..Default::default()
    };
    let unknown = EmployeeId::new().to_string();
    assert_eq!(
        f.api.update_employee(&unknown, Some(rename.clone())).await.status,
        404
    );

    let response = f.api.update_employee(&f.bob, Some(rename)).await;
    assert_eq!(response.status, 200);
    assert_eq!(message(&response), "Employee updated successfully");
    assert_eq!(f.graph.employee_names().await, vec!["Alice", "Robert"]);
}

#[tokio::test]
async fn promotion_replaces_the_manager() {
    let f = fixture().await;

    let promote = EmployeeChanges {
        position: Some("MANAGES".to_string()),
        ..Default::default()
    };
    assert_eq!(f.api.update_employee(&f.bob, Some(promote)).await.status, 200);

    let relationships = f.graph.relationships().await;
    assert_eq!(relationships.len(), 1);
    assert_eq!(relationships[0].employee, "Bob");
    assert_eq!(relationships[0].position, Position::Manages);
}

#[tokio::test]
async fn delete_reports_the_handover() {
    let f = fixture().await;

    let unknown = EmployeeId::new().to_string();
    assert_eq!(f.api.delete_employee(&unknown).await.status, 404);

    let response = f.api.delete_employee(&f.alice).await;
    assert_eq!(response.status, 200);
    assert_eq!(message(&response), "Employee deleted successfully");
    assert_eq!(response.body["handover"]["outcome"], "reassigned");
    assert_eq!(response.body["handover"]["manager"]["name"], "Bob");

    let response = f.api.department_employees(&f.eng).await;
    assert_eq!(response.body, json!(["Bob"]));
}

#[tokio::test]
async fn deleting_a_manager_whose_members_all_manage_elsewhere_succeeds() {
    let f = fixture().await;
    created_id(&f.api.add_department(department("Ops")).await);
    assert_eq!(f.api.add_manages(relationship("Bob", "Ops")).await.status, 201);

    let response = f.api.delete_employee(&f.alice).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body["handover"]["outcome"], "unmanaged");
    assert_eq!(response.body["handover"]["department"]["name"], "Eng");
    assert_eq!(f.graph.employee_names().await, vec!["Bob"]);
    assert_eq!(f.graph.relationships().await.len(), 2);
}

#[tokio::test]
async fn sole_manager_stepping_down_is_a_bad_request() {
    let graph = MemoryGraph::new();
    let api = OrgApi::new(graph.clone());
    let dana = created_id(&api.add_employee(employee("Dana")).await);
    created_id(&api.add_department(department("Eng")).await);
    assert_eq!(api.add_manages(relationship("Dana", "Eng")).await.status, 201);

    let step_down = EmployeeChanges {
        position: Some("WORKS_IN".to_string()),
        ..Default::default()
    };
    let response = api.update_employee(&dana, Some(step_down)).await;
    assert_eq!(response.status, 400);
    assert!(message(&response).contains("only member"));
    assert_eq!(graph.relationships().await.len(), 1);
    assert_eq!(graph.relationships().await[0].position, Position::Manages);
}

#[tokio::test]
async fn inconsistent_graph_is_a_server_error_and_changes_nothing() {
    let f = fixture().await;
    let ops = created_id(&f.api.add_department(department("Ops")).await);

    // Force Alice onto a second department behind the API's back.
    let mut txn = f.graph.begin(AccessMode::Write).await.unwrap();
    txn.execute(cypher::assign_relationship(
        &f.alice.parse().unwrap(),
        Position::Manages,
        &ops.parse().unwrap(),
    ))
    .await
    .unwrap();
    txn.commit().await.unwrap();

    let response = f.api.delete_employee(&f.alice).await;
    assert_eq!(response.status, 500);
    assert_eq!(f.graph.employee_names().await, vec!["Alice", "Bob"]);
    assert_eq!(f.graph.relationships().await.len(), 3);
}

#[tokio::test]
async fn seed_reports_what_it_wrote() {
    let graph = MemoryGraph::new();
    let api = OrgApi::new(graph.clone());

    let response = api.seed(&demo_org()).await;
    assert_eq!(response.status, 201);
    assert_eq!(
        response.body,
        json!({ "employees": 20, "departments": 4, "memberships": 16, "managers": 4 })
    );
}
