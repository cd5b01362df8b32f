//! The org chart API: one method per endpoint, each running in its own
//! transaction against the injected graph store.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use orgchart_core::{
    DeletionReport, Department, DepartmentId, DepartmentSummary, Employee, EmployeeId,
    EmployeeRecord, OrgError, Result,
};
use orgchart_graph::seed::{self, Dataset, SeedReport};
use orgchart_graph::{finish, AccessMode, GraphStore, OrgGraphRepository};

use crate::requests::{
    non_empty, DepartmentQuery, EmployeeChanges, EmployeeQuery, NewDepartment, NewEmployee,
    RelationshipRequest,
};

pub const OK: u16 = 200;
pub const CREATED: u16 = 201;
pub const BAD_REQUEST: u16 = 400;
pub const NOT_FOUND: u16 = 404;
pub const INTERNAL_ERROR: u16 = 500;

/// A status code and a JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn message(status: u16, message: impl Into<String>) -> Self {
        Self::new(status, json!({ "message": message.into() }))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn from_result<T: Serialize>(result: Result<T>, status: u16) -> Self {
        match result.and_then(|value| Ok(serde_json::to_value(value)?)) {
            Ok(body) => Self::new(status, body),
            Err(err) => err.into(),
        }
    }
}

impl From<OrgError> for ApiResponse {
    fn from(err: OrgError) -> Self {
        let status = match &err {
            OrgError::Validation(_) => BAD_REQUEST,
            OrgError::NotFound { .. } => NOT_FOUND,
            OrgError::Store(_)
            | OrgError::Consistency(_)
            | OrgError::Config(_)
            | OrgError::Serialization(_) => INTERNAL_ERROR,
        };
        if status == INTERNAL_ERROR {
            tracing::error!(error = %err, "Request failed");
        } else {
            tracing::debug!(error = %err, status, "Request rejected");
        }
        Self::message(status, err.to_string())
    }
}

/// Which edge a relationship request creates.
#[derive(Debug, Clone, Copy)]
enum Link {
    WorksIn,
    Manages,
}

/// Org chart endpoints over a shared graph store.
///
/// Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct OrgApi {
    store: Arc<dyn GraphStore>,
}

impl OrgApi {
    pub fn new(store: impl GraphStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    // ── Endpoints ────────────────────────────────────────────────

    /// `POST /employees`
    pub async fn add_employee(&self, body: Option<NewEmployee>) -> ApiResponse {
        let Some(name) = body.as_ref().and_then(|b| non_empty(&b.name)) else {
            return ApiResponse::message(BAD_REQUEST, "Request body is empty or wrong data");
        };
        match self.create_employee(name).await {
            Ok(employee) => ApiResponse::new(
                CREATED,
                json!({ "message": "Employee created successfully", "id": employee.id }),
            ),
            Err(err) => err.into(),
        }
    }

    /// `POST /department`
    pub async fn add_department(&self, body: Option<NewDepartment>) -> ApiResponse {
        let Some(name) = body.as_ref().and_then(|b| non_empty(&b.name)) else {
            return ApiResponse::message(BAD_REQUEST, "Request body is empty or wrong data");
        };
        match self.create_department(name).await {
            Ok(department) => ApiResponse::new(
                CREATED,
                json!({ "message": "Department created successfully", "id": department.id }),
            ),
            Err(err) => err.into(),
        }
    }

    /// `POST /relationship/works-in`
    pub async fn add_works_in(&self, body: Option<RelationshipRequest>) -> ApiResponse {
        self.add_relationship(body, Link::WorksIn).await
    }

    /// `POST /relationship/manages`
    pub async fn add_manages(&self, body: Option<RelationshipRequest>) -> ApiResponse {
        self.add_relationship(body, Link::Manages).await
    }

    /// `GET /employees`
    pub async fn list_employees(&self, query: &EmployeeQuery) -> ApiResponse {
        ApiResponse::from_result(self.employees(query).await, OK)
    }

    /// `PUT /employees/{id}`
    pub async fn update_employee(&self, id: &str, body: Option<EmployeeChanges>) -> ApiResponse {
        let Some(body) = body else {
            return ApiResponse::message(BAD_REQUEST, "No JSON data provided");
        };
        match self.apply_update(id, body).await {
            Ok(()) => ApiResponse::message(OK, "Employee updated successfully"),
            Err(err) => err.into(),
        }
    }

    /// `DELETE /employees/{id}`
    pub async fn delete_employee(&self, id: &str) -> ApiResponse {
        match self.remove_employee(id).await {
            Ok(report) => ApiResponse::new(
                OK,
                json!({ "message": "Employee deleted successfully", "handover": report.handover }),
            ),
            Err(err) => err.into(),
        }
    }

    /// `GET /employees/{id}/subordinates`
    pub async fn subordinates(&self, id: &str) -> ApiResponse {
        ApiResponse::from_result(self.subordinate_names(id).await, OK)
    }

    /// `GET /departments`
    pub async fn list_departments(&self, query: &DepartmentQuery) -> ApiResponse {
        ApiResponse::from_result(self.departments(query).await, OK)
    }

    /// `GET /departments/{id}/employees`
    pub async fn department_employees(&self, id: &str) -> ApiResponse {
        ApiResponse::from_result(self.member_names(id).await, OK)
    }

    /// `GET /employees/{id}/department`
    pub async fn employee_department(&self, id: &str) -> ApiResponse {
        match self.department_summary(id).await {
            Ok(summary) => ApiResponse::from_result(Ok(summary), OK),
            Err(OrgError::NotFound { .. }) => ApiResponse::message(
                NOT_FOUND,
                "Employee not found or does not work in a department",
            ),
            Err(err) => err.into(),
        }
    }

    /// Load `dataset` in a single write transaction.
    pub async fn seed(&self, dataset: &Dataset) -> ApiResponse {
        ApiResponse::from_result(self.load_dataset(dataset).await, CREATED)
    }

    // ── Transactional work ───────────────────────────────────────

    async fn create_employee(&self, name: &str) -> Result<Employee> {
        let mut txn = self.store.begin(AccessMode::Write).await?;
        let mut repo = OrgGraphRepository::new(&mut *txn);
        let outcome = match repo.employee_name_taken(name).await {
            Ok(true) => Err(OrgError::validation("Employee already exists")),
            Ok(false) => repo.create_employee(name).await,
            Err(err) => Err(err),
        };
        finish(txn, outcome).await
    }

    async fn create_department(&self, name: &str) -> Result<Department> {
        let mut txn = self.store.begin(AccessMode::Write).await?;
        let mut repo = OrgGraphRepository::new(&mut *txn);
        let outcome = match repo.department_name_taken(name).await {
            Ok(true) => Err(OrgError::validation("Department already exists")),
            Ok(false) => repo.create_department(name).await,
            Err(err) => Err(err),
        };
        finish(txn, outcome).await
    }

    async fn add_relationship(&self, body: Option<RelationshipRequest>, link: Link) -> ApiResponse {
        let Some(body) = body else {
            return ApiResponse::message(BAD_REQUEST, "Request body is empty");
        };
        match self.link(&body, link).await {
            Ok(linked) => ApiResponse::new(
                CREATED,
                json!({ "message": "Relationship created successfully", "linked": linked }),
            ),
            Err(err) => err.into(),
        }
    }

    async fn link(&self, body: &RelationshipRequest, link: Link) -> Result<bool> {
        let (employee, department) = body.names()?;
        let mut txn = self.store.begin(AccessMode::Write).await?;
        let mut repo = OrgGraphRepository::new(&mut *txn);
        let outcome = match link {
            Link::WorksIn => repo.link_works_in(employee, department).await,
            Link::Manages => repo.link_manages(employee, department).await,
        };
        finish(txn, outcome).await
    }

    async fn employees(&self, query: &EmployeeQuery) -> Result<Vec<EmployeeRecord>> {
        let filter = query.to_filter()?;
        let mut txn = self.store.begin(AccessMode::Read).await?;
        let outcome = OrgGraphRepository::new(&mut *txn)
            .list_employees(&filter)
            .await;
        finish(txn, outcome).await
    }

    async fn apply_update(&self, id: &str, body: EmployeeChanges) -> Result<()> {
        let id: EmployeeId = id.parse()?;
        let update = body.into_update()?;
        let mut txn = self.store.begin(AccessMode::Write).await?;
        let outcome = OrgGraphRepository::new(&mut *txn)
            .update_employee(&id, &update)
            .await;
        finish(txn, outcome).await
    }

    async fn remove_employee(&self, id: &str) -> Result<DeletionReport> {
        let id: EmployeeId = id.parse()?;
        let mut txn = self.store.begin(AccessMode::Write).await?;
        let outcome = OrgGraphRepository::new(&mut *txn).delete_employee(&id).await;
        finish(txn, outcome).await
    }

    async fn subordinate_names(&self, id: &str) -> Result<Vec<String>> {
        let id: EmployeeId = id.parse()?;
        let mut txn = self.store.begin(AccessMode::Read).await?;
        let outcome = OrgGraphRepository::new(&mut *txn)
            .list_subordinates(&id)
            .await;
        finish(txn, outcome).await
    }

    async fn departments(&self, query: &DepartmentQuery) -> Result<Vec<String>> {
        let filter = query.to_filter()?;
        let mut txn = self.store.begin(AccessMode::Read).await?;
        let outcome = OrgGraphRepository::new(&mut *txn)
            .list_departments(&filter)
            .await;
        finish(txn, outcome).await
    }

    async fn member_names(&self, id: &str) -> Result<Vec<String>> {
        let id: DepartmentId = id.parse()?;
        let mut txn = self.store.begin(AccessMode::Read).await?;
        let outcome = OrgGraphRepository::new(&mut *txn)
            .list_department_employees(&id)
            .await;
        finish(txn, outcome).await
    }

    async fn department_summary(&self, id: &str) -> Result<DepartmentSummary> {
        let id: EmployeeId = id.parse()?;
        let mut txn = self.store.begin(AccessMode::Read).await?;
        let outcome = OrgGraphRepository::new(&mut *txn)
            .employee_department_summary(&id)
            .await;
        finish(txn, outcome).await
    }

    async fn load_dataset(&self, dataset: &Dataset) -> Result<SeedReport> {
        let mut txn = self.store.begin(AccessMode::Write).await?;
        let mut repo = OrgGraphRepository::new(&mut *txn);
        let outcome = seed::load(&mut repo, dataset).await;
        finish(txn, outcome).await
    }
}
