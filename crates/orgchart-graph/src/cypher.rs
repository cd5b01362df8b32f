//! Cypher templates for the org chart graph.
//!
//! Every statement the repository runs is built here. Templates are fixed
//! strings; relationship types and sort directions are chosen by matching
//! on [`Position`] and [`SortOrder`], and all user-supplied text travels as
//! bound parameters.

use orgchart_core::{
    DepartmentFilter, DepartmentId, EmployeeFilter, EmployeeId, Position, SortOrder,
};

use crate::store::Statement;

// ── Node Creation ────────────────────────────────────────────────

pub fn create_employee(id: &EmployeeId, name: &str) -> Statement {
    Statement::new(
        "create_employee",
        "CREATE (e:Employee {id: $id, name: $name})",
    )
    .param("id", id.to_string())
    .param("name", name)
}

pub fn create_department(id: &DepartmentId, name: &str) -> Statement {
    Statement::new(
        "create_department",
        "CREATE (d:Department {id: $id, name: $name})",
    )
    .param("id", id.to_string())
    .param("name", name)
}

pub fn count_employees_named(name: &str) -> Statement {
    Statement::new(
        "count_employees_named",
        "MATCH (e:Employee {name: $name})
         RETURN count(e) AS count",
    )
    .param("name", name)
    .returns(&["count"])
}

pub fn count_departments_named(name: &str) -> Statement {
    Statement::new(
        "count_departments_named",
        "MATCH (d:Department {name: $name})
         RETURN count(d) AS count",
    )
    .param("name", name)
    .returns(&["count"])
}

// ── Linking by Name ──────────────────────────────────────────────

/// Ensure a WORKS_IN edge between the named employee and department,
/// dropping the employee's memberships elsewhere.
pub fn link_works_in(employee: &str, department: &str) -> Statement {
    Statement::new(
        "link_works_in",
        "MATCH (e:Employee {name: $employee})
         MATCH (d:Department {name: $department})
         OPTIONAL MATCH (e)-[old:WORKS_IN]->(other:Department)
         WHERE other <> d
         DELETE old
         MERGE (e)-[:WORKS_IN]->(d)
         RETURN count(DISTINCT e) AS linked",
    )
    .param("employee", employee)
    .param("department", department)
    .returns(&["linked"])
}

/// Departments other than `department` that the named employee manages.
pub fn managed_elsewhere(employee: &str, department: &str) -> Statement {
    Statement::new(
        "managed_elsewhere",
        "MATCH (e:Employee {name: $employee})-[:MANAGES]->(d:Department)
         WHERE d.name <> $department
         RETURN d.name AS department",
    )
    .param("employee", employee)
    .param("department", department)
    .returns(&["department"])
}

/// Ensure a MANAGES edge between the named employee and department,
/// replacing any other manager of that department.
pub fn link_manages(employee: &str, department: &str) -> Statement {
    Statement::new(
        "link_manages",
        "MATCH (e:Employee {name: $employee})
         MATCH (d:Department {name: $department})
         OPTIONAL MATCH (other:Employee)-[prev:MANAGES]->(d)
         WHERE other <> e
         DELETE prev
         MERGE (e)-[:MANAGES]->(d)
         RETURN count(DISTINCT e) AS linked",
    )
    .param("employee", employee)
    .param("department", department)
    .returns(&["linked"])
}

// ── Listings ─────────────────────────────────────────────────────

pub fn list_employees(filter: &EmployeeFilter) -> Statement {
    let mut conditions = Vec::new();
    if filter.name.is_some() {
        conditions.push("e.name CONTAINS $name");
    }
    if filter.department.is_some() {
        conditions.push("d.name CONTAINS $department");
    }
    if filter.position.is_some() {
        conditions.push("type(r) CONTAINS $position");
    }

    let mut cypher = String::from("MATCH (e:Employee)-[r:WORKS_IN|MANAGES]->(d:Department)");
    if !conditions.is_empty() {
        cypher.push_str("\nWHERE ");
        cypher.push_str(&conditions.join(" AND "));
    }
    cypher.push_str("\nRETURN e.name AS name, type(r) AS position, d.name AS department");
    push_order(&mut cypher, "e.name", filter.order);

    let mut stmt = Statement::new("list_employees", cypher)
        .returns(&["name", "position", "department"])
        .ordered(filter.order);
    if let Some(name) = &filter.name {
        stmt = stmt.param("name", name.as_str());
    }
    if let Some(department) = &filter.department {
        stmt = stmt.param("department", department.as_str());
    }
    if let Some(position) = &filter.position {
        stmt = stmt.param("position", position.as_str());
    }
    stmt
}

pub fn list_departments(filter: &DepartmentFilter) -> Statement {
    let mut cypher = String::from("MATCH (d:Department)");
    if filter.name.is_some() {
        cypher.push_str("\nWHERE d.name CONTAINS $name");
    }
    cypher.push_str("\nRETURN d.name AS name");
    push_order(&mut cypher, "d.name", filter.order);

    let mut stmt = Statement::new("list_departments", cypher)
        .returns(&["name"])
        .ordered(filter.order);
    if let Some(name) = &filter.name {
        stmt = stmt.param("name", name.as_str());
    }
    stmt
}

pub fn list_subordinates(manager: &EmployeeId) -> Statement {
    Statement::new(
        "list_subordinates",
        "MATCH (m:Employee {id: $id})-[:MANAGES]->(:Department)<-[:WORKS_IN]-(e:Employee)
         WHERE e <> m
         RETURN DISTINCT e.name AS name
         ORDER BY name",
    )
    .param("id", manager.to_string())
    .returns(&["name"])
}

pub fn list_department_employees(department: &DepartmentId) -> Statement {
    Statement::new(
        "list_department_employees",
        "MATCH (d:Department {id: $id})<-[:WORKS_IN]-(e:Employee)
         RETURN e.name AS name
         ORDER BY name",
    )
    .param("id", department.to_string())
    .returns(&["name"])
}

pub fn employee_department_summary(employee: &EmployeeId) -> Statement {
    Statement::new(
        "employee_department_summary",
        "MATCH (e:Employee {id: $id})-[:WORKS_IN]->(d:Department)
         RETURN d.name AS department_name,
                size([(d)<-[:WORKS_IN]-() | 1]) AS num_employees
         LIMIT 1",
    )
    .param("id", employee.to_string())
    .returns(&["department_name", "num_employees"])
}

// ── Lookups by Id ────────────────────────────────────────────────

pub fn employee_name(id: &EmployeeId) -> Statement {
    Statement::new(
        "employee_name",
        "MATCH (e:Employee {id: $id})
         RETURN e.name AS name",
    )
    .param("id", id.to_string())
    .returns(&["name"])
}

pub fn department_by_name(name: &str) -> Statement {
    Statement::new(
        "department_by_name",
        "MATCH (d:Department {name: $name})
         RETURN d.id AS id, d.name AS name
         LIMIT 1",
    )
    .param("name", name)
    .returns(&["id", "name"])
}

/// The employee's department relationships, membership first.
pub fn employee_relationships(id: &EmployeeId) -> Statement {
    Statement::new(
        "employee_relationships",
        "MATCH (e:Employee {id: $id})-[r:WORKS_IN|MANAGES]->(d:Department)
         RETURN type(r) AS position, d.id AS department_id, d.name AS department
         ORDER BY position DESC, department",
    )
    .param("id", id.to_string())
    .returns(&["position", "department_id", "department"])
}

pub fn managed_departments(id: &EmployeeId) -> Statement {
    Statement::new(
        "managed_departments",
        "MATCH (e:Employee {id: $id})-[:MANAGES]->(d:Department)
         RETURN d.id AS id, d.name AS name
         ORDER BY name",
    )
    .param("id", id.to_string())
    .returns(&["id", "name"])
}

/// Members of a department other than `leaving`, with how many *other*
/// departments each of them already manages. Free candidates come first.
pub fn management_candidates(department: &DepartmentId, leaving: &EmployeeId) -> Statement {
    Statement::new(
        "management_candidates",
        "MATCH (c:Employee)-[:WORKS_IN]->(d:Department {id: $department_id})
         WHERE c.id <> $id
         RETURN c.id AS id, c.name AS name,
                size([(c)-[:MANAGES]->(o:Department) WHERE o <> d | o]) AS managed
         ORDER BY managed ASC, name ASC",
    )
    .param("department_id", department.to_string())
    .param("id", leaving.to_string())
    .returns(&["id", "name", "managed"])
}

// ── Mutations by Id ──────────────────────────────────────────────

pub fn rename_employee(id: &EmployeeId, name: &str) -> Statement {
    Statement::new(
        "rename_employee",
        "MATCH (e:Employee {id: $id})
         SET e.name = $name",
    )
    .param("id", id.to_string())
    .param("name", name)
}

/// Remove one relationship of the given type between an employee and a department.
pub fn delete_relationship(
    id: &EmployeeId,
    position: Position,
    department: &DepartmentId,
) -> Statement {
    let (name, cypher) = match position {
        Position::WorksIn => (
            "delete_works_in",
            "MATCH (e:Employee {id: $id})-[r:WORKS_IN]->(d:Department {id: $department_id})
             DELETE r",
        ),
        Position::Manages => (
            "delete_manages",
            "MATCH (e:Employee {id: $id})-[r:MANAGES]->(d:Department {id: $department_id})
             DELETE r",
        ),
    };
    Statement::new(name, cypher)
        .param("id", id.to_string())
        .param("department_id", department.to_string())
}

/// Ensure a relationship of the given type between an employee and a
/// department. A new membership drops the employee's other
/// memberships, a new management replaces the department's other manager.
pub fn assign_relationship(
    id: &EmployeeId,
    position: Position,
    department: &DepartmentId,
) -> Statement {
    let (name, cypher) = match position {
        Position::WorksIn => (
            "assign_works_in",
            "MATCH (e:Employee {id: $id})
             MATCH (d:Department {id: $department_id})
             OPTIONAL MATCH (e)-[old:WORKS_IN]->(other:Department)
             WHERE other <> d
             DELETE old
             MERGE (e)-[:WORKS_IN]->(d)
             RETURN count(DISTINCT e) AS linked",
        ),
        Position::Manages => (
            "assign_manages",
            "MATCH (e:Employee {id: $id})
             MATCH (d:Department {id: $department_id})
             OPTIONAL MATCH (other:Employee)-[prev:MANAGES]->(d)
             WHERE other <> e
             DELETE prev
             MERGE (e)-[:MANAGES]->(d)
             RETURN count(DISTINCT e) AS linked",
        ),
    };
    Statement::new(name, cypher)
        .param("id", id.to_string())
        .param("department_id", department.to_string())
        .returns(&["linked"])
}

pub fn delete_department(id: &DepartmentId) -> Statement {
    Statement::new(
        "delete_department",
        "MATCH (d:Department {id: $department_id})
         DETACH DELETE d",
    )
    .param("department_id", id.to_string())
}

pub fn delete_employee(id: &EmployeeId) -> Statement {
    Statement::new(
        "delete_employee",
        "MATCH (e:Employee {id: $id})
         DETACH DELETE e",
    )
    .param("id", id.to_string())
}

// ── Helpers ──────────────────────────────────────────────────────

fn push_order(cypher: &mut String, key: &str, order: Option<SortOrder>) {
    if let Some(order) = order {
        cypher.push_str("\nORDER BY ");
        cypher.push_str(key);
        cypher.push(' ');
        cypher.push_str(order.as_cypher());
    }
}
