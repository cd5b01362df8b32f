//! Demo organization used to populate an empty graph.

use serde::Serialize;

use orgchart_core::{OrgError, Result};

use crate::repository::OrgGraphRepository;

const EMPLOYEES: [&str; 20] = [
    "John Doe",
    "Jane Smith",
    "Robert Johnson",
    "Michael Williams",
    "Sarah Brown",
    "James Jones",
    "Patricia Miller",
    "Richard Davis",
    "Linda Garcia",
    "Charles Rodriguez",
    "Elizabeth Martinez",
    "Thomas Wilson",
    "Jennifer Moore",
    "Joseph Taylor",
    "Susan Anderson",
    "William Thomas",
    "Jessica Jackson",
    "David White",
    "Mary Harris",
    "Kenneth Martin",
];

const DEPARTMENTS: [&str; 4] = ["HR", "Sales", "IT", "Marketing"];

/// A set of employees, departments and the edges between them, by name.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub employees: Vec<String>,
    pub departments: Vec<String>,
    /// (employee, department) pairs linked with WORKS_IN.
    pub memberships: Vec<(String, String)>,
    /// (employee, department) pairs linked with MANAGES.
    pub managers: Vec<(String, String)>,
}

/// What [`load`] wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub employees: usize,
    pub departments: usize,
    pub memberships: usize,
    pub managers: usize,
}

/// Twenty employees over four departments.
///
/// The first four employees manage one department each; everyone else is
/// spread over the departments round robin.
pub fn demo_org() -> Dataset {
    let employees: Vec<String> = EMPLOYEES.iter().map(|s| s.to_string()).collect();
    let departments: Vec<String> = DEPARTMENTS.iter().map(|s| s.to_string()).collect();

    let memberships = employees[DEPARTMENTS.len()..]
        .iter()
        .zip(departments.iter().cycle())
        .map(|(e, d)| (e.clone(), d.clone()))
        .collect();
    let managers = employees
        .iter()
        .zip(departments.iter())
        .map(|(e, d)| (e.clone(), d.clone()))
        .collect();

    Dataset {
        employees,
        departments,
        memberships,
        managers,
    }
}

/// Write `dataset` through the repository, inside the caller's transaction.
///
/// Every edge must land: a pair naming an unknown employee or department
/// is a validation error and the caller's transaction should roll back.
pub async fn load(repo: &mut OrgGraphRepository<'_>, dataset: &Dataset) -> Result<SeedReport> {
    for name in &dataset.employees {
        repo.create_employee(name).await?;
    }
    for name in &dataset.departments {
        repo.create_department(name).await?;
    }
    for (employee, department) in &dataset.memberships {
        if !repo.link_works_in(employee, department).await? {
            return Err(unlinked("WORKS_IN", employee, department));
        }
    }
    for (employee, department) in &dataset.managers {
        if !repo.link_manages(employee, department).await? {
            return Err(unlinked("MANAGES", employee, department));
        }
    }

    let report = SeedReport {
        employees: dataset.employees.len(),
        departments: dataset.departments.len(),
        memberships: dataset.memberships.len(),
        managers: dataset.managers.len(),
    };
    tracing::info!(
        employees = report.employees,
        departments = report.departments,
        memberships = report.memberships,
        managers = report.managers,
        "Seeded graph"
    );
    Ok(report)
}

fn unlinked(kind: &str, employee: &str, department: &str) -> OrgError {
    OrgError::validation(format!(
        "cannot link {employee} {kind} {department}: unknown employee or department"
    ))
}
