//! The org chart repository: domain operations over one open transaction.
//!
//! A repository borrows a transaction for its whole lifetime and never opens,
//! commits, or rolls back anything itself. Multi-step operations
//! (`update_employee`, `delete_employee`) therefore commit or roll back as a
//! unit together with whatever else the caller ran in the same transaction.
//!
//! Structural rules held by the write paths:
//! - a department with members has exactly one manager;
//! - an employee has at most one WORKS_IN and at most one MANAGES edge;
//! - removing a department's manager hands management to another member,
//!   or removes the department once nobody is left in it.

use std::fmt::Display;
use std::str::FromStr;

use orgchart_core::{
    DeletionReport, Department, DepartmentFilter, DepartmentId, DepartmentSummary, Employee,
    EmployeeFilter, EmployeeId, EmployeeRecord, EmployeeUpdate, Handover, OrgError, Position,
    Result,
};

use crate::client::GraphError;
use crate::cypher;
use crate::store::{GraphTxn, Record, Statement};

/// What to do with a department whose manager leaves it without members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WhenEmpty {
    Remove,
    Keep,
}

/// Org chart operations bound to a single transaction.
pub struct OrgGraphRepository<'t> {
    txn: &'t mut dyn GraphTxn,
}

impl<'t> OrgGraphRepository<'t> {
    pub fn new(txn: &'t mut dyn GraphTxn) -> Self {
        Self { txn }
    }

    async fn run(&mut self, statement: Statement) -> Result<Vec<Record>> {
        Ok(self.txn.execute(statement).await?)
    }

    // ── Creation ─────────────────────────────────────────────────

    /// Create an employee with a fresh id. Names are not checked for uniqueness.
    pub async fn create_employee(&mut self, name: &str) -> Result<Employee> {
        let employee = Employee {
            id: EmployeeId::new(),
            name: name.to_string(),
        };
        self.run(cypher::create_employee(&employee.id, &employee.name))
            .await?;
        tracing::info!(id = %employee.id, name = %employee.name, "Created employee");
        Ok(employee)
    }

    /// Create a department with a fresh id. Names are not checked for uniqueness.
    pub async fn create_department(&mut self, name: &str) -> Result<Department> {
        let department = Department {
            id: DepartmentId::new(),
            name: name.to_string(),
        };
        self.run(cypher::create_department(&department.id, &department.name))
            .await?;
        tracing::info!(id = %department.id, name = %department.name, "Created department");
        Ok(department)
    }

    /// Whether an employee with exactly this name exists.
    pub async fn employee_name_taken(&mut self, name: &str) -> Result<bool> {
        let rows = self.run(cypher::count_employees_named(name)).await?;
        Ok(first_count(&rows, "count")? > 0)
    }

    /// Whether a department with exactly this name exists.
    pub async fn department_name_taken(&mut self, name: &str) -> Result<bool> {
        let rows = self.run(cypher::count_departments_named(name)).await?;
        Ok(first_count(&rows, "count")? > 0)
    }

    // ── Linking ──────────────────────────────────────────────────

    /// Make the named employee a member of the named department.
    ///
    /// Idempotent. Returns `false` without error when either side does not
    /// exist. Memberships in other departments are dropped.
    pub async fn link_works_in(&mut self, employee: &str, department: &str) -> Result<bool> {
        let rows = self.run(cypher::link_works_in(employee, department)).await?;
        let linked = first_count(&rows, "linked")? > 0;
        tracing::debug!(employee, department, linked, "Linked WORKS_IN");
        Ok(linked)
    }

    /// Make the named employee the manager of the named department.
    ///
    /// Idempotent. Returns `false` without error when either side does not
    /// exist. The department's previous manager, if any, is replaced. Fails
    /// with a validation error if the employee already manages another
    /// department.
    pub async fn link_manages(&mut self, employee: &str, department: &str) -> Result<bool> {
        let rows = self
            .run(cypher::managed_elsewhere(employee, department))
            .await?;
        if let Some(row) = rows.first() {
            return Err(OrgError::validation(format!(
                "{employee} already manages department {}",
                row.get_str("department")?
            )));
        }

        let rows = self.run(cypher::link_manages(employee, department)).await?;
        let linked = first_count(&rows, "linked")? > 0;
        tracing::debug!(employee, department, linked, "Linked MANAGES");
        Ok(linked)
    }

    // ── Listings ─────────────────────────────────────────────────

    /// One record per (employee, department relationship) matching `filter`.
    /// Employees without any department relationship are not listed.
    pub async fn list_employees(&mut self, filter: &EmployeeFilter) -> Result<Vec<EmployeeRecord>> {
        let rows = self.run(cypher::list_employees(filter)).await?;
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(EmployeeRecord {
                name: row.get_str("name")?.to_string(),
                position: decode(&row, "position")?,
                department: row.get_str("department")?.to_string(),
            });
        }
        Ok(records)
    }

    pub async fn list_departments(&mut self, filter: &DepartmentFilter) -> Result<Vec<String>> {
        let rows = self.run(cypher::list_departments(filter)).await?;
        names(&rows)
    }

    /// Members of the departments `manager` manages, excluding the manager.
    pub async fn list_subordinates(&mut self, manager: &EmployeeId) -> Result<Vec<String>> {
        let rows = self.run(cypher::list_subordinates(manager)).await?;
        names(&rows)
    }

    pub async fn list_department_employees(
        &mut self,
        department: &DepartmentId,
    ) -> Result<Vec<String>> {
        let rows = self
            .run(cypher::list_department_employees(department))
            .await?;
        names(&rows)
    }

    /// The department the employee works in and how many members it has.
    pub async fn employee_department_summary(
        &mut self,
        employee: &EmployeeId,
    ) -> Result<DepartmentSummary> {
        let rows = self
            .run(cypher::employee_department_summary(employee))
            .await?;
        let row = rows
            .first()
            .ok_or_else(|| OrgError::not_found("Employee department", employee))?;
        Ok(DepartmentSummary {
            department_name: row.get_str("department_name")?.to_string(),
            num_employees: row.get_int("num_employees")?,
        })
    }

    // ── Update ───────────────────────────────────────────────────

    /// Apply a partial update.
    ///
    /// A rename is applied on its own. `position` and `department` together
    /// describe one replacement relationship: the current one (membership
    /// if the employee has one, else management) is deleted once and a
    /// single new edge is created, taking its type from `position` and its
    /// target from `department`, each defaulting to the current value.
    /// A manager who is the only member of its department cannot step down
    /// to a plain member of it.
    pub async fn update_employee(&mut self, id: &EmployeeId, update: &EmployeeUpdate) -> Result<()> {
        let employee = self.get_employee(id).await?;

        if let Some(name) = &update.name {
            self.run(cypher::rename_employee(id, name)).await?;
            tracing::info!(%id, from = %employee.name, to = %name, "Renamed employee");
        }
        if !update.touches_relationship() {
            return Ok(());
        }

        let relationships = self.relationships(id).await?;
        let current = relationships.first().cloned();

        let target = match (&update.department, &current) {
            (Some(name), _) => self
                .department_by_name(name)
                .await?
                .ok_or_else(|| OrgError::not_found("Department", name))?,
            (None, Some((_, department))) => department.clone(),
            (None, None) => {
                return Err(OrgError::validation(format!(
                    "employee {id} has no department; both position and department are required"
                )))
            }
        };
        let position = match (update.position, &current) {
            (Some(position), _) => position,
            (None, Some((position, _))) => *position,
            (None, None) => {
                return Err(OrgError::validation(format!(
                    "employee {id} has no department; both position and department are required"
                )))
            }
        };

        if let Some((current_position, current_department)) = &current {
            if *current_position == position && current_department.id == target.id {
                return Ok(());
            }
        }

        if position == Position::Manages {
            let manages_elsewhere = relationships.iter().find(|(p, d)| {
                *p == Position::Manages
                    && d.id != target.id
                    && current
                        .as_ref()
                        .map_or(true, |(cp, cd)| !(cp == p && cd.id == d.id))
            });
            if let Some((_, other)) = manages_elsewhere {
                return Err(OrgError::validation(format!(
                    "{} already manages department {}",
                    employee.name, other.name
                )));
            }
        }

        if let Some((Position::Manages, previous)) = &current {
            if previous.id == target.id && position == Position::WorksIn {
                let others = self
                    .run(cypher::management_candidates(&previous.id, id))
                    .await?;
                if others.is_empty() {
                    return Err(OrgError::validation(format!(
                        "{} is the only member of department {} and must keep managing it",
                        employee.name, previous.name
                    )));
                }
            }
        }

        if let Some((current_position, current_department)) = &current {
            self.run(cypher::delete_relationship(
                id,
                *current_position,
                &current_department.id,
            ))
            .await?;
        }
        self.run(cypher::assign_relationship(id, position, &target.id))
            .await?;
        tracing::info!(%id, %position, department = %target.name, "Replaced relationship");

        if let Some((Position::Manages, previous)) = &current {
            if previous.id != target.id || position != Position::Manages {
                self.hand_over(&employee, previous.clone(), WhenEmpty::Keep)
                    .await?;
            }
        }

        Ok(())
    }

    // ── Delete ───────────────────────────────────────────────────

    /// Delete an employee and all of its relationships.
    ///
    /// If the employee manages a department, management first passes to
    /// another member (the first free member by name); a department left
    /// without members is deleted. When every remaining member already
    /// manages elsewhere the department is left without a manager.
    pub async fn delete_employee(&mut self, id: &EmployeeId) -> Result<DeletionReport> {
        let employee = self.get_employee(id).await?;

        let managed = self.managed_departments(id).await?;
        let handover = match managed.as_slice() {
            [] => None,
            [department] => Some(
                self.hand_over(&employee, department.clone(), WhenEmpty::Remove)
                    .await?,
            ),
            many => {
                let names: Vec<&str> = many.iter().map(|d| d.name.as_str()).collect();
                tracing::error!(%id, departments = ?names, "Employee manages several departments");
                return Err(OrgError::Consistency(format!(
                    "employee {} manages {} departments: {}",
                    employee.name,
                    many.len(),
                    names.join(", ")
                )));
            }
        };

        self.run(cypher::delete_employee(id)).await?;
        tracing::info!(%id, name = %employee.name, "Deleted employee");

        Ok(DeletionReport { employee, handover })
    }

    // ── Internals ────────────────────────────────────────────────

    async fn get_employee(&mut self, id: &EmployeeId) -> Result<Employee> {
        let rows = self.run(cypher::employee_name(id)).await?;
        let row = rows
            .first()
            .ok_or_else(|| OrgError::not_found("Employee", id))?;
        Ok(Employee {
            id: id.clone(),
            name: row.get_str("name")?.to_string(),
        })
    }

    async fn department_by_name(&mut self, name: &str) -> Result<Option<Department>> {
        let rows = self.run(cypher::department_by_name(name)).await?;
        rows.first().map(department).transpose()
    }

    /// The employee's department relationships, membership first.
    async fn relationships(&mut self, id: &EmployeeId) -> Result<Vec<(Position, Department)>> {
        let rows = self.run(cypher::employee_relationships(id)).await?;
        let mut relationships = Vec::with_capacity(rows.len());
        for row in rows {
            relationships.push((
                decode(&row, "position")?,
                Department {
                    id: decode(&row, "department_id")?,
                    name: row.get_str("department")?.to_string(),
                },
            ));
        }
        Ok(relationships)
    }

    async fn managed_departments(&mut self, id: &EmployeeId) -> Result<Vec<Department>> {
        let rows = self.run(cypher::managed_departments(id)).await?;
        rows.iter().map(department).collect()
    }

    /// Pass management of `department` from `leaving` to another member.
    async fn hand_over(
        &mut self,
        leaving: &Employee,
        department: Department,
        when_empty: WhenEmpty,
    ) -> Result<Handover> {
        let candidates = self
            .run(cypher::management_candidates(&department.id, &leaving.id))
            .await?;

        let Some(candidate) = candidates.first() else {
            return match when_empty {
                WhenEmpty::Remove => {
                    self.run(cypher::delete_department(&department.id)).await?;
                    tracing::info!(
                        department = %department.name,
                        "Removed department left without members"
                    );
                    Ok(Handover::DepartmentRemoved { department })
                }
                WhenEmpty::Keep => {
                    tracing::info!(department = %department.name, "Department has no manager");
                    Ok(Handover::Vacated { department })
                }
            };
        };

        // Candidates are ordered free-first.
        if candidate.get_int("managed")? > 0 {
            tracing::warn!(
                department = %department.name,
                leaving = %leaving.name,
                members = candidates.len(),
                "No member of the department is free to take over management"
            );
            return Ok(Handover::Unmanaged { department });
        }

        let manager = Employee {
            id: decode(candidate, "id")?,
            name: candidate.get_str("name")?.to_string(),
        };
        self.run(cypher::assign_relationship(
            &manager.id,
            Position::Manages,
            &department.id,
        ))
        .await?;
        tracing::info!(
            department = %department.name,
            from = %leaving.name,
            to = %manager.name,
            "Reassigned department manager"
        );

        Ok(Handover::Reassigned {
            department,
            manager,
        })
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Parse a string column into a domain value.
fn decode<T>(record: &Record, column: &str) -> std::result::Result<T, GraphError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = record.get_str(column)?;
    raw.parse()
        .map_err(|e| GraphError::Decode(format!("column {column}: {e}")))
}

fn department(record: &Record) -> Result<Department> {
    Ok(Department {
        id: decode(record, "id")?,
        name: record.get_str("name")?.to_string(),
    })
}

fn names(rows: &[Record]) -> Result<Vec<String>> {
    rows.iter()
        .map(|row| Ok(row.get_str("name")?.to_string()))
        .collect()
}

/// The integer an aggregate statement returns. No row reads as zero.
fn first_count(rows: &[Record], column: &str) -> Result<i64> {
    match rows.first() {
        Some(row) => Ok(row.get_int(column)?),
        None => Ok(0),
    }
}
