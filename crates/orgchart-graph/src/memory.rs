//! In-memory [`GraphStore`] for tests and local experiments.
//!
//! Statements are interpreted by name against a small adjacency model
//! instead of being parsed as Cypher, so every statement built in
//! [`crate::cypher`] has a native counterpart here. Transactions work on a
//! private snapshot of the graph: commit publishes the snapshot, rollback
//! drops it. Concurrent write transactions do not merge; the last commit wins.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use orgchart_core::{Position, SortOrder};

use crate::client::GraphError;
use crate::store::{AccessMode, GraphStore, GraphTxn, Record, Statement, Value};

#[derive(Debug, Clone)]
struct NodeEntry {
    id: String,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct EdgeEntry {
    employee: String,
    position: Position,
    department: String,
}

#[derive(Debug, Clone, Default)]
struct GraphState {
    // Vectors keep insertion order, which stands in for the store's natural order.
    employees: Vec<NodeEntry>,
    departments: Vec<NodeEntry>,
    edges: Vec<EdgeEntry>,
}

/// A relationship as seen from outside: employee name, type, department name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipSnapshot {
    pub employee: String,
    pub position: Position,
    pub department: String,
}

/// Shared in-memory graph. Clone is cheap (inner Arc).
#[derive(Clone, Default)]
pub struct MemoryGraph {
    state: Arc<Mutex<GraphState>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all committed employees, in creation order.
    pub async fn employee_names(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state.employees.iter().map(|e| e.name.clone()).collect()
    }

    /// Names of all committed departments, in creation order.
    pub async fn department_names(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state.departments.iter().map(|d| d.name.clone()).collect()
    }

    /// All committed relationships.
    pub async fn relationships(&self) -> Vec<RelationshipSnapshot> {
        let state = self.state.lock().await;
        state
            .edges
            .iter()
            .map(|edge| RelationshipSnapshot {
                employee: state.employee_name(&edge.employee).unwrap_or_default(),
                position: edge.position,
                department: state.department_name(&edge.department).unwrap_or_default(),
            })
            .collect()
    }
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn begin(&self, mode: AccessMode) -> Result<Box<dyn GraphTxn>, GraphError> {
        let working = self.state.lock().await.clone();
        Ok(Box::new(MemoryTxn {
            shared: Arc::clone(&self.state),
            working,
            mode,
        }))
    }
}

struct MemoryTxn {
    shared: Arc<Mutex<GraphState>>,
    working: GraphState,
    mode: AccessMode,
}

#[async_trait]
impl GraphTxn for MemoryTxn {
    async fn execute(&mut self, statement: Statement) -> Result<Vec<Record>, GraphError> {
        if self.mode == AccessMode::Read && is_write(statement.name()) {
            return Err(GraphError::Unsupported(format!(
                "{} in a read transaction",
                statement.name()
            )));
        }
        tracing::trace!(statement = statement.name(), "Executing in-memory statement");
        self.working.apply(&statement)
    }

    async fn commit(self: Box<Self>) -> Result<(), GraphError> {
        let MemoryTxn {
            shared,
            working,
            mode,
        } = *self;
        if mode == AccessMode::Write {
            *shared.lock().await = working;
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), GraphError> {
        Ok(())
    }
}

fn is_write(name: &str) -> bool {
    matches!(
        name,
        "create_employee"
            | "create_department"
            | "link_works_in"
            | "link_manages"
            | "rename_employee"
            | "delete_works_in"
            | "delete_manages"
            | "assign_works_in"
            | "assign_manages"
            | "delete_department"
            | "delete_employee"
            | "ensure_constraint"
            | "ensure_index"
    )
}

fn param<'a>(statement: &'a Statement, key: &str) -> Result<&'a str, GraphError> {
    statement.str_param(key).ok_or_else(|| {
        GraphError::Unsupported(format!("{} without parameter {key}", statement.name()))
    })
}

fn sort_names(names: &mut [String], order: Option<SortOrder>) {
    match order {
        Some(SortOrder::Asc) => names.sort(),
        Some(SortOrder::Desc) => names.sort_by(|a, b| b.cmp(a)),
        None => {}
    }
}

impl GraphState {
    fn apply(&mut self, stmt: &Statement) -> Result<Vec<Record>, GraphError> {
        let rows = match stmt.name() {
            "create_employee" => {
                self.employees.push(NodeEntry {
                    id: param(stmt, "id")?.to_string(),
                    name: param(stmt, "name")?.to_string(),
                });
                Vec::new()
            }
            "create_department" => {
                self.departments.push(NodeEntry {
                    id: param(stmt, "id")?.to_string(),
                    name: param(stmt, "name")?.to_string(),
                });
                Vec::new()
            }
            "count_employees_named" => {
                let name = param(stmt, "name")?;
                let count = self.employees.iter().filter(|e| e.name == name).count();
                vec![Record::new().with("count", count as i64)]
            }
            "count_departments_named" => {
                let name = param(stmt, "name")?;
                let count = self.departments.iter().filter(|d| d.name == name).count();
                vec![Record::new().with("count", count as i64)]
            }
            "link_works_in" | "link_manages" => {
                let position = if stmt.name() == "link_works_in" {
                    Position::WorksIn
                } else {
                    Position::Manages
                };
                let employees = ids_named(&self.employees, param(stmt, "employee")?);
                let departments = ids_named(&self.departments, param(stmt, "department")?);
                let linked = self.link(&employees, &departments, position);
                vec![Record::new().with("linked", linked)]
            }
            "assign_works_in" | "assign_manages" => {
                let position = if stmt.name() == "assign_works_in" {
                    Position::WorksIn
                } else {
                    Position::Manages
                };
                let employees = ids_with(&self.employees, param(stmt, "id")?);
                let departments = ids_with(&self.departments, param(stmt, "department_id")?);
                let linked = self.link(&employees, &departments, position);
                vec![Record::new().with("linked", linked)]
            }
            "managed_elsewhere" => {
                let employees = ids_named(&self.employees, param(stmt, "employee")?);
                let department = param(stmt, "department")?;
                self.edges
                    .iter()
                    .filter(|e| e.position == Position::Manages && employees.contains(&e.employee))
                    .filter_map(|e| self.department_name(&e.department))
                    .filter(|name| name != department)
                    .map(|name| Record::new().with("department", name))
                    .collect()
            }
            "list_employees" => self.list_employees(stmt)?,
            "list_departments" => {
                let filter = stmt.str_param("name");
                let mut names: Vec<String> = self
                    .departments
                    .iter()
                    .filter(|d| filter.map_or(true, |f| d.name.contains(f)))
                    .map(|d| d.name.clone())
                    .collect();
                sort_names(&mut names, stmt.order());
                names
                    .into_iter()
                    .map(|name| Record::new().with("name", name))
                    .collect()
            }
            "list_subordinates" => {
                let manager = param(stmt, "id")?;
                let managed: BTreeSet<&str> = self
                    .edges_from(manager, Position::Manages)
                    .map(|e| e.department.as_str())
                    .collect();
                let names: BTreeSet<String> = self
                    .edges
                    .iter()
                    .filter(|e| e.position == Position::WorksIn)
                    .filter(|e| managed.contains(e.department.as_str()) && e.employee != manager)
                    .filter_map(|e| self.employee_name(&e.employee))
                    .collect();
                names
                    .into_iter()
                    .map(|name| Record::new().with("name", name))
                    .collect()
            }
            "list_department_employees" => {
                let department = param(stmt, "id")?;
                let mut names = self.member_names(department);
                names.sort();
                names
                    .into_iter()
                    .map(|name| Record::new().with("name", name))
                    .collect()
            }
            "employee_department_summary" => {
                let id = param(stmt, "id")?;
                match self.edges_from(id, Position::WorksIn).next() {
                    Some(edge) => {
                        let count = self
                            .edges
                            .iter()
                            .filter(|e| {
                                e.position == Position::WorksIn && e.department == edge.department
                            })
                            .count();
                        vec![Record::new()
                            .with(
                                "department_name",
                                self.department_name(&edge.department).unwrap_or_default(),
                            )
                            .with("num_employees", count as i64)]
                    }
                    None => Vec::new(),
                }
            }
            "employee_name" => {
                let id = param(stmt, "id")?;
                self.employee_name(id)
                    .map(|name| Record::new().with("name", name))
                    .into_iter()
                    .collect()
            }
            "department_by_name" => {
                let name = param(stmt, "name")?;
                self.departments
                    .iter()
                    .find(|d| d.name == name)
                    .map(|d| {
                        Record::new()
                            .with("id", d.id.as_str())
                            .with("name", d.name.as_str())
                    })
                    .into_iter()
                    .collect()
            }
            "employee_relationships" => {
                let id = param(stmt, "id")?;
                let mut rows: Vec<(Position, String, String)> = self
                    .edges
                    .iter()
                    .filter(|e| e.employee == id)
                    .map(|e| {
                        (
                            e.position,
                            e.department.clone(),
                            self.department_name(&e.department).unwrap_or_default(),
                        )
                    })
                    .collect();
                // Label order, descending: WORKS_IN before MANAGES.
                rows.sort_by(|a, b| {
                    b.0.as_cypher()
                        .cmp(a.0.as_cypher())
                        .then_with(|| a.2.cmp(&b.2))
                });
                rows.into_iter()
                    .map(|(position, department_id, department)| {
                        Record::new()
                            .with("position", position.as_cypher())
                            .with("department_id", department_id)
                            .with("department", department)
                    })
                    .collect()
            }
            "managed_departments" => {
                let id = param(stmt, "id")?;
                let mut rows: Vec<(String, String)> = self
                    .edges_from(id, Position::Manages)
                    .map(|e| {
                        (
                            e.department.clone(),
                            self.department_name(&e.department).unwrap_or_default(),
                        )
                    })
                    .collect();
                rows.sort_by(|a, b| a.1.cmp(&b.1));
                rows.into_iter()
                    .map(|(id, name)| Record::new().with("id", id).with("name", name))
                    .collect()
            }
            "management_candidates" => {
                let department = param(stmt, "department_id")?;
                let leaving = param(stmt, "id")?;
                let mut rows: Vec<(i64, String, String)> = self
                    .edges
                    .iter()
                    .filter(|e| e.position == Position::WorksIn && e.department == department)
                    .filter(|e| e.employee != leaving)
                    .map(|e| {
                        let managed = self
                            .edges_from(&e.employee, Position::Manages)
                            .filter(|m| m.department != department)
                            .count() as i64;
                        (
                            managed,
                            self.employee_name(&e.employee).unwrap_or_default(),
                            e.employee.clone(),
                        )
                    })
                    .collect();
                rows.sort();
                rows.into_iter()
                    .map(|(managed, name, id)| {
                        Record::new()
                            .with("id", id)
                            .with("name", name)
                            .with("managed", managed)
                    })
                    .collect()
            }
            "rename_employee" => {
                let id = param(stmt, "id")?;
                let name = param(stmt, "name")?;
                for employee in self.employees.iter_mut().filter(|e| e.id == id) {
                    employee.name = name.to_string();
                }
                Vec::new()
            }
            "delete_works_in" | "delete_manages" => {
                let position = if stmt.name() == "delete_works_in" {
                    Position::WorksIn
                } else {
                    Position::Manages
                };
                let id = param(stmt, "id")?;
                let department = param(stmt, "department_id")?;
                self.edges.retain(|e| {
                    !(e.employee == id && e.position == position && e.department == department)
                });
                Vec::new()
            }
            "delete_department" => {
                let id = param(stmt, "department_id")?;
                self.departments.retain(|d| d.id != id);
                self.edges.retain(|e| e.department != id);
                Vec::new()
            }
            "delete_employee" => {
                let id = param(stmt, "id")?;
                self.employees.retain(|e| e.id != id);
                self.edges.retain(|e| e.employee != id);
                Vec::new()
            }
            "ensure_constraint" | "ensure_index" => Vec::new(),
            other => {
                return Err(GraphError::Unsupported(format!(
                    "no in-memory interpretation for {other}"
                )))
            }
        };
        Ok(rows)
    }

    fn list_employees(&self, stmt: &Statement) -> Result<Vec<Record>, GraphError> {
        let name = stmt.str_param("name");
        let department = stmt.str_param("department");
        let position = stmt.str_param("position");

        let mut rows: Vec<(String, Position, String)> = self
            .edges
            .iter()
            .filter_map(|e| {
                Some((
                    self.employee_name(&e.employee)?,
                    e.position,
                    self.department_name(&e.department)?,
                ))
            })
            .filter(|(e, _, _)| name.map_or(true, |f| e.contains(f)))
            .filter(|(_, _, d)| department.map_or(true, |f| d.contains(f)))
            .filter(|(_, p, _)| position.map_or(true, |f| p.as_cypher().contains(f)))
            .collect();

        match stmt.order() {
            Some(SortOrder::Asc) => rows.sort_by(|a, b| a.0.cmp(&b.0)),
            Some(SortOrder::Desc) => rows.sort_by(|a, b| b.0.cmp(&a.0)),
            None => {}
        }

        Ok(rows
            .into_iter()
            .map(|(name, position, department)| {
                Record::new()
                    .with("name", name)
                    .with("position", Value::from(position.as_cypher()))
                    .with("department", department)
            })
            .collect())
    }

    /// Ensure `position` edges between every matched pair, dropping stale
    /// edges the same way the Cypher templates do. Returns how many employees matched.
    fn link(&mut self, employees: &[String], departments: &[String], position: Position) -> i64 {
        if employees.is_empty() || departments.is_empty() {
            return 0;
        }
        for employee in employees {
            for department in departments {
                match position {
                    Position::WorksIn => self.edges.retain(|e| {
                        !(e.employee == *employee
                            && e.position == Position::WorksIn
                            && e.department != *department)
                    }),
                    Position::Manages => self.edges.retain(|e| {
                        !(e.department == *department
                            && e.position == Position::Manages
                            && e.employee != *employee)
                    }),
                }
                let edge = EdgeEntry {
                    employee: employee.clone(),
                    position,
                    department: department.clone(),
                };
                if !self.edges.contains(&edge) {
                    self.edges.push(edge);
                }
            }
        }
        employees.len() as i64
    }

    fn edges_from<'a>(
        &'a self,
        employee: &'a str,
        position: Position,
    ) -> impl Iterator<Item = &'a EdgeEntry> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.employee == employee && e.position == position)
    }

    fn member_names(&self, department: &str) -> Vec<String> {
        self.edges
            .iter()
            .filter(|e| e.position == Position::WorksIn && e.department == department)
            .filter_map(|e| self.employee_name(&e.employee))
            .collect()
    }

    fn employee_name(&self, id: &str) -> Option<String> {
        self.employees
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.name.clone())
    }

    fn department_name(&self, id: &str) -> Option<String> {
        self.departments
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.name.clone())
    }
}

fn ids_named(nodes: &[NodeEntry], name: &str) -> Vec<String> {
    nodes
        .iter()
        .filter(|n| n.name == name)
        .map(|n| n.id.clone())
        .collect()
}

fn ids_with(nodes: &[NodeEntry], id: &str) -> Vec<String> {
    nodes
        .iter()
        .filter(|n| n.id == id)
        .map(|n| n.id.clone())
        .collect()
}
