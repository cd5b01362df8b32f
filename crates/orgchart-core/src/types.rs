//! Core domain types for the org chart graph.
//!
//! Two node kinds (Employee, Department) and two relationship kinds
//! (WORKS_IN, MANAGES), plus the filter, update, and result shapes the
//! repository and API layer exchange.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::OrgError;

// ── Identifiers ───────────────────────────────────────────────────

/// Application-level identity of an Employee node (the `id` property).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmployeeId(pub Uuid);

impl EmployeeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EmployeeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EmployeeId {
    type Err = OrgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| OrgError::validation(format!("invalid employee id {s:?}: {e}")))
    }
}

/// Application-level identity of a Department node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DepartmentId(pub Uuid);

impl DepartmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DepartmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DepartmentId {
    type Err = OrgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| OrgError::validation(format!("invalid department id {s:?}: {e}")))
    }
}

// ── Nodes ─────────────────────────────────────────────────────────

/// A person in the organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
}

/// An organizational unit employees work in and are managed through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}

// ── Relationships ─────────────────────────────────────────────────

/// The relationship an employee holds towards a department.
///
/// This is the closed set of relationship types the graph uses; every
/// Cypher template is selected from it rather than built from user input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Position {
    WorksIn,
    Manages,
}

impl Position {
    /// The Cypher relationship type for this position.
    pub fn as_cypher(&self) -> &'static str {
        match self {
            Self::WorksIn => "WORKS_IN",
            Self::Manages => "MANAGES",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_cypher())
    }
}

impl FromStr for Position {
    type Err = OrgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "WORKS_IN" => Ok(Self::WorksIn),
            "MANAGES" => Ok(Self::Manages),
            _ => Err(OrgError::validation(format!(
                "invalid position {s:?}: expected WORKS_IN or MANAGES"
            ))),
        }
    }
}

// ── Queries ───────────────────────────────────────────────────────

/// Sort direction for name-ordered listings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_cypher(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = OrgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => Err(OrgError::validation(format!(
                "invalid order {s:?}: expected ASC or DESC"
            ))),
        }
    }
}

/// Filter for employee listings. All text filters are case-sensitive
/// substring matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub name: Option<String>,
    pub department: Option<String>,
    /// Matched against the relationship type label (`WORKS_IN`, `MANAGES`).
    pub position: Option<String>,
    pub order: Option<SortOrder>,
}

/// Filter for department listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentFilter {
    pub name: Option<String>,
    pub order: Option<SortOrder>,
}

/// One row of an employee listing: an employee and one of its department
/// relationships.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmployeeRecord {
    pub name: String,
    pub position: Position,
    pub department: String,
}

/// The department an employee works in, with its headcount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepartmentSummary {
    pub department_name: String,
    pub num_employees: i64,
}

// ── Mutations ─────────────────────────────────────────────────────

/// Partial update of an employee. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub position: Option<Position>,
    /// Target department, by name.
    pub department: Option<String>,
}

impl EmployeeUpdate {
    /// Whether the update replaces the employee's department relationship.
    pub fn touches_relationship(&self) -> bool {
        self.position.is_some() || self.department.is_some()
    }
}

/// What happened to a department's management when its manager left it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Handover {
    /// Another member of the department became its manager.
    Reassigned {
        department: Department,
        manager: Employee,
    },
    /// The department had no members left and was deleted.
    DepartmentRemoved { department: Department },
    /// The department has no members left and stays without a manager.
    Vacated { department: Department },
    /// Members remain, but every one of them already manages another
    /// department, so the department stays without a manager.
    Unmanaged { department: Department },
}

/// Result of deleting an employee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletionReport {
    pub employee: Employee,
    pub handover: Option<Handover>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_serializes_screaming_snake() {
        let json = serde_json::to_string(&Position::WorksIn).unwrap();
        assert_eq!(json, "\"WORKS_IN\"");

        let json = serde_json::to_string(&Position::Manages).unwrap();
        assert_eq!(json, "\"MANAGES\"");
    }

    #[test]
    fn position_parses_loosely() {
        assert_eq!("WORKS_IN".parse::<Position>().unwrap(), Position::WorksIn);
        assert_eq!("works-in".parse::<Position>().unwrap(), Position::WorksIn);
        assert_eq!(" manages ".parse::<Position>().unwrap(), Position::Manages);
        assert!(matches!(
            "REPORTS_TO]->(x) DETACH DELETE x //".parse::<Position>(),
            Err(OrgError::Validation(_))
        ));
    }

    #[test]
    fn sort_order_parses_case_insensitively() {
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn ids_round_trip_through_strings() {
        let id = EmployeeId::new();
        let parsed: EmployeeId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);

        assert!(matches!(
            "42".parse::<DepartmentId>(),
            Err(OrgError::Validation(_))
        ));
    }

    #[test]
    fn employee_update_flags() {
        assert!(!EmployeeUpdate::default().touches_relationship());

        let rename = EmployeeUpdate {
            name: Some("Dana".to_string()),
            ..Default::default()
        };
        assert!(!rename.touches_relationship());

        let move_dept = EmployeeUpdate {
            department: Some("Sales".to_string()),
            ..Default::default()
        };
        assert!(move_dept.touches_relationship());
    }

    #[test]
    fn handover_is_tagged() {
        let handover = Handover::DepartmentRemoved {
            department: Department {
                id: DepartmentId::new(),
                name: "Ops".to_string(),
            },
        };
        let json = serde_json::to_string(&handover).unwrap();
        assert!(json.contains("\"outcome\":\"department_removed\""));
    }
}
