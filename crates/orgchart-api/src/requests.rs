//! Request bodies and query strings accepted by the API.
//!
//! Every field is optional so that a missing field surfaces as a 400 from
//! the handler rather than as a deserialization failure.

use serde::{Deserialize, Serialize};

use orgchart_core::{
    DepartmentFilter, EmployeeFilter, EmployeeUpdate, OrgError, Position, Result, SortOrder,
};

/// Body of `POST /employees`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewEmployee {
    pub name: Option<String>,
}

/// Body of `POST /department`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDepartment {
    pub name: Option<String>,
}

/// Body of `POST /relationship/works-in` and `POST /relationship/manages`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipRequest {
    pub employee: Option<String>,
    pub department: Option<String>,
}

impl RelationshipRequest {
    /// Both names, or a validation error naming what is missing.
    pub fn names(&self) -> Result<(&str, &str)> {
        match (non_empty(&self.employee), non_empty(&self.department)) {
            (Some(employee), Some(department)) => Ok((employee, department)),
            (None, _) => Err(OrgError::validation("Request body is missing employee")),
            (_, None) => Err(OrgError::validation("Request body is missing department")),
        }
    }
}

/// Body of `PUT /employees/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeChanges {
    pub name: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
}

impl EmployeeChanges {
    pub fn into_update(self) -> Result<EmployeeUpdate> {
        let position = self
            .position
            .as_deref()
            .map(str::parse::<Position>)
            .transpose()?;
        Ok(EmployeeUpdate {
            name: self.name,
            position,
            department: self.department,
        })
    }
}

/// Query string of `GET /employees`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeQuery {
    pub name: Option<String>,
    pub order: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
}

impl EmployeeQuery {
    pub fn to_filter(&self) -> Result<EmployeeFilter> {
        Ok(EmployeeFilter {
            name: self.name.clone(),
            department: self.department.clone(),
            position: self.position.clone(),
            order: parse_order(&self.order)?,
        })
    }
}

/// Query string of `GET /departments`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepartmentQuery {
    pub name: Option<String>,
    pub order: Option<String>,
}

impl DepartmentQuery {
    pub fn to_filter(&self) -> Result<DepartmentFilter> {
        Ok(DepartmentFilter {
            name: self.name.clone(),
            order: parse_order(&self.order)?,
        })
    }
}

fn parse_order(order: &Option<String>) -> Result<Option<SortOrder>> {
    order.as_deref().map(str::parse).transpose()
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_request_requires_both_names() {
        let request = RelationshipRequest {
            employee: Some("Alice".to_string()),
            department: Some(" ".to_string()),
        };
        assert!(matches!(request.names(), Err(OrgError::Validation(_))));

        let request = RelationshipRequest {
            employee: Some("Alice".to_string()),
            department: Some("Eng".to_string()),
        };
        assert_eq!(request.names().unwrap(), ("Alice", "Eng"));
    }

    #[test]
    fn changes_parse_position() {
        let changes: EmployeeChanges =
            serde_json::from_str(r#"{"position": "manages", "department": "Eng"}"#).unwrap();
        let update = changes.into_update().unwrap();
        assert_eq!(update.position, Some(Position::Manages));
        assert_eq!(update.department.as_deref(), Some("Eng"));
        assert!(update.name.is_none());

        let bad = EmployeeChanges {
            position: Some("INTERN".to_string()),
            ..Default::default()
        };
        assert!(matches!(bad.into_update(), Err(OrgError::Validation(_))));
    }

    #[test]
    fn queries_reject_unknown_order() {
        let query = DepartmentQuery {
            order: Some("sideways".to_string()),
            ..Default::default()
        };
        assert!(query.to_filter().is_err());

        let query = EmployeeQuery {
            order: Some("desc".to_string()),
            department: Some("Sal".to_string()),
            ..Default::default()
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.order, Some(SortOrder::Desc));
        assert_eq!(filter.department.as_deref(), Some("Sal"));
    }
}
