//! orgchart-core: Shared types, configuration, and error handling for the org chart graph.
//!
//! This crate provides the foundational types used by the graph repository
//! and the API layer:
//! - Node types (Employee, Department) and their identifiers
//! - Relationship positions (WORKS_IN, MANAGES)
//! - Listing filters, update requests, and result records
//! - Configuration management
//! - The error taxonomy surfaced to callers

pub mod config;
pub mod error;
pub mod types;

pub use error::{OrgError, Result};
pub use types::{
    DeletionReport, Department, DepartmentFilter, DepartmentId, DepartmentSummary, Employee,
    EmployeeFilter, EmployeeId, EmployeeRecord, EmployeeUpdate, Handover, Position, SortOrder,
};
