//! orgchart-api: the endpoint layer over the org chart repository.
//!
//! Each [`OrgApi`] method corresponds to one HTTP endpoint of the org chart
//! service: it validates its input, runs the repository inside one
//! transaction, and answers with a status code and a JSON body.

pub mod api;
pub mod requests;

pub use api::{ApiResponse, OrgApi};
