//! orgchart-graph: the org chart repository over a graph store.
//!
//! Every read and write of employees, departments and their relationships
//! goes through [`OrgGraphRepository`], which runs parameterized Cypher
//! inside a transaction the caller owns. The store behind it is either a
//! live Neo4j database ([`GraphClient`]) or the in-memory [`MemoryGraph`].

pub mod client;
pub mod cypher;
pub mod memory;
pub mod repository;
pub mod schema;
pub mod seed;
pub mod store;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use memory::MemoryGraph;
pub use repository::OrgGraphRepository;
pub use store::{finish, AccessMode, GraphStore, GraphTxn, Record, Statement, Value};
