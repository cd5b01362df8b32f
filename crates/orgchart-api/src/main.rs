//! CLI entry point for the org chart service.
//!
//! Each subcommand drives one API endpoint against Neo4j and prints the
//! JSON response to stdout. Logs go to stderr.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use orgchart_core::config::{self, LogSettings};
use orgchart_graph::schema::ensure_schema;
use orgchart_graph::seed::demo_org;
use orgchart_graph::{GraphClient, GraphConfig};

use orgchart_api::api::OK;
use orgchart_api::requests::{
    DepartmentQuery, EmployeeChanges, EmployeeQuery, NewDepartment, NewEmployee,
    RelationshipRequest,
};
use orgchart_api::{ApiResponse, OrgApi};

#[derive(Parser)]
#[command(name = "orgchart")]
#[command(about = "Org chart of employees and departments, stored in Neo4j")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: orgchart).
    #[arg(short, long, default_value = "orgchart", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Create the id constraints and name indexes.
    Schema,
    /// Load the demo organization.
    Seed,
    /// Create an employee.
    AddEmployee { name: String },
    /// Create a department.
    AddDepartment { name: String },
    /// Make an employee a member of a department.
    WorksIn {
        employee: String,
        department: String,
    },
    /// Make an employee the manager of a department.
    Manages {
        employee: String,
        department: String,
    },
    /// List employees with their department relationships.
    Employees {
        /// Substring of the employee name.
        #[arg(long)]
        name: Option<String>,
        /// Substring of the department name.
        #[arg(long)]
        department: Option<String>,
        /// Substring of the relationship type (WORKS_IN, MANAGES).
        #[arg(long)]
        position: Option<String>,
        /// ASC or DESC by employee name.
        #[arg(long)]
        order: Option<String>,
    },
    /// Rename an employee or replace its department relationship.
    UpdateEmployee {
        id: String,
        #[arg(long)]
        name: Option<String>,
        /// WORKS_IN or MANAGES.
        #[arg(long)]
        position: Option<String>,
        /// Target department name.
        #[arg(long)]
        department: Option<String>,
    },
    /// Delete an employee, handing over any department it manages.
    DeleteEmployee { id: String },
    /// Members of the departments an employee manages.
    Subordinates { id: String },
    /// List department names.
    Departments {
        /// Substring of the department name.
        #[arg(long)]
        name: Option<String>,
        /// ASC or DESC by department name.
        #[arg(long)]
        order: Option<String>,
    },
    /// Members of a department.
    DepartmentEmployees { id: String },
    /// The department an employee works in, with its headcount.
    EmployeeDepartment { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = config::load(&cli.config)?;
    init_tracing(&settings.log);

    let graph = GraphClient::connect(&GraphConfig::from(settings.neo4j)).await?;

    let api = OrgApi::new(graph.clone());
    let response = dispatch(&graph, &api, cli.command).await;

    println!("{}", serde_json::to_string_pretty(&response.body)?);
    if !response.is_success() {
        anyhow::bail!("request failed with status {}", response.status);
    }
    Ok(())
}

async fn dispatch(graph: &GraphClient, api: &OrgApi, command: Command) -> ApiResponse {
    match command {
        Command::Schema => match ensure_schema(graph).await {
            Ok(()) => ApiResponse::message(OK, "Schema initialized"),
            Err(err) => err.into(),
        },
        Command::Seed => api.seed(&demo_org()).await,
        Command::AddEmployee { name } => {
            api.add_employee(Some(NewEmployee { name: Some(name) }))
                .await
        }
        Command::AddDepartment { name } => {
            api.add_department(Some(NewDepartment { name: Some(name) }))
                .await
        }
        Command::WorksIn {
            employee,
            department,
        } => api.add_works_in(Some(relationship(employee, department))).await,
        Command::Manages {
            employee,
            department,
        } => api.add_manages(Some(relationship(employee, department))).await,
        Command::Employees {
            name,
            department,
            position,
            order,
        } => {
            let query = EmployeeQuery {
                name,
                order,
                department,
                position,
            };
            api.list_employees(&query).await
        }
        Command::UpdateEmployee {
            id,
            name,
            position,
            department,
        } => {
            let changes = EmployeeChanges {
                name,
                position,
                department,
            };
            api.update_employee(&id, Some(changes)).await
        }
        Command::DeleteEmployee { id } => api.delete_employee(&id).await,
        Command::Subordinates { id } => api.subordinates(&id).await,
        Command::Departments { name, order } => {
            api.list_departments(&DepartmentQuery { name, order }).await
        }
        Command::DepartmentEmployees { id } => api.department_employees(&id).await,
        Command::EmployeeDepartment { id } => api.employee_department(&id).await,
    }
}

fn relationship(employee: String, department: String) -> RelationshipRequest {
    RelationshipRequest {
        employee: Some(employee),
        department: Some(department),
    }
}

/// `RUST_LOG` wins over the configured filter.
fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    if log.json {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    }
}
