//! Public API: database handle, table operations, queries, and assignments.

pub mod builders;
pub mod database;
pub mod filter;
pub mod projection;
pub mod query;
pub mod update;

pub use builders::Query;
pub use database::{JotDb, Table};
pub use filter::{Operator, Predicate};
pub use projection::Projection;
pub use query::{Direction, LimitSpec, OrderKey};
pub use update::{Assignments, IntoAssignments};
