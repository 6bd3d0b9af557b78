//! Fluent query builder for the Dataverse retrieval API.
//!
//! Builds query descriptors (entity, columns, joins, criteria, paging,
//! locking, distinctness) and runs them through a caller-supplied
//! [`RetrievalPort`](query::RetrievalPort), either one page at a time or
//! following paging cookies until every page has been read.

pub mod error;
pub mod model;
pub mod query;

mod config;

pub use config::*;
pub use query::FromRecord;
pub use query::QueryBuilder;
pub use query::RetrievalPort;
