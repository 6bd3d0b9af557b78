//! Query builders and the retrieval boundary.
//!
//! - [`QueryBuilder`] - accumulates a [`QueryDescriptor`] and runs it
//! - [`LinkBuilder`] - accumulates a [`LinkDescriptor`] (a join), possibly nested
//! - [`FilterBuilder`] - accumulates a [`FilterExpression`] for criteria
//! - [`RetrievalPort`] - executes one page request; supplied by the caller
//! - [`Page`] - one page of results with its paging cookie

mod builder;
mod descriptor;
mod fetchxml;
mod filter;
mod link;
mod order;
mod page;
mod pages;
mod port;

pub use builder::QueryBuilder;
pub use descriptor::ColumnSet;
pub use descriptor::JoinKind;
pub use descriptor::LinkDescriptor;
pub use descriptor::PagingState;
pub use descriptor::QueryDescriptor;
pub use filter::ConditionExpression;
pub use filter::ConditionOperator;
pub use filter::FilterBuilder;
pub use filter::FilterExpression;
pub use filter::LogicalOperator;
pub use link::LinkBuilder;
pub use order::Direction;
pub use order::OrderExpression;
pub use page::Page;
pub use port::FromRecord;
pub use port::RetrievalPort;
