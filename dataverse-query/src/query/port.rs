//! The retrieval boundary.

use async_trait::async_trait;

use crate::error::Error;
use crate::model::Record;

use super::QueryBuilder;
use super::QueryDescriptor;
use super::page::Page;

/// Executes one page request against the data platform.
///
/// Implementations own transport, authentication and response parsing.
/// Failures should be wrapped with [`Error::retrieval`] so callers can
/// recover the original error.
///
/// # Example
///
/// ```ignore
/// struct WebApi { /* http client, token provider */ }
///
/// #[async_trait]
/// impl RetrievalPort for WebApi {
///     async fn retrieve_page(&self, query: &QueryDescriptor) -> Result<Page, Error> {
///         let fetchxml = query.to_fetchxml();
///         // submit, then translate the response into a Page
///     }
/// }
///
/// let accounts: Vec<Record> = api.query("account")
///     .include_columns(["name"])
///     .retrieve_all()
///     .await?;
/// ```
#[async_trait]
pub trait RetrievalPort: Send + Sync {
    /// Fetches the page described by `query`, including its page number and cookie.
    async fn retrieve_page(&self, query: &QueryDescriptor) -> Result<Page, Error>;

    /// Starts a query builder bound to this port.
    fn query(&self, entity_name: impl Into<String>) -> QueryBuilder<'_, Self>
    where
        Self: Sized,
    {
        QueryBuilder::new(self, entity_name)
    }
}

/// Converts a raw record into a caller type.
///
/// Types that derive `serde::Deserialize` can implement this with
/// [`Record::deserialize_into`]:
///
/// ```ignore
/// impl FromRecord for Account {
///     fn from_record(record: Record) -> Result<Self, Error> {
///         record.deserialize_into()
///     }
/// }
/// ```
pub trait FromRecord: Sized {
    fn from_record(record: Record) -> Result<Self, Error>;
}

impl FromRecord for Record {
    fn from_record(record: Record) -> Result<Self, Error> {
        Ok(record)
    }
}
