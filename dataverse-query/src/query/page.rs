//! Page type for paginated query results.

use crate::error::Error;
use crate::model::Record;

use super::port::FromRecord;

/// One page of results together with the continuation state for the next.
///
/// Retrieval ports return `Page<Record>`; [`QueryBuilder::pages`] yields
/// pages already mapped to the caller's type.
///
/// [`QueryBuilder::pages`]: super::QueryBuilder::pages
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R = Record> {
    records: Vec<R>,
    /// Whether another page follows this one.
    more_records: bool,
    /// Cookie to echo back when requesting the next page.
    paging_cookie: Option<String>,
    /// Total matching records, when the request asked for it.
    total_record_count: Option<u64>,
}

impl<R> Page<R> {
    /// Creates a final page holding the given records.
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records,
            more_records: false,
            paging_cookie: None,
            total_record_count: None,
        }
    }

    /// Marks whether more pages follow.
    pub fn with_more_records(mut self, more: bool) -> Self {
        self.more_records = more;
        self
    }

    /// Sets the paging cookie for the next request.
    pub fn with_paging_cookie(mut self, paging_cookie: impl Into<String>) -> Self {
        self.paging_cookie = Some(paging_cookie.into());
        self
    }

    /// Sets the total record count.
    pub fn with_total_record_count(mut self, count: u64) -> Self {
        self.total_record_count = Some(count);
        self
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Consumes the page and returns the records.
    pub fn into_records(self) -> Vec<R> {
        self.records
    }

    /// Returns `true` if another page is available.
    pub fn more_records(&self) -> bool {
        self.more_records
    }

    pub fn paging_cookie(&self) -> Option<&str> {
        self.paging_cookie.as_deref()
    }

    pub fn total_record_count(&self) -> Option<u64> {
        self.total_record_count
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

impl Page<Record> {
    /// Maps every record, keeping the continuation state.
    pub(crate) fn map_records<T: FromRecord>(self) -> Result<Page<T>, Error> {
        let records = self
            .records
            .into_iter()
            .map(T::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            records,
            more_records: self.more_records,
            paging_cookie: self.paging_cookie,
            total_record_count: self.total_record_count,
        })
    }
}
