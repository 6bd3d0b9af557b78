//! Query and link descriptors.
//!
//! These are the plain data structures the builders accumulate into. Their
//! fields are public so that callers going through
//! [`QueryBuilder::expression_mut`](super::QueryBuilder::expression_mut) can
//! reach anything the builders do not cover.

use super::filter::FilterExpression;
use super::order::OrderExpression;

/// The set of columns requested for an entity.
///
/// Names are kept in first-insertion order and never repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    /// Requests every column of the entity. Takes precedence over `columns`.
    pub all_columns: bool,
    columns: Vec<String>,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the given names, skipping any already present.
    pub fn add<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.columns.contains(&name) {
                self.columns.push(name);
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Returns the named columns.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Resumable position of a paged retrieval.
///
/// The cookie is opaque; it is handed out by the retrieval port with each
/// page and echoed back on the next request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingState {
    /// 1-based page number.
    pub page_number: u32,
    pub paging_cookie: Option<String>,
    /// Asks the platform to report the total number of matching records.
    pub return_total_record_count: bool,
    /// Number of records per page. `None` leaves it to the platform.
    pub count: Option<u32>,
}

impl Default for PagingState {
    fn default() -> Self {
        Self {
            page_number: 1,
            paging_cookie: None,
            return_total_record_count: false,
            count: None,
        }
    }
}

impl PagingState {
    /// Creates the paging state for the first page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page number.
    pub fn with_page(mut self, page_number: u32) -> Self {
        self.page_number = page_number;
        self
    }

    /// Sets the paging cookie.
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.paging_cookie = Some(cookie.into());
        self
    }

    /// Requests the total record count.
    pub fn with_total_record_count(mut self, flag: bool) -> Self {
        self.return_total_record_count = flag;
        self
    }

    /// Sets the page size.
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }
}

/// How a link joins its entity to the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    /// Only rows with a matching linked row.
    #[default]
    Inner,
    /// All parent rows, with nulls where no linked row exists.
    LeftOuter,
    /// Parent rows for which a linked row exists; no linked columns.
    Exists,
    /// Like `Exists`, evaluated as an `IN` subquery.
    In,
    /// Joins only the first matching linked row.
    MatchFirstRowUsingCrossApply,
    /// Parent rows with at least one linked row matching the link criteria.
    Any,
    /// Parent rows with no linked row matching the link criteria.
    NotAny,
    /// Parent rows whose linked rows all match the link criteria.
    All,
    /// Parent rows with at least one linked row not matching the link criteria.
    NotAll,
}

impl JoinKind {
    /// Returns the FetchXML `link-type` attribute value.
    pub fn as_fetchxml(&self) -> &'static str {
        match self {
            JoinKind::Inner => "inner",
            JoinKind::LeftOuter => "outer",
            JoinKind::Exists => "exists",
            JoinKind::In => "in",
            JoinKind::MatchFirstRowUsingCrossApply => "matchfirstrowusingcrossapply",
            JoinKind::Any => "any",
            JoinKind::NotAny => "not any",
            JoinKind::All => "all",
            JoinKind::NotAll => "not all",
        }
    }
}

/// One join between two entities, possibly with nested joins.
///
/// `from_*` names the parent side, `to_*` the linked entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkDescriptor {
    pub from_entity: String,
    pub from_attribute: String,
    pub to_entity: String,
    pub to_attribute: String,
    pub join_kind: JoinKind,
    pub alias: Option<String>,
    pub columns: ColumnSet,
    /// Conditions applied to the linked entity.
    pub criteria: FilterExpression,
    pub orders: Vec<OrderExpression>,
    pub nested_links: Vec<LinkDescriptor>,
}

/// The accumulated, not-yet-executed description of a retrieval request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    pub entity_name: String,
    pub columns: ColumnSet,
    /// Maximum number of records to return.
    pub top_count: Option<u32>,
    pub distinct: bool,
    /// Read without taking shared locks on the platform's store.
    pub no_lock: bool,
    pub page_info: PagingState,
    pub criteria: FilterExpression,
    pub orders: Vec<OrderExpression>,
    pub links: Vec<LinkDescriptor>,
}

impl QueryDescriptor {
    /// Creates a descriptor for the given entity with platform defaults.
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            columns: ColumnSet::new(),
            top_count: None,
            distinct: false,
            no_lock: true,
            page_info: PagingState::default(),
            criteria: FilterExpression::default(),
            orders: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Renders the descriptor as a FetchXML document.
    ///
    /// The current page number and cookie are included, so the output is
    /// exactly one page request.
    pub fn to_fetchxml(&self) -> String {
        super::fetchxml::query_to_fetchxml(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_set_collapses_duplicates() {
        let mut columns = ColumnSet::new();
        columns.add(["name", "revenue"]);
        columns.add(["name"]);
        columns.add(Vec::<String>::new());
        assert_eq!(columns.columns(), ["name", "revenue"]);
    }

    #[test]
    fn test_descriptor_defaults() {
        let query = QueryDescriptor::new("account");
        assert!(query.no_lock);
        assert!(!query.distinct);
        assert_eq!(query.page_info.page_number, 1);
        assert!(query.page_info.paging_cookie.is_none());
        assert!(!query.page_info.return_total_record_count);
    }
}
