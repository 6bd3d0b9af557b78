//! Query builder.

use futures::Stream;
use futures::TryStreamExt;
use log::debug;

use crate::QueryConfig;
use crate::error::Error;
use crate::model::Value;

use super::descriptor::PagingState;
use super::descriptor::QueryDescriptor;
use super::filter::ConditionExpression;
use super::filter::ConditionOperator;
use super::filter::FilterBuilder;
use super::filter::FilterExpression;
use super::filter::LogicalOperator;
use super::filter::build_filter;
use super::link::LinkBuilder;
use super::link::build_link;
use super::order::Direction;
use super::order::OrderExpression;
use super::page::Page;
use super::pages::page_stream;
use super::port::FromRecord;
use super::port::RetrievalPort;

/// Fluent builder for a [`QueryDescriptor`], bound to a retrieval port.
///
/// Use [`RetrievalPort::query`] or [`QueryBuilder::new`] to create one.
/// Setters take `&mut self` and return the same builder, so configuration
/// can be chained off a local binding:
///
/// ```ignore
/// let mut query = port.query("account");
/// query
///     .include_columns(["name", "revenue"])
///     .condition("statecode", ConditionOperator::Equal, [0])
///     .order("revenue", Direction::Desc)
///     .link(|link| {
///         link.from_attribute("primarycontactid")
///             .to_entity("contact")
///             .to_attribute("contactid")
///             .alias("pc")
///             .include_columns(["fullname"]);
///     });
///
/// let accounts: Vec<Record> = query.retrieve_all().await?;
/// ```
pub struct QueryBuilder<'a, P: RetrievalPort + ?Sized> {
    port: &'a P,
    expression: QueryDescriptor,
}

impl<'a, P: RetrievalPort + ?Sized> QueryBuilder<'a, P> {
    /// Creates a builder for `entity_name` with the default [`QueryConfig`].
    pub fn new(port: &'a P, entity_name: impl Into<String>) -> Self {
        Self::with_config(port, entity_name, &QueryConfig::default())
    }

    /// Creates a builder whose descriptor starts from `config`.
    pub fn with_config(port: &'a P, entity_name: impl Into<String>, config: &QueryConfig) -> Self {
        let mut expression = QueryDescriptor::new(entity_name);
        expression.no_lock = config.no_lock;
        expression.distinct = config.distinct;
        expression.page_info.count = config.page_size;
        expression.page_info.return_total_record_count = config.return_total_record_count;
        Self { port, expression }
    }

    // =========================================================================
    // Shape
    // =========================================================================

    /// Adds columns to the result. Names already present are ignored.
    pub fn include_columns<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expression.columns.add(names);
        self
    }

    /// Requests every column of the entity.
    pub fn all_columns(&mut self, all: bool) -> &mut Self {
        self.expression.columns.all_columns = all;
        self
    }

    /// Caps the number of records returned. `None` removes the cap.
    pub fn record_count(&mut self, count: Option<u32>) -> &mut Self {
        self.expression.top_count = count;
        self
    }

    /// Chooses whether the platform takes shared locks while reading.
    ///
    /// Queries read without locks unless this is called with `true`.
    pub fn database_lock(&mut self, use_lock: bool) -> &mut Self {
        self.expression.no_lock = !use_lock;
        self
    }

    /// Returns only distinct rows.
    pub fn unique_records(&mut self, unique: bool) -> &mut Self {
        self.expression.distinct = unique;
        self
    }

    /// Replaces the paging state wholesale.
    pub fn page_info(&mut self, state: PagingState) -> &mut Self {
        self.expression.page_info = state;
        self
    }

    /// Asks the platform to report the total record count.
    pub fn total_record_count(&mut self, flag: bool) -> &mut Self {
        self.expression.page_info.return_total_record_count = flag;
        self
    }

    /// Sets the number of records per page.
    pub fn page_size(&mut self, size: Option<u32>) -> &mut Self {
        self.expression.page_info.count = size;
        self
    }

    /// Adds a join configured by `configure`.
    ///
    /// The callback runs before this method returns and its link is appended
    /// exactly once. A link that leaves `from_entity` unset joins from this
    /// query's entity.
    pub fn link<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut LinkBuilder),
    {
        let link = build_link(&self.expression.entity_name, configure);
        self.expression.links.push(link);
        self
    }

    // =========================================================================
    // Criteria
    // =========================================================================

    /// Adds a condition to the query's root filter.
    pub fn condition<I, V>(
        &mut self,
        attribute: impl Into<String>,
        operator: ConditionOperator,
        values: I,
    ) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.expression
            .criteria
            .conditions
            .push(ConditionExpression::new(attribute, operator, values));
        self
    }

    /// Adds a nested filter group to the root filter.
    pub fn filter<F>(&mut self, operator: LogicalOperator, configure: F) -> &mut Self
    where
        F: FnOnce(&mut FilterBuilder),
    {
        let filter = build_filter(operator, configure);
        self.expression.criteria.filters.push(filter);
        self
    }

    /// Replaces the root filter.
    pub fn criteria(&mut self, filter: FilterExpression) -> &mut Self {
        self.expression.criteria = filter;
        self
    }

    /// Appends an ordering on `attribute`; earlier orders take precedence.
    pub fn order(&mut self, attribute: impl Into<String>, direction: Direction) -> &mut Self {
        self.expression
            .orders
            .push(OrderExpression::new(attribute, direction));
        self
    }

    // =========================================================================
    // Descriptor access
    // =========================================================================

    /// Returns the live descriptor.
    pub fn expression(&self) -> &QueryDescriptor {
        &self.expression
    }

    /// Returns the live descriptor for direct edits.
    ///
    /// Nothing written here is checked; the builder's own guarantees (such
    /// as duplicate-free columns) only hold for changes made through it.
    pub fn expression_mut(&mut self) -> &mut QueryDescriptor {
        &mut self.expression
    }

    /// Consumes the builder and returns its descriptor.
    pub fn into_expression(self) -> QueryDescriptor {
        self.expression
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Fetches the currently configured page, keeping its continuation state.
    pub async fn retrieve_page<T: FromRecord>(&self) -> Result<Page<T>, Error> {
        debug!(
            "Retrieving '{}' page {}",
            self.expression.entity_name, self.expression.page_info.page_number
        );
        let page = self.port.retrieve_page(&self.expression).await?;
        page.map_records()
    }

    /// Fetches the currently configured page.
    ///
    /// Issues exactly one port request using the page number and cookie set
    /// on the builder, and returns the records in the order the port gave.
    pub async fn retrieve<T: FromRecord>(&self) -> Result<Vec<T>, Error> {
        Ok(self.retrieve_page::<T>().await?.into_records())
    }

    /// Fetches every page, starting from page 1.
    ///
    /// The builder's own page number and cookie are neither used nor
    /// changed. Records come back in page order. If any page fails the error
    /// is returned and records from earlier pages are dropped.
    pub async fn retrieve_all<T: FromRecord + 'a>(&self) -> Result<Vec<T>, Error> {
        let mut pages = std::pin::pin!(self.pages::<T>());
        let mut records = Vec::new();
        let mut fetched = 0usize;

        while let Some(page) = pages.try_next().await? {
            fetched += 1;
            records.extend(page.into_records());
        }

        debug!(
            "Retrieved {} '{}' records over {} pages",
            records.len(),
            self.expression.entity_name,
            fetched
        );
        Ok(records)
    }

    /// Streams every page, starting from page 1.
    ///
    /// Works on a snapshot of the descriptor taken when called, so the
    /// builder may be reconfigured while the stream is consumed.
    pub fn pages<T: FromRecord + 'a>(
        &self,
    ) -> impl Stream<Item = Result<Page<T>, Error>> + use<'a, P, T> {
        page_stream(self.port, self.expression.clone())
    }
}
