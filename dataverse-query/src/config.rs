//! Query defaults

/// Defaults applied to every query a builder starts.
///
/// # Example
///
/// ```
/// use dataverse_query::QueryConfig;
///
/// let config = QueryConfig::default()
///     .with_page_size(500)
///     .with_total_record_count(true);
/// assert!(config.no_lock);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// Read without shared locks.
    ///
    /// Default: `true`
    pub no_lock: bool,

    /// Return only distinct rows.
    ///
    /// Default: `false`
    pub distinct: bool,

    /// Records per page. `None` leaves the page size to the platform
    /// (5000 on Dataverse).
    ///
    /// Default: `None`
    pub page_size: Option<u32>,

    /// Ask the platform for the total record count.
    ///
    /// Default: `false`
    pub return_total_record_count: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            no_lock: true,
            distinct: false,
            page_size: None,
            return_total_record_count: false,
        }
    }
}

impl QueryConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default locking behaviour.
    pub fn with_no_lock(mut self, no_lock: bool) -> Self {
        self.no_lock = no_lock;
        self
    }

    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Sets the default page size.
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn with_total_record_count(mut self, flag: bool) -> Self {
        self.return_total_record_count = flag;
        self
    }
}
