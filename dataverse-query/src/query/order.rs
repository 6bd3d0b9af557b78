//! Ordering of query results.

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

/// Orders results by one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderExpression {
    pub attribute: String,
    pub direction: Direction,
    /// Orders by an aggregate or column alias instead of an attribute.
    pub alias: Option<String>,
}

impl OrderExpression {
    pub fn new(attribute: impl Into<String>, direction: Direction) -> Self {
        Self {
            attribute: attribute.into(),
            direction,
            alias: None,
        }
    }

    pub fn asc(attribute: impl Into<String>) -> Self {
        Self::new(attribute, Direction::Asc)
    }

    pub fn desc(attribute: impl Into<String>) -> Self {
        Self::new(attribute, Direction::Desc)
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}
