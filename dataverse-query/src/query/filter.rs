//! Filter expressions for query and link criteria.

use crate::model::Value;

/// How the members of a filter group combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

impl LogicalOperator {
    pub fn as_fetchxml(&self) -> &'static str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        }
    }
}

/// Comparison applied by a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterEqual,
    LessThan,
    LessEqual,
    Like,
    NotLike,
    BeginsWith,
    EndsWith,
    In,
    NotIn,
    Between,
    NotBetween,
    Null,
    NotNull,
}

impl ConditionOperator {
    /// Returns the FetchXML `operator` attribute value.
    pub fn as_fetchxml(&self) -> &'static str {
        match self {
            ConditionOperator::Equal => "eq",
            ConditionOperator::NotEqual => "ne",
            ConditionOperator::GreaterThan => "gt",
            ConditionOperator::GreaterEqual => "ge",
            ConditionOperator::LessThan => "lt",
            ConditionOperator::LessEqual => "le",
            ConditionOperator::Like => "like",
            ConditionOperator::NotLike => "not-like",
            ConditionOperator::BeginsWith => "begins-with",
            ConditionOperator::EndsWith => "ends-with",
            ConditionOperator::In => "in",
            ConditionOperator::NotIn => "not-in",
            ConditionOperator::Between => "between",
            ConditionOperator::NotBetween => "not-between",
            ConditionOperator::Null => "null",
            ConditionOperator::NotNull => "not-null",
        }
    }

    /// Returns `true` for operators that take a list of `<value>` children.
    pub(crate) fn is_multi_valued(&self) -> bool {
        matches!(
            self,
            ConditionOperator::In
                | ConditionOperator::NotIn
                | ConditionOperator::Between
                | ConditionOperator::NotBetween
        )
    }
}

/// A single attribute comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionExpression {
    /// Entity (or link alias) the attribute belongs to, when it is not the
    /// entity the filter is attached to.
    pub entity_name: Option<String>,
    pub attribute: String,
    pub operator: ConditionOperator,
    pub values: Vec<Value>,
}

impl ConditionExpression {
    pub fn new<I, V>(attribute: impl Into<String>, operator: ConditionOperator, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            entity_name: None,
            attribute: attribute.into(),
            operator,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Scopes the condition to another entity or link alias.
    pub fn with_entity(mut self, entity_name: impl Into<String>) -> Self {
        self.entity_name = Some(entity_name.into());
        self
    }
}

/// A group of conditions and nested groups joined by one logical operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpression {
    pub operator: LogicalOperator,
    pub conditions: Vec<ConditionExpression>,
    pub filters: Vec<FilterExpression>,
}

impl FilterExpression {
    pub fn new(operator: LogicalOperator) -> Self {
        Self {
            operator,
            conditions: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Returns `true` if the filter constrains nothing.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.filters.iter().all(FilterExpression::is_empty)
    }
}

/// Builder handed to `filter` callbacks.
///
/// ```ignore
/// query.filter(LogicalOperator::Or, |f| {
///     f.condition("statecode", ConditionOperator::Equal, [0])
///         .condition("name", ConditionOperator::BeginsWith, ["Con"]);
/// });
/// ```
#[derive(Debug, Default)]
pub struct FilterBuilder {
    filter: FilterExpression,
}

impl FilterBuilder {
    pub(crate) fn new(operator: LogicalOperator) -> Self {
        Self {
            filter: FilterExpression::new(operator),
        }
    }

    /// Adds a condition on the filtered entity.
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
        self.filter
            .conditions
            .push(ConditionExpression::new(attribute, operator, values));
        self
    }

    /// Adds a condition on another entity or link alias.
    pub fn entity_condition<I, V>(
        &mut self,
        entity_name: impl Into<String>,
        attribute: impl Into<String>,
        operator: ConditionOperator,
        values: I,
    ) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.filter
            .conditions
            .push(ConditionExpression::new(attribute, operator, values).with_entity(entity_name));
        self
    }

    /// Adds a nested group.
    pub fn filter<F>(&mut self, operator: LogicalOperator, configure: F) -> &mut Self
    where
        F: FnOnce(&mut FilterBuilder),
    {
        let nested = build_filter(operator, configure);
        self.filter.filters.push(nested);
        self
    }

    pub(crate) fn into_filter(self) -> FilterExpression {
        self.filter
    }
}

/// Runs a filter callback against a fresh builder and returns its result.
pub(crate) fn build_filter<F>(operator: LogicalOperator, configure: F) -> FilterExpression
where
    F: FnOnce(&mut FilterBuilder),
{
    let mut builder = FilterBuilder::new(operator);
    configure(&mut builder);
    builder.into_filter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_filter() {
        let filter = build_filter(LogicalOperator::And, |f| {
            f.condition("statecode", ConditionOperator::Equal, [0])
                .filter(LogicalOperator::Or, |or| {
                    or.condition("name", ConditionOperator::BeginsWith, ["A"])
                        .entity_condition("pc", "fullname", ConditionOperator::NotNull, Vec::<Value>::new());
                });
        });

        assert_eq!(filter.conditions.len(), 1);
        assert_eq!(filter.filters.len(), 1);
        assert_eq!(filter.filters[0].operator, LogicalOperator::Or);
        assert_eq!(
            filter.filters[0].conditions[1].entity_name.as_deref(),
            Some("pc")
        );
    }

    #[test]
    fn test_empty_groups_are_empty() {
        let filter = build_filter(LogicalOperator::And, |f| {
            f.filter(LogicalOperator::Or, |_| {});
        });
        assert!(filter.is_empty());
    }
}
