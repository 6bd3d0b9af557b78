//! Link builder for joins.

use log::trace;

use crate::model::Value;

use super::descriptor::JoinKind;
use super::descriptor::LinkDescriptor;
use super::filter::ConditionExpression;
use super::filter::ConditionOperator;
use super::filter::FilterBuilder;
use super::filter::LogicalOperator;
use super::filter::build_filter;
use super::order::Direction;
use super::order::OrderExpression;

/// Builder for one join, handed to `link` callbacks.
///
/// The descriptor is appended to its parent when the callback returns; the
/// builder itself is dropped at that point.
///
/// # Example
///
/// ```ignore
/// port.query("account")
///     .include_columns(["name"])
///     .link(|link| {
///         link.from_attribute("primarycontactid")
///             .to_entity("contact")
///             .to_attribute("contactid")
///             .alias("pc")
///             .link_kind(JoinKind::LeftOuter)
///             .include_columns(["fullname", "emailaddress1"]);
///     });
/// ```
#[derive(Debug, Default)]
pub struct LinkBuilder {
    link: LinkDescriptor,
}

impl LinkBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sets the parent entity of the join.
    ///
    /// Left empty, it is filled with the entity the link is attached to.
    pub fn from_entity(&mut self, entity: impl Into<String>) -> &mut Self {
        self.link.from_entity = entity.into();
        self
    }

    /// Sets the attribute on the parent entity.
    pub fn from_attribute(&mut self, attribute: impl Into<String>) -> &mut Self {
        self.link.from_attribute = attribute.into();
        self
    }

    /// Sets the entity being joined.
    pub fn to_entity(&mut self, entity: impl Into<String>) -> &mut Self {
        self.link.to_entity = entity.into();
        self
    }

    /// Sets the attribute on the joined entity.
    pub fn to_attribute(&mut self, attribute: impl Into<String>) -> &mut Self {
        self.link.to_attribute = attribute.into();
        self
    }

    /// Adds columns of the joined entity to the result.
    pub fn include_columns<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.link.columns.add(names);
        self
    }

    /// Requests every column of the joined entity.
    pub fn all_columns(&mut self, all: bool) -> &mut Self {
        self.link.columns.all_columns = all;
        self
    }

    /// Sets the alias used to prefix the joined entity's columns.
    pub fn alias(&mut self, alias: impl Into<String>) -> &mut Self {
        self.link.alias = Some(alias.into());
        self
    }

    /// Sets the join kind. Defaults to [`JoinKind::Inner`].
    pub fn link_kind(&mut self, kind: JoinKind) -> &mut Self {
        self.link.join_kind = kind;
        self
    }

    /// Adds a condition on the joined entity.
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
        self.link
            .criteria
            .conditions
            .push(ConditionExpression::new(attribute, operator, values));
        self
    }

    /// Adds a nested filter group to the link criteria.
    pub fn filter<F>(&mut self, operator: LogicalOperator, configure: F) -> &mut Self
    where
        F: FnOnce(&mut FilterBuilder),
    {
        let filter = build_filter(operator, configure);
        self.link.criteria.filters.push(filter);
        self
    }

    /// Orders rows of the joined entity by `attribute`.
    pub fn order(&mut self, attribute: impl Into<String>, direction: Direction) -> &mut Self {
        self.link.orders.push(OrderExpression::new(attribute, direction));
        self
    }

    /// Adds a nested join from this link's entity.
    ///
    /// A nested link that leaves `from_entity` unset joins from this link's
    /// `to_entity`, whenever that is set.
    pub fn link<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut LinkBuilder),
    {
        let nested = run_link_callback(configure);
        self.link.nested_links.push(nested);
        self
    }

    /// Returns the descriptor built so far.
    pub fn descriptor(&self) -> &LinkDescriptor {
        &self.link
    }

    pub(crate) fn into_descriptor(self) -> LinkDescriptor {
        self.link
    }
}

/// Runs a link callback against a fresh builder and returns the finished
/// descriptor.
///
/// Empty `from_entity` values are filled here, once the whole tree is
/// known: the top link gets `parent_entity`, nested links their parent's
/// `to_entity`.
pub(crate) fn build_link<F>(parent_entity: &str, configure: F) -> LinkDescriptor
where
    F: FnOnce(&mut LinkBuilder),
{
    let mut link = run_link_callback(configure);
    fill_from_entities(&mut link, parent_entity);
    trace!(
        "Built link {}.{} -> {}.{} ({} nested)",
        link.from_entity,
        link.from_attribute,
        link.to_entity,
        link.to_attribute,
        link.nested_links.len()
    );
    link
}

fn run_link_callback<F>(configure: F) -> LinkDescriptor
where
    F: FnOnce(&mut LinkBuilder),
{
    let mut builder = LinkBuilder::new();
    configure(&mut builder);
    builder.into_descriptor()
}

fn fill_from_entities(link: &mut LinkDescriptor, parent_entity: &str) {
    if link.from_entity.is_empty() {
        link.from_entity = parent_entity.to_string();
    }
    for nested in &mut link.nested_links {
        fill_from_entities(nested, &link.to_entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_setters() {
        let link = build_link("account", |link| {
            link.from_attribute("primarycontactid")
                .to_entity("contact")
                .to_attribute("contactid")
                .alias("pc")
                .link_kind(JoinKind::LeftOuter)
                .include_columns(["fullname", "fullname"]);
        });

        assert_eq!(link.from_entity, "account");
        assert_eq!(link.from_attribute, "primarycontactid");
        assert_eq!(link.to_entity, "contact");
        assert_eq!(link.to_attribute, "contactid");
        assert_eq!(link.alias.as_deref(), Some("pc"));
        assert_eq!(link.join_kind, JoinKind::LeftOuter);
        assert_eq!(link.columns.columns(), ["fullname"]);
    }

    #[test]
    fn test_explicit_from_entity_is_kept() {
        let link = build_link("account", |link| {
            link.from_entity("a").to_entity("b");
        });
        assert_eq!(link.from_entity, "a");
    }

    #[test]
    fn test_nested_link_defaults_to_parent_link_entity() {
        let link = build_link("account", |link| {
            link.from_entity("a").to_entity("b").link(|nested| {
                nested.to_entity("c");
            });
        });

        assert_eq!(link.nested_links.len(), 1);
        assert_eq!(link.nested_links[0].from_entity, "b");
        assert_eq!(link.nested_links[0].to_entity, "c");
    }

    #[test]
    fn test_nested_link_defaults_ignore_setter_order() {
        let link = build_link("account", |link| {
            link.link(|nested| {
                nested.to_entity("c").link(|deep| {
                    deep.to_entity("d");
                });
            })
            .from_entity("a")
            .to_entity("b");
        });

        let nested = &link.nested_links[0];
        assert_eq!(nested.from_entity, "b");
        assert_eq!(nested.nested_links[0].from_entity, "c");
    }

    #[test]
    fn test_link_criteria() {
        let link = build_link("account", |link| {
            link.to_entity("contact")
                .condition("statecode", ConditionOperator::Equal, [0])
                .filter(LogicalOperator::Or, |f| {
                    f.condition("firstname", ConditionOperator::BeginsWith, ["J"]);
                })
                .order("fullname", Direction::Desc);
        });

        assert_eq!(link.criteria.conditions.len(), 1);
        assert_eq!(link.criteria.filters.len(), 1);
        assert_eq!(link.orders, vec![OrderExpression::desc("fullname")]);
    }
}
