//! FetchXML rendering of query descriptors.

use crate::model::Value;

use super::descriptor::ColumnSet;
use super::descriptor::LinkDescriptor;
use super::descriptor::QueryDescriptor;
use super::filter::ConditionExpression;
use super::filter::FilterExpression;
use super::order::Direction;
use super::order::OrderExpression;

/// Escapes a string for use in XML attribute values.
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub(crate) fn query_to_fetchxml(query: &QueryDescriptor) -> String {
    let mut fetch_attrs = vec![
        r#"version="1.0""#.to_string(),
        r#"output-format="xml-platform""#.to_string(),
        r#"mapping="logical""#.to_string(),
        format!(r#"distinct="{}""#, query.distinct),
        format!(r#"no-lock="{}""#, query.no_lock),
    ];

    if let Some(top) = query.top_count {
        fetch_attrs.push(format!(r#"top="{}""#, top));
    }

    let paging = &query.page_info;
    if let Some(count) = paging.count {
        fetch_attrs.push(format!(r#"count="{}""#, count));
    }
    // Page 1 without a cookie is the platform default.
    if paging.page_number > 1 || paging.paging_cookie.is_some() {
        fetch_attrs.push(format!(r#"page="{}""#, paging.page_number));
    }
    if let Some(ref cookie) = paging.paging_cookie {
        fetch_attrs.push(format!(r#"paging-cookie="{}""#, escape_xml(cookie)));
    }
    if paging.return_total_record_count {
        fetch_attrs.push(r#"returntotalrecordcount="true""#.to_string());
    }

    let mut content = columns_to_fetchxml(&query.columns);
    content.push_str(&orders_to_fetchxml(&query.orders));
    content.push_str(&filter_to_fetchxml(&query.criteria));
    for link in &query.links {
        content.push_str(&link_to_fetchxml(link));
    }

    format!(
        r#"<fetch {}><entity name="{}">{}</entity></fetch>"#,
        fetch_attrs.join(" "),
        escape_xml(&query.entity_name),
        content
    )
}

/// Converts a link to a `<link-entity>` element.
///
/// FetchXML names the linked entity's attribute `from` and the parent's `to`,
/// the reverse of the descriptor's naming.
pub(crate) fn link_to_fetchxml(link: &LinkDescriptor) -> String {
    let alias_attr = link
        .alias
        .as_ref()
        .map(|a| format!(r#" alias="{}""#, escape_xml(a)))
        .unwrap_or_default();

    let mut content = columns_to_fetchxml(&link.columns);
    content.push_str(&orders_to_fetchxml(&link.orders));
    content.push_str(&filter_to_fetchxml(&link.criteria));
    for nested in &link.nested_links {
        content.push_str(&link_to_fetchxml(nested));
    }

    format!(
        r#"<link-entity name="{}" from="{}" to="{}" link-type="{}"{}>{}</link-entity>"#,
        escape_xml(&link.to_entity),
        escape_xml(&link.to_attribute),
        escape_xml(&link.from_attribute),
        link.join_kind.as_fetchxml(),
        alias_attr,
        content
    )
}

/// Generates `<attribute>` elements, or `<all-attributes/>`.
pub(crate) fn columns_to_fetchxml(columns: &ColumnSet) -> String {
    if columns.all_columns {
        return "<all-attributes/>".to_string();
    }
    columns
        .columns()
        .iter()
        .map(|c| format!(r#"<attribute name="{}"/>"#, escape_xml(c)))
        .collect::<Vec<_>>()
        .join("")
}

/// Converts a filter group; empty groups render as nothing.
pub(crate) fn filter_to_fetchxml(filter: &FilterExpression) -> String {
    if filter.is_empty() {
        return String::new();
    }

    let mut content: String = filter.conditions.iter().map(condition_to_fetchxml).collect();
    for nested in &filter.filters {
        content.push_str(&filter_to_fetchxml(nested));
    }

    format!(
        r#"<filter type="{}">{}</filter>"#,
        filter.operator.as_fetchxml(),
        content
    )
}

pub(crate) fn condition_to_fetchxml(condition: &ConditionExpression) -> String {
    let entity_attr = condition
        .entity_name
        .as_ref()
        .map(|e| format!(r#" entityname="{}""#, escape_xml(e)))
        .unwrap_or_default();
    let head = format!(
        r#"<condition{} attribute="{}" operator="{}""#,
        entity_attr,
        escape_xml(&condition.attribute),
        condition.operator.as_fetchxml()
    );

    match condition.values.as_slice() {
        [] => format!("{}/>", head),
        [Value::Null] if !condition.operator.is_multi_valued() => format!("{}/>", head),
        [single] if !condition.operator.is_multi_valued() => format!(
            r#"{} value="{}"/>"#,
            head,
            escape_xml(&single.to_query_literal())
        ),
        values => {
            let children: String = values
                .iter()
                .map(|v| format!("<value>{}</value>", escape_xml(&v.to_query_literal())))
                .collect();
            format!("{}>{}</condition>", head, children)
        }
    }
}

/// Converts orders to `<order>` elements.
pub(crate) fn orders_to_fetchxml(orders: &[OrderExpression]) -> String {
    orders
        .iter()
        .map(|order| {
            let descending = match order.direction {
                Direction::Asc => "false",
                Direction::Desc => "true",
            };
            match order.alias {
                Some(ref alias) => format!(
                    r#"<order alias="{}" descending="{}"/>"#,
                    escape_xml(alias),
                    descending
                ),
                None => format!(
                    r#"<order attribute="{}" descending="{}"/>"#,
                    escape_xml(&order.attribute),
                    descending
                ),
            }
        })
        .collect::<Vec<_>>()
        .join("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ConditionOperator;
    use crate::query::JoinKind;
    use crate::query::LogicalOperator;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("O'Brien & Co"), "O&apos;Brien &amp; Co");
        assert_eq!(escape_xml("<test>"), "&lt;test&gt;");
    }

    #[test]
    fn test_minimal_query() {
        let query = QueryDescriptor::new("account");
        assert_eq!(
            query_to_fetchxml(&query),
            r#"<fetch version="1.0" output-format="xml-platform" mapping="logical" distinct="false" no-lock="true"><entity name="account"></entity></fetch>"#
        );
    }

    #[test]
    fn test_paging_attributes() {
        let mut query = QueryDescriptor::new("account");
        query.page_info.page_number = 3;
        query.page_info.paging_cookie = Some(r#"<cookie page="2"/>"#.to_string());
        query.page_info.count = Some(50);
        query.page_info.return_total_record_count = true;

        let xml = query_to_fetchxml(&query);
        assert!(xml.contains(r#"count="50""#));
        assert!(xml.contains(r#"page="3""#));
        assert!(xml.contains(r#"paging-cookie="&lt;cookie page=&quot;2&quot;/&gt;""#));
        assert!(xml.contains(r#"returntotalrecordcount="true""#));
    }

    #[test]
    fn test_link_swaps_from_and_to() {
        let link = LinkDescriptor {
            from_entity: "account".to_string(),
            from_attribute: "primarycontactid".to_string(),
            to_entity: "contact".to_string(),
            to_attribute: "contactid".to_string(),
            join_kind: JoinKind::LeftOuter,
            alias: Some("pc".to_string()),
            ..LinkDescriptor::default()
        };
        assert_eq!(
            link_to_fetchxml(&link),
            r#"<link-entity name="contact" from="contactid" to="primarycontactid" link-type="outer" alias="pc"></link-entity>"#
        );
    }

    #[test]
    fn test_conditions() {
        assert_eq!(
            condition_to_fetchxml(&ConditionExpression::new(
                "name",
                ConditionOperator::Equal,
                ["Contoso"]
            )),
            r#"<condition attribute="name" operator="eq" value="Contoso"/>"#
        );
        assert_eq!(
            condition_to_fetchxml(&ConditionExpression::new(
                "parentaccountid",
                ConditionOperator::Null,
                Vec::<Value>::new()
            )),
            r#"<condition attribute="parentaccountid" operator="null"/>"#
        );
        assert_eq!(
            condition_to_fetchxml(
                &ConditionExpression::new("statecode", ConditionOperator::In, [0, 1])
                    .with_entity("pc")
            ),
            r#"<condition entityname="pc" attribute="statecode" operator="in"><value>0</value><value>1</value></condition>"#
        );
    }

    #[test]
    fn test_null_operand_renders_without_value() {
        assert_eq!(
            condition_to_fetchxml(&ConditionExpression::new(
                "parentaccountid",
                ConditionOperator::Equal,
                [Value::Null]
            )),
            r#"<condition attribute="parentaccountid" operator="eq"/>"#
        );
    }

    #[test]
    fn test_filter_skips_empty_groups() {
        let mut filter = FilterExpression::new(LogicalOperator::Or);
        assert_eq!(filter_to_fetchxml(&filter), "");

        filter.filters.push(FilterExpression::default());
        filter
            .conditions
            .push(ConditionExpression::new("revenue", ConditionOperator::GreaterThan, [1000]));
        assert_eq!(
            filter_to_fetchxml(&filter),
            r#"<filter type="or"><condition attribute="revenue" operator="gt" value="1000"/></filter>"#
        );
    }

    #[test]
    fn test_orders() {
        let orders = vec![
            OrderExpression::desc("revenue"),
            OrderExpression::asc("name").with_alias("n"),
        ];
        assert_eq!(
            orders_to_fetchxml(&orders),
            r#"<order attribute="revenue" descending="true"/><order alias="n" descending="false"/>"#
        );
    }
}
