//! Recursive expansion of the nested login-statistics tree.
//!
//! The tree nests period levels arbitrarily deep (Year -> HalfYear ->
//! Quarter -> Month -> Week -> Day). Each typed node yields one aggregate
//! record plus one record per user and per user group listed under it, all
//! sharing the period values in effect at that depth.

use roxmltree::Node;

use crate::error::Result;
use crate::io::xml_read::{int_attr, required_attr, required_int_attr};
use crate::model::{PeriodContext, StatEntry, Target};

/// Container element holding per-user entries.
pub const USERS_CONTAINER: &str = "Users";
/// Container element holding per-user-group entries.
pub const USER_GROUPS_CONTAINER: &str = "UserGroups";
/// Container element holding nested statistics nodes.
pub const SUB_STATISTICS_CONTAINER: &str = "SubStatistics";

// Entry elements carry fully-qualified dotted names in the wire format; they
// are matched on the final segment only, like the `type` attribute.
const USER_ENTRY: &str = "UserInfo";
const USER_GROUP_ENTRY: &str = "UserGroupInfo";
const SUB_ENTRY: &str = "LoginStatistics";

/// Flattens the statistics subtree rooted at `node` with no inherited
/// period values.
pub fn parse_statistics(node: Node) -> Result<Vec<StatEntry>> {
    flatten(node, PeriodContext::default())
}

/// Flattens the subtree rooted at `node`, threading the inherited period
/// context down by value. Records are emitted depth-first, node before
/// children.
pub fn flatten(node: Node, inherited: PeriodContext) -> Result<Vec<StatEntry>> {
    let mut entries = Vec::new();
    let mut period = inherited;

    // The type attribute may arrive namespace-prefixed, so it is matched on
    // its local name only.
    let type_attr = node
        .attributes()
        .find(|attribute| attribute.name() == "type")
        .map(|attribute| attribute.value());

    if let Some(type_name) = type_attr {
        let level = trim_after_last_dot(type_name);

        // A value defined on the node wins; otherwise the ancestor's value
        // is inherited unchanged.
        period = PeriodContext {
            year: int_attr(node, "Year")?.or(inherited.year),
            half_year: int_attr(node, "HalfYear")?.or(inherited.half_year),
            quarter: int_attr(node, "Quarter")?.or(inherited.quarter),
            month: int_attr(node, "Month")?.or(inherited.month),
            week: int_attr(node, "Week")?.or(inherited.week),
            day: int_attr(node, "Day")?.or(inherited.day),
        };

        entries.push(StatEntry {
            level: level.to_string(),
            period,
            id: String::new(),
            count: required_int_attr(node, "Count")?,
            target: Target::Stats,
        });

        for child in container_entries(node, USERS_CONTAINER, USER_ENTRY) {
            entries.push(entity_entry(child, level, period, Target::User)?);
        }

        for child in container_entries(node, USER_GROUPS_CONTAINER, USER_GROUP_ENTRY) {
            entries.push(entity_entry(child, level, period, Target::UserGroup)?);
        }
    }

    // Untyped nodes contribute no records but the traversal continues.
    for child in container_entries(node, SUB_STATISTICS_CONTAINER, SUB_ENTRY) {
        entries.extend(flatten(child, period)?);
    }

    Ok(entries)
}

/// Extracts the content after the last period in the string, e.g.
/// `"A.B.C.YearStatistics"` -> `"YearStatistics"`.
pub fn trim_after_last_dot(value: &str) -> &str {
    match value.rfind('.') {
        Some(index) => &value[index + 1..],
        None => value,
    }
}

/// Iterates the entry elements under the named container children of `node`,
/// keeping only entries whose final dotted name segment matches.
pub(crate) fn container_entries<'a, 'input>(
    node: Node<'a, 'input>,
    container: &'static str,
    entry: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == container)
        .flat_map(|container_node| container_node.children())
        .filter(move |candidate| {
            candidate.is_element() && trim_after_last_dot(candidate.tag_name().name()) == entry
        })
}

fn entity_entry(
    node: Node,
    level: &str,
    period: PeriodContext,
    target: Target,
) -> Result<StatEntry> {
    Ok(StatEntry {
        level: level.to_string(),
        period,
        id: required_attr(node, "ID")?.to_string(),
        count: required_int_attr(node, "Count")?,
        target,
    })
}
