//! Navigation and attribute helpers for the statistics XML document.
//!
//! All structural failures carry the element path from the document root so
//! malformed uploads can be diagnosed without the source file at hand.

use roxmltree::{Document, Node};

use crate::error::{ExportError, Result};
use crate::flatten::{self, USER_GROUPS_CONTAINER, USERS_CONTAINER};
use crate::model::{DocumentSummary, EntityCount};

/// Element wrapping the whole statistics tree.
pub const LOGIN_STATISTICS: &str = "LoginStatistics";
/// The root node of the statistics tree itself.
pub const TOTAL_STATISTICS: &str = "TotalStatistics";

/// Resolves the `TotalStatistics` node that roots the statistics tree.
pub fn total_statistics<'a, 'input>(doc: &'a Document<'input>) -> Result<Node<'a, 'input>> {
    let login = child_element(doc.root_element(), LOGIN_STATISTICS)?;
    child_element(login, TOTAL_STATISTICS)
}

/// Reads the top-level fields consumed by the summary sheet: the document
/// attributes plus the aggregate node's direct user and user-group pairs.
pub fn document_summary(doc: &Document) -> Result<DocumentSummary> {
    let root = doc.root_element();
    let login = child_element(root, LOGIN_STATISTICS)?;
    let total = child_element(login, TOTAL_STATISTICS)?;

    Ok(DocumentSummary {
        system_name: required_attr(root, "SystemName")?.to_string(),
        system_version: required_attr(root, "SystemVersion")?.to_string(),
        start_date: required_attr(login, "StartDate")?.to_string(),
        total_count: required_int_attr(total, "Count")?,
        users: entity_counts(total, USERS_CONTAINER, "UserInfo")?,
        groups: entity_counts(total, USER_GROUPS_CONTAINER, "UserGroupInfo")?,
    })
}

fn entity_counts(
    node: Node,
    container: &'static str,
    entry: &'static str,
) -> Result<Vec<EntityCount>> {
    flatten::container_entries(node, container, entry)
        .map(|child| {
            Ok(EntityCount {
                id: required_attr(child, "ID")?.to_string(),
                count: required_int_attr(child, "Count")?,
            })
        })
        .collect()
}

/// Finds the first child element with the given name, reporting the missing
/// path otherwise.
pub fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Result<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == name)
        .ok_or_else(|| ExportError::MissingElement {
            path: format!("{}/{}", node_path(node), name),
        })
}

/// Reads a required string attribute.
pub fn required_attr<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str> {
    node.attribute(name)
        .ok_or_else(|| ExportError::MissingAttribute {
            path: node_path(node),
            attribute: name.to_string(),
        })
}

/// Reads an optional integer attribute; a present but unparseable value is
/// a hard error, never silently defaulted.
pub fn int_attr(node: Node, name: &str) -> Result<Option<i32>> {
    match node.attribute(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| invalid_attribute(node, name, raw)),
    }
}

/// Reads a required integer attribute.
pub fn required_int_attr(node: Node, name: &str) -> Result<i64> {
    let raw = required_attr(node, name)?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| invalid_attribute(node, name, raw))
}

fn invalid_attribute(node: Node, name: &str, raw: &str) -> ExportError {
    ExportError::InvalidAttribute {
        path: node_path(node),
        attribute: name.to_string(),
        value: raw.to_string(),
    }
}

/// Slash-separated element path from the document root down to `node`.
pub fn node_path(node: Node) -> String {
    let mut segments: Vec<&str> = node
        .ancestors()
        .filter(Node::is_element)
        .map(|ancestor| ancestor.tag_name().name())
        .collect();
    segments.reverse();
    segments.join("/")
}
