//! Document extraction
//!
//! Turns one parsed report document into table rows: flat extractors for
//! the top-level parameter/field/variable/query-string collections, and a
//! recursive engine for embedded sub-report references.

pub mod document;
pub mod sanitize;
pub mod subreport;

pub use sanitize::sanitize_expression;

use crate::tables::Tables;
use roxmltree::{Document, Node};

/// Run every extractor against a parsed document, appending rows owned by
/// `file_id`.
pub fn extract_all(doc: &Document, file_id: u64, tables: &mut Tables) {
    let root = doc.root_element();

    document::extract_parameters(root, file_id, tables);
    document::extract_fields(root, file_id, tables);
    document::extract_variables(root, file_id, tables);
    document::extract_query_strings(root, file_id, tables);
    subreport::extract_subreports(root, file_id, tables);
}

/// First direct child element with the given tag name, namespace-agnostic.
pub(crate) fn child_named<'a, 'input>(
    node: Node<'a, 'input>,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// Text content of the first direct child element with the given tag name.
pub(crate) fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child_named(node, name).and_then(|n| n.text())
}

/// Direct child elements with the given tag name.
pub(crate) fn children_named<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}
