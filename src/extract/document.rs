//! Flat document extractors
//!
//! Parameters, fields, variables, and query strings are flat collections of
//! direct children of the document root. Each extractor emits one row per
//! element with the owning file id; no recursion, no cross-element context.
//!
//! Declared types arrive fully qualified (`java.lang.String`); only the
//! final dot-delimited segment is kept. Default-value expressions are
//! sanitized only for String-typed declarations.

use crate::extract::sanitize::sanitize_expression;
use crate::extract::{child_text, children_named};
use crate::tables::Tables;
use roxmltree::Node;

/// Keep the final segment of a fully qualified type name.
fn type_basename(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// One row per `parameter` child of the document root.
pub fn extract_parameters(root: Node, file_id: u64, tables: &mut Tables) {
    for element in children_named(root, "parameter") {
        let name = element.attribute("name").unwrap_or_default().to_string();
        let data_type = element
            .attribute("class")
            .map(type_basename)
            .unwrap_or_default()
            .to_string();

        let value = match child_text(element, "defaultValueExpression") {
            Some(text) if data_type == "String" => sanitize_expression(text),
            _ => String::new(),
        };

        tables.push_parameter(file_id, None, name, data_type, value);
    }
}

/// One row per `field` child of the document root.
pub fn extract_fields(root: Node, file_id: u64, tables: &mut Tables) {
    for element in children_named(root, "field") {
        let name = element.attribute("name").unwrap_or_default().to_string();
        let data_type = element
            .attribute("class")
            .map(type_basename)
            .unwrap_or_default()
            .to_string();

        tables.push_field(file_id, name, data_type);
    }
}

/// One row per `variable` child of the document root. The initial-value
/// expression serves as the variable's default value.
pub fn extract_variables(root: Node, file_id: u64, tables: &mut Tables) {
    for element in children_named(root, "variable") {
        let name = element.attribute("name").unwrap_or_default().to_string();
        let data_type = element
            .attribute("class")
            .map(type_basename)
            .unwrap_or_default()
            .to_string();

        let value = match child_text(element, "initialValueExpression") {
            Some(text) if data_type == "String" => sanitize_expression(text),
            Some(text) => text.trim().to_string(),
            None => String::new(),
        };

        tables.push_variable(file_id, name, data_type, value);
    }
}

/// One row per `queryString` child of the document root. At most one in
/// practice, but the model allows zero or more.
pub fn extract_query_strings(root: Node, file_id: u64, tables: &mut Tables) {
    for element in children_named(root, "queryString") {
        let value = element
            .text()
            .map(sanitize_expression)
            .unwrap_or_default();

        tables.push_query_string(file_id, value);
    }
}
