//! Sub-report extraction engine
//!
//! Sub-report references can sit arbitrarily deep inside nested band,
//! group, and section elements. A depth-first descent seeds a pending
//! record at every `subreport` node from that node's own descendants, then
//! carries the batch upward through the call stack: each ancestor pushes
//! its tag onto the records' location stacks and may contribute a display
//! name (its `name` attribute) or a print-when expression (a direct
//! `printWhenExpression` child). When two ancestors at different depths
//! supply the same field, the nearer one wins and the conflict is logged.
//!
//! Direct children of the document root are the batching boundary: when
//! the descent returns to depth 1, the pending batch is flushed into the
//! tables and cleared, so no higher ancestor contributes context.

use crate::extract::sanitize::sanitize_expression;
use crate::extract::{child_named, child_text, children_named};
use crate::tables::Tables;
use roxmltree::Node;
use tracing::warn;

/// Tag identifying a sub-report reference node
const SUBREPORT_TAG: &str = "subreport";

/// The two literal forms denoting "pass the enclosing report's parameter
/// map through unchanged"
const PARAM_MAP_SENTINELS: [&str; 2] = [
    "$P{REPORT_PARAMETERS_MAP}",
    "new HashMap($P{REPORT_PARAMETERS_MAP})",
];

/// A sub-report record being assembled on the way back up the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubreport {
    pub name: String,
    pub key: String,
    pub print_when: String,
    pub param_map: bool,
    pub param_map_expression: String,
    pub expression: String,
    /// Name/value parameter bindings declared on the sub-report node
    pub parameters: Vec<(String, String)>,
    /// Ancestor tags, root-side first; empty at the sub-report node itself
    pub location: Vec<String>,
}

/// Walk the document and persist every sub-report reference found.
pub fn extract_subreports(root: Node, file_id: u64, tables: &mut Tables) {
    let leftover = visit(root, 0, file_id, tables);

    // A subreport that is a direct child of the document root never crosses
    // a depth-1 boundary; flush whatever survived to depth 0 so it is not
    // lost. Its location stack stays empty - the root itself is excluded.
    if !leftover.is_empty() {
        flush(leftover, file_id, tables);
    }
}

/// Visit one node. Returns the pending batch for the caller to adopt.
fn visit(node: Node, depth: u32, file_id: u64, tables: &mut Tables) -> Vec<PendingSubreport> {
    let mut batch: Vec<PendingSubreport> = Vec::new();

    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() == SUBREPORT_TAG {
            batch.push(seed_record(child));
        } else {
            // Sibling subtrees merge by concatenation on return.
            batch.extend(visit(child, depth + 1, file_id, tables));
        }
    }

    if !batch.is_empty() && depth >= 1 {
        let tag = node.tag_name().name().to_string();
        for record in &mut batch {
            record.location.insert(0, tag.clone());
        }

        if let Some(name) = node.attribute("name") {
            let value = sanitize_expression(name);
            if !value.is_empty() {
                apply_context(&mut batch, ContextField::Name, &value);
            }
        }

        if let Some(text) = child_text(node, "printWhenExpression") {
            let value = sanitize_expression(text);
            if !value.is_empty() {
                apply_context(&mut batch, ContextField::PrintWhen, &value);
            }
        }
    }

    if depth == 1 && !batch.is_empty() {
        flush(batch, file_id, tables);
        return Vec::new();
    }

    batch
}

/// Build a record from the sub-report node's own descendants.
fn seed_record(node: Node) -> PendingSubreport {
    let expression = child_text(node, "subreportExpression")
        .map(sanitize_expression)
        .unwrap_or_default();

    let mut param_map = false;
    let mut param_map_expression = String::new();
    if let Some(text) = child_text(node, "parametersMapExpression") {
        let value = sanitize_expression(text);
        if PARAM_MAP_SENTINELS.contains(&value.as_str()) {
            param_map = true;
        } else {
            param_map_expression = value;
        }
    }

    let key = child_named(node, "reportElement")
        .and_then(|el| el.attribute("key"))
        .map(sanitize_expression)
        .unwrap_or_default();

    let parameters = children_named(node, "subreportParameter")
        .map(|el| {
            let name = el
                .attribute("name")
                .map(sanitize_expression)
                .unwrap_or_default();
            let value = child_text(el, "subreportParameterExpression")
                .map(sanitize_expression)
                .unwrap_or_default();
            (name, value)
        })
        .collect();

    PendingSubreport {
        name: String::new(),
        key,
        print_when: String::new(),
        param_map,
        param_map_expression,
        expression,
        parameters,
        location: Vec::new(),
    }
}

#[derive(Debug, Clone, Copy)]
enum ContextField {
    Name,
    PrintWhen,
}

impl ContextField {
    fn as_str(self) -> &'static str {
        match self {
            ContextField::Name => "name",
            ContextField::PrintWhen => "print_when",
        }
    }
}

/// Set an ancestor-supplied field on every pending record. A value set by
/// a nearer ancestor is kept; the conflict is logged, never fatal.
fn apply_context(batch: &mut [PendingSubreport], field: ContextField, value: &str) {
    for record in batch.iter_mut() {
        let slot = match field {
            ContextField::Name => &mut record.name,
            ContextField::PrintWhen => &mut record.print_when,
        };

        if slot.is_empty() {
            *slot = value.to_string();
        } else {
            warn!(
                field = field.as_str(),
                kept = %slot,
                ignored = %value,
                "conflicting ancestor context"
            );
        }
    }
}

/// Persist a finalized batch: one sub-report row each, plus one parameter
/// row per binding carrying the sub-report's id.
fn flush(batch: Vec<PendingSubreport>, file_id: u64, tables: &mut Tables) {
    for record in batch {
        let subreport_id = tables.push_subreport(
            file_id,
            record.location,
            record.name,
            record.key,
            record.print_when,
            record.expression,
            record.param_map,
            record.param_map_expression,
        );

        for (name, value) in record.parameters {
            tables.push_parameter(file_id, Some(subreport_id), name, String::new(), value);
        }
    }
}
