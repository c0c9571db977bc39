//! Decoding of protobufjs-style namespace JSON.
//!
//! The reflected form of a `FileDescriptorSet` (protobufjs `Root.toJSON()`,
//! with comments kept) is a recursive object where each node may carry:
//!
//! - `nested`:  child nodes, keyed by local (sometimes dotted) name
//! - `fields`:  message fields (`{ type, id, rule?, comment? }`)
//! - `values`:  enum values (`{ NAME: number }`), comments in a sibling
//!   `comments` map
//! - `methods`: service methods (`{ requestType?, responseType?,
//!   requestStream?, responseStream?, comment? }`)
//!
//! Rules applied here:
//!
//! - a node carrying more than one of `fields` / `values` / `methods` is a
//!   fatal [`DescriptorError::AmbiguousNode`];
//! - a node with none of the known payload keys but with unrecognized keys is
//!   skipped (logged at debug level) so descriptor extensions don't break
//!   decoding;
//! - dotted `nested` keys (package names like `a.b.c`) expand into a chain of
//!   namespace nodes, so path lookup is always per-segment;
//! - auxiliary keys (`options`, `oneofs`, `edition`, `syntax`) are ignored.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    DescriptorError, EnumValueDef, FieldDef, MethodDef, NamespaceNode, NamespaceTree, NodeBody,
    Result,
};

/// Decode a namespace tree from JSON text.
pub fn decode_str(text: &str) -> Result<NamespaceTree> {
    let value: Value = serde_json::from_str(text)?;
    decode_value(&value)
}

/// Decode a namespace tree from an already-parsed JSON value.
pub fn decode_value(value: &Value) -> Result<NamespaceTree> {
    let raw: RawNode = RawNode::deserialize(value)?;
    let mut path = Vec::new();
    let root = convert_node("", &raw, &mut path)?
        .unwrap_or_else(|| NamespaceNode::namespace(""));
    Ok(NamespaceTree::new(root))
}

// ============================================================================
// Raw JSON shape
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default)]
    nested: IndexMap<String, RawNode>,
    // Presence of the key decides the node's kind, even when the map is
    // empty: a zero-field message still carries `"fields": {}`.
    fields: Option<IndexMap<String, RawField>>,
    values: Option<IndexMap<String, i64>>,
    /// Enum value comments, keyed by value name.
    #[serde(default)]
    comments: IndexMap<String, Option<String>>,
    methods: Option<IndexMap<String, RawMethod>>,
    comment: Option<String>,

    // Auxiliary keys we recognize but do not model.
    #[allow(dead_code)]
    options: Option<Value>,
    #[allow(dead_code)]
    oneofs: Option<Value>,
    #[allow(dead_code)]
    edition: Option<Value>,
    #[allow(dead_code)]
    syntax: Option<Value>,

    #[serde(flatten)]
    unknown: IndexMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    #[serde(rename = "type")]
    type_ref: String,
    #[allow(dead_code)]
    id: Option<i64>,
    rule: Option<String>,
    comment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMethod {
    #[serde(rename = "requestType")]
    request_type: Option<String>,
    #[serde(rename = "responseType")]
    response_type: Option<String>,
    #[serde(default, rename = "requestStream")]
    request_stream: bool,
    #[serde(default, rename = "responseStream")]
    response_stream: bool,
    comment: Option<String>,
}

// ============================================================================
// Conversion
// ============================================================================

fn convert_node(
    name: &str,
    raw: &RawNode,
    path: &mut Vec<String>,
) -> Result<Option<NamespaceNode>> {
    let claimed = [
        (raw.fields.is_some(), "message"),
        (raw.values.is_some(), "enum"),
        (raw.methods.is_some(), "service"),
    ];
    let claimed_kinds: Vec<&str> = claimed
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, kind)| *kind)
        .collect();
    if claimed_kinds.len() > 1 {
        return Err(DescriptorError::AmbiguousNode {
            path: path.join("."),
            kinds: claimed_kinds.join(" + "),
        });
    }

    let recognizable = !claimed_kinds.is_empty() || !raw.nested.is_empty() || raw.unknown.is_empty();
    if !recognizable {
        tracing::debug!(
            node = path.join("."),
            keys = ?raw.unknown.keys().collect::<Vec<_>>(),
            "skipping descriptor node with unrecognized shape"
        );
        return Ok(None);
    }

    let body = if let Some(fields) = &raw.fields {
        NodeBody::Message {
            fields: fields
                .iter()
                .map(|(field_name, f)| FieldDef {
                    name: field_name.clone(),
                    type_ref: f.type_ref.clone(),
                    repeated: f.rule.as_deref() == Some("repeated"),
                    comment: f.comment.clone(),
                })
                .collect(),
        }
    } else if let Some(values) = &raw.values {
        NodeBody::Enum {
            values: values
                .iter()
                .map(|(value_name, number)| EnumValueDef {
                    name: value_name.clone(),
                    number: *number,
                    comment: raw.comments.get(value_name).cloned().flatten(),
                })
                .collect(),
        }
    } else if let Some(methods) = &raw.methods {
        NodeBody::Service {
            methods: methods
                .iter()
                .map(|(method_name, m)| MethodDef {
                    name: method_name.clone(),
                    request_type: m.request_type.clone(),
                    response_type: m.response_type.clone(),
                    request_streaming: m.request_stream,
                    response_streaming: m.response_stream,
                    comment: m.comment.clone(),
                })
                .collect(),
        }
    } else {
        NodeBody::Namespace
    };

    let mut node = NamespaceNode {
        name: name.to_string(),
        comment: raw.comment.clone(),
        children: Default::default(),
        body,
    };

    for (child_key, child_raw) in &raw.nested {
        path.push(child_key.clone());
        let local_name = child_key.rsplit('.').next().unwrap_or(child_key);
        let converted = convert_node(local_name, child_raw, path)?;
        path.pop();
        if let Some(child) = converted {
            insert_child(&mut node, child_key, child);
        }
    }

    Ok(Some(node))
}

/// Insert `child` under `key`, expanding dotted keys into namespace chains.
fn insert_child(parent: &mut NamespaceNode, key: &str, child: NamespaceNode) {
    let segments: Vec<&str> = key.split('.').filter(|s| !s.is_empty()).collect();
    let mut current = parent;
    for segment in &segments[..segments.len().saturating_sub(1)] {
        current = current
            .children
            .entry((*segment).to_string())
            .or_insert_with(|| NamespaceNode::namespace(*segment));
    }
    let Some(last) = segments.last() else {
        return;
    };
    match current.children.get_mut(*last) {
        // Two dotted keys sharing a prefix both materialize the same
        // namespace node; merge their children instead of replacing.
        Some(existing)
            if existing.body == NodeBody::Namespace && child.body == NodeBody::Namespace =>
        {
            for (name, grandchild) in child.children {
                existing.children.insert(name, grandchild);
            }
        }
        _ => {
            current.children.insert((*last).to_string(), child);
        }
    }
}
