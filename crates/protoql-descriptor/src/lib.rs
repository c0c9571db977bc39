//! Namespace trees decoded from gRPC interface descriptors.
//!
//! A descriptor set (as produced by `protoc` / `buf` and reflected into the
//! protobufjs namespace JSON) is a tree of named nodes: packages, messages,
//! enums, and services. This crate owns that tree as a *typed* model:
//!
//! - node kinds are an explicit sum type ([`NodeBody`]), so downstream passes
//!   dispatch exhaustively instead of probing for `values` / `fields` /
//!   `methods` properties;
//! - message fields and service methods keep their declaration order;
//! - the tree supports the per-segment path lookup that scoped reference
//!   resolution needs.
//!
//! Decoding raw descriptor *bytes* is not this crate's job — callers hand us
//! the already-reflected JSON form (see [`json`]).

pub mod json;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub type Name = String;

/// Result type for descriptor decoding.
pub type Result<T> = std::result::Result<T, DescriptorError>;

/// Structural errors raised while decoding a descriptor tree.
///
/// These are fatal: a malformed tree is a configuration bug upstream, not a
/// per-node condition worth recovering from.
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("malformed descriptor JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("descriptor node `{path}` claims multiple kinds ({kinds})")]
    AmbiguousNode { path: String, kinds: String },
}

// ============================================================================
// Tree model
// ============================================================================

/// One field of a message, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: Name,
    /// Possibly relative dot-separated type reference (`Film`, `other.Film`).
    pub type_ref: String,
    pub repeated: bool,
    pub comment: Option<String>,
}

/// One named value of an enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueDef {
    pub name: Name,
    pub number: i64,
    pub comment: Option<String>,
}

/// One method of a service, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: Name,
    /// Absent for methods that take no request message.
    pub request_type: Option<String>,
    /// Absent for methods that return nothing.
    pub response_type: Option<String>,
    pub request_streaming: bool,
    pub response_streaming: bool,
    pub comment: Option<String>,
}

/// What a node *is*. Exactly one variant per node; a node with children but
/// no payload is a pure namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeBody {
    Namespace,
    Message { fields: Vec<FieldDef> },
    Enum { values: Vec<EnumValueDef> },
    Service { methods: Vec<MethodDef> },
}

/// Discriminant of [`NodeBody`], for logging and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Namespace,
    Message,
    Enum,
    Service,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Namespace => "namespace",
            NodeKind::Message => "message",
            NodeKind::Enum => "enum",
            NodeKind::Service => "service",
        }
    }
}

/// A node in the namespace tree.
///
/// Children can hang off any node, not only pure namespaces: protobuf allows
/// nested messages and enums inside messages, and the tree mirrors that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceNode {
    /// Local identifier; empty only for the tree root.
    pub name: Name,
    pub comment: Option<String>,
    pub children: BTreeMap<Name, NamespaceNode>,
    pub body: NodeBody,
}

impl NamespaceNode {
    pub fn namespace(name: impl Into<Name>) -> Self {
        NamespaceNode {
            name: name.into(),
            comment: None,
            children: BTreeMap::new(),
            body: NodeBody::Namespace,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::Namespace => NodeKind::Namespace,
            NodeBody::Message { .. } => NodeKind::Message,
            NodeBody::Enum { .. } => NodeKind::Enum,
            NodeBody::Service { .. } => NodeKind::Service,
        }
    }
}

/// A whole decoded descriptor document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceTree {
    pub root: NamespaceNode,
}

impl NamespaceTree {
    pub fn new(root: NamespaceNode) -> Self {
        NamespaceTree { root }
    }

    /// An empty tree (no declarations).
    pub fn empty() -> Self {
        NamespaceTree::new(NamespaceNode::namespace(""))
    }

    /// Decode the protobufjs-style namespace JSON (see [`json`]).
    pub fn from_json_str(text: &str) -> Result<Self> {
        json::decode_str(text)
    }

    pub fn from_json_value(value: &serde_json::Value) -> Result<Self> {
        json::decode_value(value)
    }

    /// Walk `path` segment by segment from the root.
    pub fn node_at(&self, path: &[Name]) -> Option<&NamespaceNode> {
        let mut current = &self.root;
        for segment in path {
            current = current.children.get(segment)?;
        }
        Some(current)
    }

    pub fn contains(&self, path: &[Name]) -> bool {
        self.node_at(path).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(name: &str, fields: Vec<FieldDef>) -> NamespaceNode {
        NamespaceNode {
            name: name.to_string(),
            comment: None,
            children: BTreeMap::new(),
            body: NodeBody::Message { fields },
        }
    }

    #[test]
    fn node_at_walks_segments() {
        let mut pkg = NamespaceNode::namespace("pkg");
        pkg.children
            .insert("Person".to_string(), message("Person", Vec::new()));
        let mut root = NamespaceNode::namespace("");
        root.children.insert("pkg".to_string(), pkg);
        let tree = NamespaceTree::new(root);

        assert!(tree.contains(&["pkg".to_string()]));
        assert!(tree.contains(&["pkg".to_string(), "Person".to_string()]));
        assert!(!tree.contains(&["pkg".to_string(), "Film".to_string()]));

        let person = tree
            .node_at(&["pkg".to_string(), "Person".to_string()])
            .unwrap();
        assert_eq!(person.kind(), NodeKind::Message);
    }

    #[test]
    fn empty_tree_has_namespace_root() {
        let tree = NamespaceTree::empty();
        assert_eq!(tree.root.kind(), NodeKind::Namespace);
        assert!(tree.root.children.is_empty());
    }
}
