//! Scoped type-reference resolution.
//!
//! Proto references are resolved the way the IDL itself resolves them: an
//! unqualified (or partially qualified) reference first searches the innermost
//! enclosing scope, then each enclosing scope outward, finally the root. The
//! first scope whose prefix + reference exists in the tree wins.
//!
//! The search is a loop over shrinking prefixes of the declaring path; no
//! recursion is needed since namespace depth is bounded by the document's
//! nesting. When every scope is exhausted, a bare primitive name falls back to
//! the scalar table; anything else is a dangling reference and aborts the
//! compilation.

use protoql_descriptor::{Name, NamespaceTree};

use crate::error::{CompileError, Result};
use crate::scalars::ScalarKind;

/// Outcome of resolving a type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Absolute path of a definition in the tree.
    Node(Vec<Name>),
    /// The reference names a proto primitive.
    Scalar(ScalarKind),
}

/// Resolve `type_ref` as seen from the node at `declaring`.
///
/// `declaring` is the full path of the node that *contains* the field or
/// method referencing the type (for a field, its message; for a method, its
/// service).
pub fn resolve_type_ref(
    tree: &NamespaceTree,
    declaring: &[Name],
    type_ref: &str,
) -> Result<Resolution> {
    let segments: Vec<Name> = type_ref
        .split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if !segments.is_empty() {
        let mut scope = declaring.to_vec();
        loop {
            let mut candidate = scope.clone();
            candidate.extend(segments.iter().cloned());
            if tree.contains(&candidate) {
                return Ok(Resolution::Node(candidate));
            }
            if scope.pop().is_none() {
                break;
            }
        }
        if segments.len() == 1 {
            if let Some(kind) = ScalarKind::classify(&segments[0]) {
                return Ok(Resolution::Scalar(kind));
            }
        }
    }

    Err(CompileError::UnresolvedTypeRef {
        type_ref: type_ref.to_string(),
        declaring: declaring.join("."),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use protoql_descriptor::{NamespaceNode, NamespaceTree, NodeBody};

    fn path(segments: &[&str]) -> Vec<Name> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    /// Builds a tree containing empty message nodes at each given path.
    fn tree_with(paths: &[&[&str]]) -> NamespaceTree {
        let mut root = NamespaceNode::namespace("");
        for p in paths {
            let mut current = &mut root;
            for (i, segment) in p.iter().enumerate() {
                current = current
                    .children
                    .entry(segment.to_string())
                    .or_insert_with(|| NamespaceNode::namespace(*segment));
                if i == p.len() - 1 {
                    current.body = NodeBody::Message { fields: Vec::new() };
                }
            }
        }
        NamespaceTree::new(root)
    }

    #[test]
    fn backtracks_through_enclosing_scopes() {
        // T lives at a.b.T; a field inside a.b.c.M references bare `T`.
        let tree = tree_with(&[&["a", "b", "T"], &["a", "b", "c", "M"]]);
        let resolution = resolve_type_ref(&tree, &path(&["a", "b", "c", "M"]), "T").unwrap();
        assert_eq!(resolution, Resolution::Node(path(&["a", "b", "T"])));
    }

    #[test]
    fn innermost_scope_wins_over_outer_shadow() {
        let tree = tree_with(&[&["a", "T"], &["a", "b", "T"], &["a", "b", "M"]]);
        let resolution = resolve_type_ref(&tree, &path(&["a", "b", "M"]), "T").unwrap();
        assert_eq!(resolution, Resolution::Node(path(&["a", "b", "T"])));
    }

    #[test]
    fn qualified_references_resolve_from_any_scope() {
        let tree = tree_with(&[&["other", "Film"], &["a", "M"]]);
        let resolution = resolve_type_ref(&tree, &path(&["a", "M"]), "other.Film").unwrap();
        assert_eq!(resolution, Resolution::Node(path(&["other", "Film"])));
    }

    #[test]
    fn primitives_fall_back_to_the_scalar_table() {
        let tree = tree_with(&[&["a", "M"]]);
        let resolution = resolve_type_ref(&tree, &path(&["a", "M"]), "string").unwrap();
        assert_eq!(resolution, Resolution::Scalar(ScalarKind::String));
    }

    #[test]
    fn a_local_definition_shadows_a_primitive_name() {
        // A message literally named `string` in scope takes precedence.
        let tree = tree_with(&[&["a", "string"], &["a", "M"]]);
        let resolution = resolve_type_ref(&tree, &path(&["a", "M"]), "string").unwrap();
        assert_eq!(resolution, Resolution::Node(path(&["a", "string"])));
    }

    #[test]
    fn dangling_references_are_fatal() {
        let tree = tree_with(&[&["a", "M"]]);
        let err = resolve_type_ref(&tree, &path(&["a", "M"]), "Missing").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Missing"), "got: {message}");
        assert!(message.contains("a.M"), "got: {message}");
    }

    #[test]
    fn empty_references_are_fatal() {
        let tree = tree_with(&[&["a", "M"]]);
        assert!(resolve_type_ref(&tree, &path(&["a", "M"]), "").is_err());
    }
}
