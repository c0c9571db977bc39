//! Schema composition: name generation plus deduplicated registration.
//!
//! Every message produces either a structured object/input pair (when it has
//! fields) or an opaque JSON-scalar pair (when it has none — a zero-field
//! message carries no statically known shape, so structured modeling would be
//! vacuous). Every enum produces exactly one shared enum type, used by both
//! the input and output directions.
//!
//! Generated names join the absolute namespace path with `_`
//! (`starwars.Person` → `starwars_Person`, input direction appends `_Input`).
//! Joining is not injective for pathologically named inputs, so the composer
//! tracks the origin path of every generated name: re-registering the same
//! path is a no-op, while a second distinct path claiming an existing name
//! fails the compilation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use protoql_descriptor::{EnumValueDef, FieldDef, Name, NamespaceTree, NodeBody};

use crate::error::{CompileError, Result};
use crate::resolve::{resolve_type_ref, Resolution};
use crate::routing::OperationKind;

/// Join non-empty path segments with `_`. Deterministic and total.
pub fn type_name(path: &[Name]) -> String {
    path.iter()
        .filter(|s| !s.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join("_")
}

/// Which side of a field the type is used on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

// ============================================================================
// Compiled schema model
// ============================================================================

/// A reference to a named type, optionally wrapped in a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeUse {
    pub name: String,
    pub list: bool,
}

impl fmt::Display for TypeUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.list {
            write!(f, "[{}]", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldUse {
    pub name: String,
    pub ty: TypeUse,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldUse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldUse>,
}

/// JSON-scalar placeholder registered for a zero-field message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpaqueType {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    pub number: i64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValue>,
}

/// The single argument of a root field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum RootArg {
    /// The method declares no request type.
    None,
    /// Structured `_Input` (or opaque/scalar) argument type name.
    Input { type_name: String },
    /// Client-streaming methods take a single opaque upload argument.
    Upload,
}

/// One entry point of the compiled Query or Subscription type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootField {
    pub arg: RootArg,
    pub returns: String,
    pub description: Option<String>,
}

/// The fully resolved output of one compilation run. Built once, never
/// mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledSchema {
    pub object_types: BTreeMap<String, ObjectType>,
    pub input_types: BTreeMap<String, InputObjectType>,
    pub opaque_types: BTreeMap<String, OpaqueType>,
    pub enum_types: BTreeMap<String, EnumType>,
    pub query_fields: BTreeMap<String, RootField>,
    pub subscription_fields: BTreeMap<String, RootField>,
    /// Dotted absolute source path for every generated type name. Drives
    /// idempotent registration and collision reporting (also across
    /// document merges).
    pub type_origins: BTreeMap<String, String>,
}

// ============================================================================
// Composer
// ============================================================================

/// Accumulates one [`CompiledSchema`] over a single traversal. Not shareable
/// across threads; independent documents get independent composers.
pub struct SchemaComposer<'t> {
    tree: &'t NamespaceTree,
    schema: CompiledSchema,
}

impl<'t> SchemaComposer<'t> {
    pub fn new(tree: &'t NamespaceTree) -> Self {
        SchemaComposer {
            tree,
            schema: CompiledSchema::default(),
        }
    }

    pub fn tree(&self) -> &'t NamespaceTree {
        self.tree
    }

    pub fn finish(self) -> CompiledSchema {
        self.schema
    }

    /// Claim `name` for `path`. Returns `false` when the exact same path
    /// already owns the name (idempotent re-registration).
    fn claim(&mut self, name: &str, path: &[Name]) -> Result<bool> {
        let origin = path.join(".");
        match self.schema.type_origins.get(name) {
            Some(existing) if *existing == origin => Ok(false),
            Some(existing) => Err(CompileError::NameCollision {
                name: name.to_string(),
                first: existing.clone(),
                second: origin,
            }),
            None => {
                self.schema.type_origins.insert(name.to_string(), origin);
                Ok(true)
            }
        }
    }

    pub fn register_enum(
        &mut self,
        path: &[Name],
        description: Option<&str>,
        values: &[EnumValueDef],
    ) -> Result<()> {
        let name = type_name(path);
        if !self.claim(&name, path)? {
            return Ok(());
        }
        self.schema.enum_types.insert(
            name.clone(),
            EnumType {
                name,
                description: description.map(str::to_string),
                values: values
                    .iter()
                    .map(|v| EnumValue {
                        name: v.name.clone(),
                        number: v.number,
                        description: v.comment.clone(),
                    })
                    .collect(),
            },
        );
        Ok(())
    }

    pub fn register_message(
        &mut self,
        path: &[Name],
        description: Option<&str>,
        fields: &[FieldDef],
    ) -> Result<()> {
        let name = type_name(path);
        if !self.claim(&name, path)? {
            return Ok(());
        }
        let input_name = format!("{name}_Input");
        self.claim(&input_name, path)?;

        if fields.is_empty() {
            self.schema.opaque_types.insert(
                name.clone(),
                OpaqueType {
                    name: name.clone(),
                    description: description.map(str::to_string),
                },
            );
            self.schema.opaque_types.insert(
                input_name.clone(),
                OpaqueType {
                    name: input_name,
                    description: description.map(str::to_string),
                },
            );
            return Ok(());
        }

        let mut output_fields = Vec::with_capacity(fields.len());
        let mut input_fields = Vec::with_capacity(fields.len());
        for field in fields {
            let resolution = resolve_type_ref(self.tree, path, &field.type_ref)?;
            let output_ty = self.resolved_name(&resolution, Direction::Output);
            let input_ty = self.resolved_name(&resolution, Direction::Input);
            let (Some(output_ty), Some(input_ty)) = (output_ty, input_ty) else {
                // Resolved to a service or bare namespace: dangling as a type.
                return Err(CompileError::UnresolvedTypeRef {
                    type_ref: field.type_ref.clone(),
                    declaring: path.join("."),
                });
            };
            output_fields.push(FieldUse {
                name: field.name.clone(),
                ty: TypeUse {
                    name: output_ty,
                    list: field.repeated,
                },
                description: field.comment.clone(),
            });
            input_fields.push(FieldUse {
                name: field.name.clone(),
                ty: TypeUse {
                    name: input_ty,
                    list: field.repeated,
                },
                description: field.comment.clone(),
            });
        }

        self.schema.object_types.insert(
            name.clone(),
            ObjectType {
                name: name.clone(),
                description: description.map(str::to_string),
                fields: output_fields,
            },
        );
        self.schema.input_types.insert(
            input_name.clone(),
            InputObjectType {
                name: input_name,
                description: description.map(str::to_string),
                fields: input_fields,
            },
        );
        Ok(())
    }

    /// The GraphQL-facing type name for a resolution, or `None` when the
    /// resolved node is not a type (service, pure namespace).
    pub(crate) fn resolved_name(
        &self,
        resolution: &Resolution,
        direction: Direction,
    ) -> Option<String> {
        match resolution {
            Resolution::Scalar(kind) => Some(kind.graphql_name().to_string()),
            Resolution::Node(path) => {
                let node = self.tree.node_at(path)?;
                match node.body {
                    // Enums are shared between directions.
                    NodeBody::Enum { .. } => Some(type_name(path)),
                    NodeBody::Message { .. } => Some(match direction {
                        Direction::Output => type_name(path),
                        Direction::Input => format!("{}_Input", type_name(path)),
                    }),
                    NodeBody::Namespace | NodeBody::Service { .. } => None,
                }
            }
        }
    }

    pub fn add_root_field(
        &mut self,
        kind: OperationKind,
        name: String,
        field: RootField,
    ) -> Result<()> {
        // Root field names must be unique across Query *and* Subscription:
        // the routing table is keyed by field name alone.
        if self.schema.query_fields.contains_key(&name)
            || self.schema.subscription_fields.contains_key(&name)
        {
            return Err(CompileError::RootFieldCollision { field: name });
        }
        let map = match kind {
            OperationKind::Query => &mut self.schema.query_fields,
            OperationKind::Subscription => &mut self.schema.subscription_fields,
        };
        map.insert(name, field);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protoql_descriptor::{NamespaceNode, NamespaceTree};
    use std::collections::BTreeMap;

    fn path(segments: &[&str]) -> Vec<Name> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    fn field(name: &str, type_ref: &str, repeated: bool) -> FieldDef {
        FieldDef {
            name: name.to_string(),
            type_ref: type_ref.to_string(),
            repeated,
            comment: None,
        }
    }

    fn tree_with_messages(defs: &[(&[&str], Vec<FieldDef>)]) -> NamespaceTree {
        let mut root = NamespaceNode::namespace("");
        for (p, fields) in defs {
            let mut current = &mut root;
            for (i, segment) in p.iter().enumerate() {
                current = current
                    .children
                    .entry(segment.to_string())
                    .or_insert_with(|| NamespaceNode::namespace(*segment));
                if i == p.len() - 1 {
                    current.body = NodeBody::Message {
                        fields: fields.clone(),
                    };
                }
            }
        }
        NamespaceTree::new(root)
    }

    #[test]
    fn messages_with_fields_produce_an_object_and_input_pair() {
        let fields = vec![field("title", "string", false)];
        let tree = tree_with_messages(&[(&["sw", "Film"], fields.clone())]);
        let mut composer = SchemaComposer::new(&tree);
        composer
            .register_message(&path(&["sw", "Film"]), None, &fields)
            .unwrap();
        let schema = composer.finish();
        assert!(schema.object_types.contains_key("sw_Film"));
        assert!(schema.input_types.contains_key("sw_Film_Input"));
        assert!(schema.opaque_types.is_empty());
        assert_eq!(schema.object_types["sw_Film"].fields[0].ty.name, "String");
    }

    #[test]
    fn zero_field_messages_produce_an_opaque_pair() {
        let tree = tree_with_messages(&[(&["sw", "Empty"], Vec::new())]);
        let mut composer = SchemaComposer::new(&tree);
        composer
            .register_message(&path(&["sw", "Empty"]), None, &[])
            .unwrap();
        let schema = composer.finish();
        assert!(schema.opaque_types.contains_key("sw_Empty"));
        assert!(schema.opaque_types.contains_key("sw_Empty_Input"));
        assert!(schema.object_types.is_empty());
        assert!(schema.input_types.is_empty());
    }

    #[test]
    fn repeated_fields_are_wrapped_in_lists() {
        let film_fields = vec![field("title", "string", false)];
        let person_fields = vec![field("films", "Film", true)];
        let tree = tree_with_messages(&[
            (&["sw", "Film"], film_fields),
            (&["sw", "Person"], person_fields.clone()),
        ]);
        let mut composer = SchemaComposer::new(&tree);
        composer
            .register_message(&path(&["sw", "Person"]), None, &person_fields)
            .unwrap();
        let schema = composer.finish();
        let films = &schema.object_types["sw_Person"].fields[0];
        assert_eq!(films.ty.to_string(), "[sw_Film]");
        let films_input = &schema.input_types["sw_Person_Input"].fields[0];
        assert_eq!(films_input.ty.to_string(), "[sw_Film_Input]");
    }

    #[test]
    fn re_registration_of_the_same_path_is_a_no_op() {
        let fields = vec![field("title", "string", false)];
        let tree = tree_with_messages(&[(&["sw", "Film"], fields.clone())]);
        let mut composer = SchemaComposer::new(&tree);
        composer
            .register_message(&path(&["sw", "Film"]), None, &fields)
            .unwrap();
        composer
            .register_message(&path(&["sw", "Film"]), None, &fields)
            .unwrap();
        let schema = composer.finish();
        assert_eq!(schema.object_types.len(), 1);
    }

    #[test]
    fn colliding_generated_names_fail_fast() {
        // `a.b_C` and `a.b.C` both join to `a_b_C`.
        let mut root = NamespaceNode::namespace("");
        let a = root
            .children
            .entry("a".to_string())
            .or_insert_with(|| NamespaceNode::namespace("a"));
        a.children.insert(
            "b_C".to_string(),
            NamespaceNode {
                name: "b_C".to_string(),
                comment: None,
                children: BTreeMap::new(),
                body: NodeBody::Message { fields: Vec::new() },
            },
        );
        let b = a
            .children
            .entry("b".to_string())
            .or_insert_with(|| NamespaceNode::namespace("b"));
        b.children.insert(
            "C".to_string(),
            NamespaceNode {
                name: "C".to_string(),
                comment: None,
                children: BTreeMap::new(),
                body: NodeBody::Message { fields: Vec::new() },
            },
        );
        let tree = NamespaceTree::new(root);

        let mut composer = SchemaComposer::new(&tree);
        composer
            .register_message(&path(&["a", "b_C"]), None, &[])
            .unwrap();
        let err = composer
            .register_message(&path(&["a", "b", "C"]), None, &[])
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("a_b_C"), "got: {message}");
        assert!(message.contains("a.b_C"), "got: {message}");
        assert!(message.contains("a.b.C"), "got: {message}");
    }

    #[test]
    fn root_field_names_are_unique_across_query_and_subscription() {
        let tree = tree_with_messages(&[]);
        let mut composer = SchemaComposer::new(&tree);
        composer
            .add_root_field(
                OperationKind::Query,
                "pkg_Svc_Get".to_string(),
                RootField {
                    arg: RootArg::None,
                    returns: "Void".to_string(),
                    description: None,
                },
            )
            .unwrap();
        let err = composer
            .add_root_field(
                OperationKind::Subscription,
                "pkg_Svc_Get".to_string(),
                RootField {
                    arg: RootArg::None,
                    returns: "Void".to_string(),
                    description: None,
                },
            )
            .unwrap_err();
        assert!(err.to_string().contains("pkg_Svc_Get"), "got: {err}");
    }

    #[test]
    fn type_name_skips_empty_segments() {
        assert_eq!(
            type_name(&path(&["", "sw", "Person"])),
            "sw_Person".to_string()
        );
        assert_eq!(type_name(&[]), "");
    }
}
