//! Recursive descriptor-tree traversal.
//!
//! A single synchronous pass: children first (so nested namespaces are fully
//! processed before the node itself — registration is idempotent, so the
//! overall result does not depend on traversal order), then dispatch on the
//! node's kind. Services additionally emit one routing descriptor per method.

use protoql_descriptor::{MethodDef, Name, NamespaceNode, NamespaceTree, NodeBody};

use crate::compose::{type_name, Direction, RootArg, RootField, SchemaComposer};
use crate::error::{CompileError, Result};
use crate::resolve::resolve_type_ref;
use crate::routing::{OperationKind, RouteDescriptor};
use crate::scalars::ScalarKind;
use crate::CompileOptions;

pub(crate) struct TreeVisitor<'a, 't> {
    pub composer: &'a mut SchemaComposer<'t>,
    pub routes: &'a mut Vec<RouteDescriptor>,
    pub target: &'a str,
    pub options: &'a CompileOptions,
}

impl<'a, 't> TreeVisitor<'a, 't> {
    pub fn run(&mut self, tree: &'t NamespaceTree) -> Result<()> {
        let mut path = Vec::new();
        self.visit(&tree.root, &mut path)
    }

    fn visit(&mut self, node: &NamespaceNode, path: &mut Vec<Name>) -> Result<()> {
        for (child_name, child) in &node.children {
            path.push(child_name.clone());
            self.visit(child, path)?;
            path.pop();
        }

        tracing::debug!(node = path.join("."), kind = node.kind().as_str(), "visiting");
        match &node.body {
            NodeBody::Namespace => Ok(()),
            NodeBody::Enum { values } => {
                self.composer
                    .register_enum(path, node.comment.as_deref(), values)
            }
            NodeBody::Message { fields } => {
                self.composer
                    .register_message(path, node.comment.as_deref(), fields)
            }
            NodeBody::Service { methods } => self.visit_service(methods, path),
        }
    }

    fn visit_service(&mut self, methods: &[MethodDef], path: &[Name]) -> Result<()> {
        let tree = self.composer.tree();
        for method in methods {
            let kind = if method.response_streaming {
                OperationKind::Subscription
            } else {
                OperationKind::Query
            };
            if kind == OperationKind::Subscription && !self.options.enable_subscriptions {
                tracing::debug!(
                    service = path.join("."),
                    method = method.name,
                    "subscriptions disabled, skipping response-streaming method"
                );
                continue;
            }

            let mut field_path = path.to_vec();
            field_path.push(method.name.clone());
            let field_name = type_name(&field_path);

            let returns = match &method.response_type {
                Some(response_ref) => {
                    let resolution = resolve_type_ref(tree, path, response_ref)?;
                    self.composer
                        .resolved_name(&resolution, Direction::Output)
                        .ok_or_else(|| CompileError::UnresolvedTypeRef {
                            type_ref: response_ref.clone(),
                            declaring: path.join("."),
                        })?
                }
                None => ScalarKind::Void.graphql_name().to_string(),
            };

            let arg = if method.request_streaming {
                RootArg::Upload
            } else {
                match &method.request_type {
                    Some(request_ref) => {
                        let resolution = resolve_type_ref(tree, path, request_ref)?;
                        let input = self
                            .composer
                            .resolved_name(&resolution, Direction::Input)
                            .ok_or_else(|| CompileError::UnresolvedTypeRef {
                                type_ref: request_ref.clone(),
                                declaring: path.join("."),
                            })?;
                        RootArg::Input { type_name: input }
                    }
                    None => RootArg::None,
                }
            };

            self.composer.add_root_field(
                kind,
                field_name.clone(),
                RootField {
                    arg,
                    returns,
                    description: method.comment.clone(),
                },
            )?;

            let (package, service) = match path.split_last() {
                Some((service, enclosing)) => (enclosing.join("."), service.clone()),
                None => (String::new(), String::new()),
            };
            self.routes.push(RouteDescriptor {
                field_name,
                kind,
                target: self.target.to_string(),
                package,
                service,
                method: method.name.clone(),
                request_body_template: self.options.request_body_template.clone(),
            });
        }
        Ok(())
    }
}
