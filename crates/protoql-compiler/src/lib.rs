//! protoql compiler: descriptor tree → (GraphQL schema, routing table).
//!
//! A pure, deterministic compiler pass. The caller supplies one decoded
//! namespace tree per source document plus an opaque remote target; we walk
//! the tree once and hand back:
//!
//! - a [`CompiledSchema`]: object types, input types, enum types, opaque
//!   scalar placeholders, and the Query/Subscription root-field maps;
//! - a [`RoutingTable`]: one descriptor per service method, keyed by the
//!   generated root field name, with the coordinates a gateway dispatcher
//!   needs to invoke the matching remote call.
//!
//! No I/O, no query execution, no network: compilation is CPU-bound tree
//! traversal and map mutation, safe to run from any thread as long as each
//! call owns its composer. Results from several documents are combined with
//! an explicit [`Compilation::merge`] step that fails on name collisions.
//!
//! Fatal conditions (dangling reference, name collision, malformed tree)
//! abort the whole compilation; there are no partial results.

pub mod compose;
pub mod error;
pub mod resolve;
pub mod routing;
pub mod scalars;
pub mod sdl;
mod visit;

pub use compose::{
    type_name, CompiledSchema, Direction, EnumType, EnumValue, FieldUse, InputObjectType,
    ObjectType, OpaqueType, RootArg, RootField, SchemaComposer, TypeUse,
};
pub use error::{CompileError, Result};
pub use resolve::{resolve_type_ref, Resolution};
pub use routing::{
    OperationKind, RouteDescriptor, RoutingTable, DEFAULT_REQUEST_BODY_TEMPLATE,
};
pub use scalars::ScalarKind;
pub use sdl::render_sdl;

use protoql_descriptor::NamespaceTree;
use visit::TreeVisitor;

/// Knobs for one compilation run.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// When false, response-streaming methods are skipped entirely: no root
    /// field, no route.
    pub enable_subscriptions: bool,
    /// Request-body template carried verbatim into every route. The
    /// substitution syntax is the dispatcher's concern.
    pub request_body_template: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            enable_subscriptions: true,
            request_body_template: DEFAULT_REQUEST_BODY_TEMPLATE.to_string(),
        }
    }
}

/// The two outputs of one compilation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compilation {
    pub schema: CompiledSchema,
    pub routes: RoutingTable,
}

impl Compilation {
    /// Merge the results of two independently compiled documents.
    ///
    /// Type registries combine by generated name; a name claimed by two
    /// different source paths is a fatal collision (a name claimed twice by
    /// the *same* path — e.g. a shared well-known type present in both
    /// descriptor sets — deduplicates silently). Root field names must be
    /// unique across documents and across both root types. Routing tables
    /// concatenate in order.
    pub fn merge(mut self, other: Compilation) -> Result<Compilation> {
        for (name, origin) in &other.schema.type_origins {
            if let Some(existing) = self.schema.type_origins.get(name) {
                if existing != origin {
                    return Err(CompileError::NameCollision {
                        name: name.clone(),
                        first: existing.clone(),
                        second: origin.clone(),
                    });
                }
            }
        }
        self.schema
            .type_origins
            .extend(other.schema.type_origins);
        self.schema.object_types.extend(other.schema.object_types);
        self.schema.input_types.extend(other.schema.input_types);
        self.schema.opaque_types.extend(other.schema.opaque_types);
        self.schema.enum_types.extend(other.schema.enum_types);

        // Root field names are unique across *both* root types: the routing
        // table is keyed by field name alone, so a query field in one
        // document and a subscription field of the same name in another
        // would leave one route unreachable.
        for (name, field) in other.schema.query_fields {
            if self.schema.query_fields.contains_key(&name)
                || self.schema.subscription_fields.contains_key(&name)
            {
                return Err(CompileError::RootFieldCollision { field: name });
            }
            self.schema.query_fields.insert(name, field);
        }
        for (name, field) in other.schema.subscription_fields {
            if self.schema.query_fields.contains_key(&name)
                || self.schema.subscription_fields.contains_key(&name)
            {
                return Err(CompileError::RootFieldCollision { field: name });
            }
            self.schema.subscription_fields.insert(name, field);
        }

        self.routes.extend(other.routes);
        Ok(self)
    }
}

/// Compile one decoded descriptor tree.
///
/// `target` is the opaque connection descriptor every emitted route carries;
/// it is never interpreted here.
pub fn compile(
    tree: &NamespaceTree,
    target: &str,
    options: &CompileOptions,
) -> Result<Compilation> {
    let mut composer = SchemaComposer::new(tree);
    let mut routes = Vec::new();
    TreeVisitor {
        composer: &mut composer,
        routes: &mut routes,
        target,
        options,
    }
    .run(tree)?;
    Ok(Compilation {
        schema: composer.finish(),
        routes: RoutingTable::from_routes(routes),
    })
}

/// Decode a protobufjs-style namespace JSON document and compile it.
pub fn compile_json_str(
    text: &str,
    target: &str,
    options: &CompileOptions,
) -> Result<Compilation> {
    let tree = NamespaceTree::from_json_str(text)?;
    compile(&tree, target, options)
}
