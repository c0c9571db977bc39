//! Per-method routing metadata for the gateway dispatcher.
//!
//! The compiler does not invoke anything: for every compiled service method it
//! records where the generated root field must be dispatched — the
//! caller-supplied remote target (carried verbatim, never interpreted), the
//! package/service/method coordinates, and the request-body template whose
//! substitution syntax belongs to the dispatcher, not to us.

use serde::{Deserialize, Serialize};

/// Which root type a field was placed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    Query,
    Subscription,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Query => "Query",
            OperationKind::Subscription => "Subscription",
        }
    }
}

/// Default request-body template: the dispatcher substitutes the root field's
/// `input` argument as the request message.
pub const DEFAULT_REQUEST_BODY_TEMPLATE: &str = "{{ .arguments.input }}";

/// Routing metadata for one compiled method, keyed by root field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub field_name: String,
    pub kind: OperationKind,
    /// Opaque connection descriptor supplied by the caller.
    pub target: String,
    /// Dot-joined enclosing namespace of the service (empty for a root-level
    /// service).
    pub package: String,
    pub service: String,
    pub method: String,
    pub request_body_template: String,
}

impl RouteDescriptor {
    /// The `package.Service/Method` form a gRPC dispatcher invokes.
    pub fn full_method_name(&self) -> String {
        if self.package.is_empty() {
            format!("{}/{}", self.service, self.method)
        } else {
            format!("{}.{}/{}", self.package, self.service, self.method)
        }
    }
}

/// All routes of a compilation, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTable {
    routes: Vec<RouteDescriptor>,
}

impl RoutingTable {
    pub fn from_routes(routes: Vec<RouteDescriptor>) -> Self {
        RoutingTable { routes }
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Look up the route behind a root field.
    pub fn get(&self, field_name: &str) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|r| r.field_name == field_name)
    }

    pub(crate) fn extend(&mut self, other: RoutingTable) {
        self.routes.extend(other.routes);
    }
}
