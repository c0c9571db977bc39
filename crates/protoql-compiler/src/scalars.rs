//! Mapping from proto primitive type names to GraphQL scalars.
//!
//! The emitted schema uses the four GraphQL built-ins plus a small set of
//! extra scalars: `UnsignedInt` and `BigInt` for the wide integer widths,
//! `Byte` for `bytes`, `JSON` as the opaque placeholder for zero-field
//! messages, `Void` for methods without a response type, and `Upload` as the
//! argument marker for client-streaming methods.

/// A built-in output scalar of the compiled schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScalarKind {
    Int,
    UnsignedInt,
    BigInt,
    Float,
    String,
    Boolean,
    Byte,
    /// Raw-JSON escape hatch; also the placeholder type for messages with no
    /// statically known fields.
    Json,
    /// Marks the response of a method that declares no response type.
    Void,
    /// Marks the single argument of a client-streaming method: a stream of
    /// bytes cannot be expressed as one structured input value.
    Upload,
}

impl ScalarKind {
    /// Classify a proto primitive type name. Pure lookup, no failure mode
    /// beyond "not a scalar".
    pub fn classify(name: &str) -> Option<ScalarKind> {
        let kind = match name {
            "int32" | "sint32" | "sfixed32" => ScalarKind::Int,
            "uint32" | "fixed32" => ScalarKind::UnsignedInt,
            "int64" | "sint64" | "sfixed64" | "uint64" | "fixed64" => ScalarKind::BigInt,
            "double" | "float" => ScalarKind::Float,
            "string" => ScalarKind::String,
            "bool" => ScalarKind::Boolean,
            "bytes" => ScalarKind::Byte,
            _ => return None,
        };
        Some(kind)
    }

    /// The scalar's name in the emitted schema.
    pub fn graphql_name(self) -> &'static str {
        match self {
            ScalarKind::Int => "Int",
            ScalarKind::UnsignedInt => "UnsignedInt",
            ScalarKind::BigInt => "BigInt",
            ScalarKind::Float => "Float",
            ScalarKind::String => "String",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::Byte => "Byte",
            ScalarKind::Json => "JSON",
            ScalarKind::Void => "Void",
            ScalarKind::Upload => "Upload",
        }
    }

    /// Whether the scalar is one of GraphQL's own built-ins (which need no
    /// `scalar` declaration in rendered SDL).
    pub fn is_graphql_builtin(self) -> bool {
        matches!(
            self,
            ScalarKind::Int | ScalarKind::Float | ScalarKind::String | ScalarKind::Boolean
        )
    }

    /// The extra scalars every compiled schema declares, in declaration order.
    pub fn extras() -> [ScalarKind; 6] {
        [
            ScalarKind::UnsignedInt,
            ScalarKind::BigInt,
            ScalarKind::Byte,
            ScalarKind::Json,
            ScalarKind::Void,
            ScalarKind::Upload,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_every_proto_primitive() {
        for name in [
            "double", "float", "int32", "int64", "uint32", "uint64", "sint32", "sint64",
            "fixed32", "fixed64", "sfixed32", "sfixed64", "bool", "string", "bytes",
        ] {
            assert!(ScalarKind::classify(name).is_some(), "missing: {name}");
        }
    }

    #[test]
    fn message_names_are_not_scalars() {
        assert_eq!(ScalarKind::classify("Person"), None);
        assert_eq!(ScalarKind::classify("starwars_Person"), None);
        assert_eq!(ScalarKind::classify(""), None);
    }

    #[test]
    fn wide_integers_map_to_extended_scalars() {
        assert_eq!(ScalarKind::classify("uint32"), Some(ScalarKind::UnsignedInt));
        assert_eq!(ScalarKind::classify("int64"), Some(ScalarKind::BigInt));
        assert_eq!(ScalarKind::classify("fixed64"), Some(ScalarKind::BigInt));
        assert_eq!(ScalarKind::classify("int32"), Some(ScalarKind::Int));
    }
}
