//! Compiler error taxonomy.
//!
//! All of these are fatal: compilation either fully succeeds or fully fails,
//! and no partial schema is ever returned. Unknown descriptor node shapes are
//! the one non-fatal case, and those are skipped during decoding, before the
//! compiler runs.

use protoql_descriptor::DescriptorError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompileError>;

#[derive(Error, Debug)]
pub enum CompileError {
    /// Structural error in the input tree (surfaced from the descriptor layer).
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// A type reference that no enclosing scope (nor the scalar table) can
    /// satisfy. A dangling reference is a descriptor bug, not a per-field
    /// condition.
    #[error("unresolved type reference `{type_ref}` (referenced from `{declaring}`)")]
    UnresolvedTypeRef { type_ref: String, declaring: String },

    /// Two distinct namespace paths produced the same generated type name.
    /// Underscore-joining is not injective for pathologically named inputs,
    /// so this fails fast instead of silently overwriting.
    #[error("type name collision: `{name}` is produced by both `{first}` and `{second}`")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    /// Two service methods generated the same root field name.
    #[error("root field collision: `{field}` is produced by more than one service method")]
    RootFieldCollision { field: String },
}
