//! Deterministic SDL rendering of a compiled schema.
//!
//! The compiler's output is an in-memory value; callers that want to print or
//! persist the schema textually (and our own snapshot tests) render it here.
//! Iteration is over sorted maps throughout, so the same schema always renders
//! to the same text.

use std::fmt::Write;

use crate::compose::{CompiledSchema, FieldUse, RootArg, RootField};
use crate::scalars::ScalarKind;

/// Render the schema as SDL text.
pub fn render_sdl(schema: &CompiledSchema) -> String {
    let mut out = String::new();

    // Extra scalars are always declared, mirroring the fixed set the schema
    // builds on. GraphQL's own built-ins need no declaration.
    for scalar in ScalarKind::extras() {
        debug_assert!(!scalar.is_graphql_builtin());
        let _ = writeln!(out, "scalar {}", scalar.graphql_name());
    }

    for opaque in schema.opaque_types.values() {
        write_description(&mut out, opaque.description.as_deref(), "");
        let _ = writeln!(out, "scalar {}", opaque.name);
    }

    for enum_type in schema.enum_types.values() {
        let _ = writeln!(out);
        write_description(&mut out, enum_type.description.as_deref(), "");
        let _ = writeln!(out, "enum {} {{", enum_type.name);
        for value in &enum_type.values {
            write_description(&mut out, value.description.as_deref(), "  ");
            let _ = writeln!(out, "  {}", value.name);
        }
        let _ = writeln!(out, "}}");
    }

    for input_type in schema.input_types.values() {
        let _ = writeln!(out);
        write_description(&mut out, input_type.description.as_deref(), "");
        let _ = writeln!(out, "input {} {{", input_type.name);
        write_fields(&mut out, &input_type.fields);
        let _ = writeln!(out, "}}");
    }

    for object_type in schema.object_types.values() {
        let _ = writeln!(out);
        write_description(&mut out, object_type.description.as_deref(), "");
        let _ = writeln!(out, "type {} {{", object_type.name);
        write_fields(&mut out, &object_type.fields);
        let _ = writeln!(out, "}}");
    }

    if !schema.query_fields.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "type Query {{");
        for (name, field) in &schema.query_fields {
            write_root_field(&mut out, name, field);
        }
        let _ = writeln!(out, "}}");
    }

    if !schema.subscription_fields.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "type Subscription {{");
        for (name, field) in &schema.subscription_fields {
            write_root_field(&mut out, name, field);
        }
        let _ = writeln!(out, "}}");
    }

    out
}

fn write_fields(out: &mut String, fields: &[FieldUse]) {
    for field in fields {
        write_description(out, field.description.as_deref(), "  ");
        let _ = writeln!(out, "  {}: {}", field.name, field.ty);
    }
}

fn write_root_field(out: &mut String, name: &str, field: &RootField) {
    write_description(out, field.description.as_deref(), "  ");
    match &field.arg {
        RootArg::None => {
            let _ = writeln!(out, "  {}: {}", name, field.returns);
        }
        RootArg::Input { type_name } => {
            let _ = writeln!(out, "  {}(input: {}): {}", name, type_name, field.returns);
        }
        RootArg::Upload => {
            let _ = writeln!(
                out,
                "  {}(input: {}): {}",
                name,
                ScalarKind::Upload.graphql_name(),
                field.returns
            );
        }
    }
}

fn write_description(out: &mut String, description: Option<&str>, indent: &str) {
    let Some(text) = description else {
        return;
    };
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    let _ = writeln!(out, "{indent}\"\"\"");
    for line in text.lines() {
        let _ = writeln!(out, "{indent}{}", line.trim_end());
    }
    let _ = writeln!(out, "{indent}\"\"\"");
}
