//! Identifier casing, grounded in `prost-build/src/ident.rs`'s
//! `to_snake`/`to_upper_camel` but targeting `heck`'s newer
//! `ToSnakeCase`/`ToUpperCamelCase` traits.

use heck::{ToSnakeCase, ToUpperCamelCase};
use proc_macro2::{Ident, Span};

const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern", "false", "fn",
    "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe",
    "use", "where", "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try",
];

fn escape(ident: String) -> String {
    if KEYWORDS.contains(&ident.as_str()) {
        format!("r#{ident}")
    } else {
        ident
    }
}

/// Converts a schema field name to a `snake_case` Rust field identifier.
pub fn field_ident(name: &str) -> Ident {
    let snake = escape(name.to_snake_case());
    Ident::new_raw_safe(&snake)
}

/// Converts a schema message name to an `UpperCamelCase` Rust type identifier.
pub fn type_ident(name: &str) -> Ident {
    let camel = escape(name.to_upper_camel_case());
    Ident::new_raw_safe(&camel)
}

/// Converts a dotted package path segment to a `snake_case` module identifier.
pub fn module_ident(segment: &str) -> Ident {
    let snake = escape(segment.to_snake_case());
    Ident::new_raw_safe(&snake)
}

trait IdentExt {
    fn new_raw_safe(s: &str) -> Ident;
}

impl IdentExt for Ident {
    fn new_raw_safe(s: &str) -> Ident {
        if let Some(stripped) = s.strip_prefix("r#") {
            Ident::new_raw(stripped, Span::call_site())
        } else {
            Ident::new(s, Span::call_site())
        }
    }
}
