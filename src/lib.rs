//! Compiles a restricted proto3 dialect into a self-contained JSON
//! serialization module for Rust.
//!
//! The pipeline is linear and single-threaded, the way `prost-build`'s
//! `Config::compile_protos` drives its own pipeline end to end: a schema
//! file's source text goes in, and either a formatted Rust source string
//! comes out or compilation aborts on the first position-tagged error.
//!
//! ```
//! let schema = r#"
//!     syntax = "proto3";
//!     message Person {
//!         string name = 1;
//!         int32 age = 2;
//!     }
//! "#;
//! let generated = protojson::compile_str(schema, "person.proto").unwrap();
//! assert!(generated.contains("pub struct Person"));
//! ```

pub mod ast;
mod codegen;
pub mod error;
mod lexer;
mod parser;
mod resolver;
pub mod runtime;
mod token;

pub use ast::Schema;
pub use codegen::options::validate as validate_options;
pub use error::{CompileError, CompileResult};

/// Runs the full pipeline — lex, parse, resolve, emit — over a schema's
/// source text and returns the generated artifact as formatted Rust source.
///
/// `file_name` is used only for diagnostics; it never influences the output.
pub fn compile_str(source: &str, file_name: &str) -> CompileResult<String> {
    let mut schema = parser::Parser::new(source, file_name).parse()?;
    log::debug!("parsed '{file_name}': {} message(s)", schema.messages.len());
    resolver::resolve(&mut schema)?;
    log::debug!("resolved '{file_name}', emission order established");
    codegen::generate(&schema)
}

/// Runs the pipeline through resolution only, returning the ordered,
/// fully-bound [`Schema`] without emitting output. Exposed for callers
/// (and tests) that want to inspect the AST the emitter would consume.
pub fn parse_and_resolve(source: &str, file_name: &str) -> CompileResult<Schema> {
    let mut schema = parser::Parser::new(source, file_name).parse()?;
    resolver::resolve(&mut schema)?;
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_str_roundtrips_minimal_schema() {
        let out = compile_str(
            r#"syntax = "proto3"; message P { string name = 1; int32 age = 2; }"#,
            "p.proto",
        )
        .unwrap();
        assert!(out.contains("pub struct P"));
        assert!(out.contains("pub fn serialize"));
        assert!(out.contains("pub fn deserialize"));
    }

    #[test]
    fn compile_str_surfaces_position_tagged_errors() {
        let err = compile_str("message A { B b = 1; }", "a.proto").unwrap_err();
        let diag = err.diagnostic("a.proto");
        assert!(diag.starts_with("a.proto:"));
        assert!(diag.contains("error:"));
    }

    #[test]
    fn cyclic_schema_is_rejected() {
        let err =
            compile_str("message A { B b = 1; } message B { A a = 1; }", "cycle.proto")
                .unwrap_err();
        assert!(matches!(err, CompileError::CircularReference { .. }));
    }
}
