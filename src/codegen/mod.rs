//! The emitter: walks the resolved, dependency-ordered [`crate::ast::Schema`]
//! and produces the output artifact's source text.
//!
//! Split the way `prost-build/src/code_generator.rs` is split from
//! `prost-build/src/lib.rs`: one module per concern (naming, types, struct
//! layout, per-message `impl` bodies, obfuscation, option validation, module
//! tree placement) rather than one monolithic generator function.

mod emitter;
mod module_tree;
mod naming;
mod obfuscate;
pub mod options;
mod paths;
mod struct_gen;
mod types;

use quote::quote;

use crate::ast::Schema;
use crate::error::CompileResult;
use crate::runtime::RUNTIME_SRC;

/// Generates the complete output artifact: the embedded JSON runtime
/// prelude followed by one data struct and `impl` block per message,
/// nested in package modules, formatted with `prettyplease` the way
/// `prost-build`'s `fmt::Formatter` pretty-prints its own generated code.
pub fn generate(schema: &Schema) -> CompileResult<String> {
    options::validate(schema)?;

    let body = module_tree::emit_tree(schema, |schema, index| {
        let message = &schema.messages[index];
        let struct_def = struct_gen::message_struct(message, schema);
        let impl_block = emitter::message_impl(message, schema);
        quote! {
            #struct_def
            #impl_block
        }
    });

    let file: syn::File = syn::parse2(body).expect("generated code must parse as a syn::File");
    let pretty = prettyplease::unparse(&file);

    let mut out = String::new();
    out.push_str("// @generated by the proto3-subset-to-JSON compiler. Do not edit by hand.\n\n");
    out.push_str(RUNTIME_SRC.trim());
    out.push_str("\n\n");
    out.push_str(&pretty);
    Ok(out)
}
