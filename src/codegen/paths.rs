//! Package-to-module-path helpers.
//!
//! Rust can't reopen a namespace the way the C++ original's `cppgen.cc`
//! writes `namespace foo { namespace bar { ... } }` once per message; a
//! `mod` block would collide if declared twice. Instead each distinct
//! package is emitted exactly once as a nested `pub mod` tree holding every
//! message's struct, and every cross-reference elsewhere in the file
//! addresses it by a fully qualified `crate::...` path.

use proc_macro2::TokenStream;
use quote::quote;
use syn::Path;

use crate::ast::Message;
use crate::codegen::naming::{module_ident, type_ident};

pub fn package_segments(package: &str) -> Vec<&str> {
    if package.is_empty() {
        Vec::new()
    } else {
        package.split('.').collect()
    }
}

/// The fully qualified path to a message's generated struct, e.g.
/// `crate::foo::bar::Baz`.
pub fn message_path(message: &Message) -> Path {
    let segments = package_segments(&message.package);
    let mods = segments.iter().map(|s| module_ident(s));
    let name = type_ident(&message.name);
    let tokens: TokenStream = quote! { crate::#(#mods::)*#name };
    syn::parse2(tokens).expect("message path must parse as a syn::Path")
}
