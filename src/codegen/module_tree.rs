//! Builds the nested `pub mod` tree for a schema's package paths exactly
//! once, so both the per-message struct and its `impl` block land in the
//! same module declaration. Rust can't reopen a `mod foo { ... }` block
//! the way `cppgen.cc`'s `generateNamespace` reopens `namespace foo { ... }`
//! once per message (see `paths.rs`), so every message under a given
//! package contributes its generated items to one shared node instead of
//! emitting its own `mod` wrapper.

use std::collections::BTreeMap;

use proc_macro2::TokenStream;
use quote::quote;

use crate::ast::Schema;
use crate::codegen::naming::module_ident;
use crate::codegen::paths::package_segments;

#[derive(Default)]
struct Node {
    children: BTreeMap<String, Node>,
    messages: Vec<usize>,
}

impl Node {
    fn insert(&mut self, segments: &[&str], message_index: usize) {
        match segments.split_first() {
            None => self.messages.push(message_index),
            Some((head, rest)) => {
                self.children.entry((*head).to_string()).or_default().insert(rest, message_index)
            }
        }
    }

    fn emit(&self, schema: &Schema, per_message: &dyn Fn(&Schema, usize) -> TokenStream) -> TokenStream {
        let items = self.messages.iter().map(|&i| per_message(schema, i));
        let submodules = self.children.iter().map(|(segment, child)| {
            let ident = module_ident(segment);
            let body = child.emit(schema, per_message);
            quote! {
                pub mod #ident {
                    #body
                }
            }
        });
        quote! {
            #(#items)*
            #(#submodules)*
        }
    }
}

/// Walks every message in declaration-arena order, grouping by package path,
/// and invokes `per_message` once per message to produce the tokens placed
/// inside that message's package module (struct definition, impl block, or
/// both concatenated).
pub fn emit_tree(schema: &Schema, per_message: impl Fn(&Schema, usize) -> TokenStream) -> TokenStream {
    let mut root = Node::default();
    for (i, message) in schema.messages.iter().enumerate() {
        let segments = package_segments(&message.package);
        root.insert(&segments, i);
    }
    root.emit(schema, &per_message)
}
