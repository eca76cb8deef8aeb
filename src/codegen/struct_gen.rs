//! Emits the one data struct per message. Placement into the package's
//! module tree is handled by [`crate::codegen::module_tree`], which also
//! carries the message's `impl` block into the same `mod` block (unlike
//! the C++ original's `namespace foo { ... }` blocks, which `cppgen.cc`
//! reopens once per message, Rust disallows declaring the same `mod`
//! twice).

use proc_macro2::TokenStream;
use quote::quote;

use crate::ast::{Field, Message, Schema};
use crate::codegen::naming::{field_ident, type_ident};
use crate::codegen::types::storage_rust_type;

fn field_decl(field: &Field, messages: &[Message]) -> TokenStream {
    let ident = field_ident(&field.name);
    let ty = storage_rust_type(field, messages);
    quote! { pub #ident: #ty }
}

pub fn message_struct(message: &Message, schema: &Schema) -> TokenStream {
    let name = type_ident(&message.name);
    let fields = message.fields.iter().map(|f| field_decl(f, &schema.messages));
    quote! {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct #name {
            #(#fields,)*
        }
    }
}
