//! Maps schema `ScalarType` to the Rust type used for field storage.
//!
//! JSON has one number type; there is no wire format here, so `sint32`,
//! `fixed32`, `sfixed32` etc. only need to pick a Rust integer type wide and
//! signed enough to hold the range the name implies — there's no zigzag or
//! fixed-width wire encoding to preserve.

use proc_macro2::TokenStream;
use quote::quote;

use crate::ast::{Field, FieldKind, Message, ScalarType};
use crate::codegen::paths::message_path;

pub fn scalar_rust_type(scalar: ScalarType) -> TokenStream {
    match scalar {
        ScalarType::Double => quote! { f64 },
        ScalarType::Float => quote! { f32 },
        ScalarType::Int32 | ScalarType::Sint32 | ScalarType::Sfixed32 => quote! { i32 },
        ScalarType::Int64 | ScalarType::Sint64 | ScalarType::Sfixed64 => quote! { i64 },
        ScalarType::Uint32 | ScalarType::Fixed32 => quote! { u32 },
        ScalarType::Uint64 | ScalarType::Fixed64 => quote! { u64 },
        ScalarType::Bool => quote! { bool },
        ScalarType::String => quote! { String },
        ScalarType::Bytes => quote! { Vec<u8> },
    }
}

/// The bare value type carried by one instance of the field (element type
/// for `repeated` fields), resolving a `MessageRef` through the schema's
/// message arena.
pub fn element_rust_type(field: &Field, messages: &[Message]) -> TokenStream {
    match &field.kind {
        FieldKind::Scalar(scalar) => scalar_rust_type(*scalar),
        FieldKind::Message(reference) => {
            let idx = reference.resolved.expect("field must be resolved before codegen");
            let path = message_path(&messages[idx]);
            quote! { #path }
        }
    }
}

/// The full storage type for the field, including the presence/sequence
/// wrapper: `Option<T>` for presence-tracked scalars, `Vec<T>` for repeated
/// fields. `bytes` is always a single byte sequence regardless of
/// `repeated` — checked before the `repeated` branch so a `repeated bytes`
/// field doesn't turn into `Vec<Vec<u8>>`.
pub fn storage_rust_type(field: &Field, messages: &[Message]) -> TokenStream {
    if matches!(field.kind, FieldKind::Scalar(ScalarType::Bytes)) {
        return quote! { Vec<u8> };
    }
    let element = element_rust_type(field, messages);
    if field.repeated {
        quote! { Vec<#element> }
    } else {
        quote! { Option<#element> }
    }
}
