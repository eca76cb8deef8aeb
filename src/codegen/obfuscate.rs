//! Compile-time half of the obfuscation scheme; the runtime half
//! (`reveal`) lives in the embedded prelude, see [`crate::runtime`].
//!
//! Grounded character-for-character in `cppgen.cc`'s `obfuscate()`: mask a
//! literal's bytes with `rol_u8(0x93, len % 8)` so the key never appears
//! verbatim in the emitted source.

use proc_macro2::TokenStream;
use quote::quote;

pub fn rol_u8(value: u8, shift: u32) -> u8 {
    value.rotate_left(shift)
}

pub fn obfuscate(s: &str) -> Vec<u8> {
    let mask = rol_u8(0x93, (s.len() % 8) as u32);
    s.bytes().map(|b| b ^ mask).collect()
}

/// Emits an expression yielding the JSON key as an owned `String` at
/// runtime: either the literal verbatim, or a call into `json_rt::reveal`
/// over a masked byte array when obfuscation is requested. Always `String`
/// (not `&str`) so call sites don't need to special-case the two forms.
pub fn emit_key_expr(key: &str, obfuscate_strings: bool) -> TokenStream {
    if !obfuscate_strings {
        return quote! { #key.to_string() };
    }
    let masked = obfuscate(key);
    quote! { crate::json_rt::reveal(&[#(#masked),*]) }
}
