//! Per-message `impl` block: `serialize`, `deserialize`, `clear`,
//! `is_empty`, `equal`, `swap`. Grounded in `cppgen.cc`'s
//! `generateModelWrapper` (and its `generate_function__*` family), which
//! drives the same seven operations per message from per-field templates;
//! here every field variant's code is produced by a plain Rust match in the
//! emitter itself rather than a textual template substitution (see
//! DESIGN.md).

use itertools::Itertools;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::ast::{Field, FieldKind, Message, ScalarType, Schema};
use crate::codegen::naming::{field_ident, type_ident};
use crate::codegen::obfuscate::emit_key_expr;
use crate::codegen::paths::message_path;

/// The runtime scalar read/write function family a given `ScalarType`
/// drives, as bare identifiers suffixed onto `json_rt::read_`/`write_`.
fn scalar_fn_suffix(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::Double => "f64",
        ScalarType::Float => "f32",
        ScalarType::Int32 | ScalarType::Sint32 | ScalarType::Sfixed32 => "i32",
        ScalarType::Int64 | ScalarType::Sint64 | ScalarType::Sfixed64 => "i64",
        ScalarType::Uint32 | ScalarType::Fixed32 => "u32",
        ScalarType::Uint64 | ScalarType::Fixed64 => "u64",
        ScalarType::Bool => "bool",
        ScalarType::String => "string",
        ScalarType::Bytes => "bytes",
    }
}

fn is_float(scalar: ScalarType) -> bool {
    matches!(scalar, ScalarType::Double | ScalarType::Float)
}

fn equal_float_fn(scalar: ScalarType) -> TokenStream {
    match scalar {
        ScalarType::Double => quote! { crate::json_rt::equal_f64 },
        ScalarType::Float => quote! { crate::json_rt::equal_f32 },
        _ => unreachable!("equal_float_fn called on a non-float scalar"),
    }
}

/// Builds `message.#ident.serialize(params)` for a nested message, or the
/// right `json_rt::write_*` call for a scalar, writing into `__chunk`.
fn write_scalar_value(scalar: ScalarType, value_expr: TokenStream) -> TokenStream {
    match scalar {
        ScalarType::String => quote! {
            crate::json_rt::write_string(&mut __chunk, #value_expr, params.ensure_ascii);
        },
        ScalarType::Bytes => quote! {
            crate::json_rt::write_bytes(&mut __chunk, #value_expr);
        },
        ScalarType::Bool => quote! {
            crate::json_rt::write_bool(&mut __chunk, #value_expr);
        },
        _ => quote! {
            crate::json_rt::write_number(&mut __chunk, #value_expr);
        },
    }
}

fn key_prefix_stmts(field: &Field, obfuscate_strings: bool, number_names: bool) -> TokenStream {
    let label = field.json_name(number_names);
    let key_expr = emit_key_expr(&label, obfuscate_strings);
    quote! {
        let __key: String = #key_expr;
        let mut __chunk = String::new();
        __chunk.push('"');
        __chunk.push_str(&__key);
        __chunk.push_str("\":");
    }
}

fn field_write_stmt(field: &Field, obfuscate_strings: bool, number_names: bool) -> TokenStream {
    if field.is_transient() {
        return quote! {};
    }
    let ident = field_ident(&field.name);
    let prefix = key_prefix_stmts(field, obfuscate_strings, number_names);
    let null_chunk_expr = {
        let label = field.json_name(number_names);
        let key_expr = emit_key_expr(&label, obfuscate_strings);
        quote! {
            {
                let __key: String = #key_expr;
                format!("\"{}\":null", __key)
            }
        }
    };

    let body = if matches!(field.kind, FieldKind::Scalar(ScalarType::Bytes)) {
        quote! {
            if !self.#ident.is_empty() {
                #prefix
                crate::json_rt::write_bytes(&mut __chunk, &self.#ident);
                parts.push(__chunk);
            } else if params.serialize_null {
                parts.push(#null_chunk_expr);
            }
        }
    } else if field.repeated {
        let element_write = match &field.kind {
            FieldKind::Scalar(ScalarType::String) => write_scalar_value(ScalarType::String, quote! { item }),
            FieldKind::Scalar(scalar) => write_scalar_value(*scalar, quote! { *item }),
            FieldKind::Message(_) => quote! {
                __chunk.push_str(&item.serialize(params));
            },
        };
        quote! {
            if !self.#ident.is_empty() {
                #prefix
                __chunk.push('[');
                for (__i, item) in self.#ident.iter().enumerate() {
                    if __i > 0 {
                        __chunk.push(',');
                    }
                    #element_write
                }
                __chunk.push(']');
                parts.push(__chunk);
            } else if params.serialize_null {
                parts.push(#null_chunk_expr);
            }
        }
    } else {
        match &field.kind {
            FieldKind::Scalar(scalar) => {
                let value_expr = if matches!(scalar, ScalarType::String) {
                    quote! { value }
                } else {
                    quote! { *value }
                };
                let write = write_scalar_value(*scalar, value_expr);
                quote! {
                    if let Some(value) = &self.#ident {
                        #prefix
                        #write
                        parts.push(__chunk);
                    } else if params.serialize_null {
                        parts.push(#null_chunk_expr);
                    }
                }
            }
            FieldKind::Message(_) => quote! {
                if let Some(value) = &self.#ident {
                    #prefix
                    __chunk.push_str(&value.serialize(params));
                    parts.push(__chunk);
                } else if params.serialize_null {
                    parts.push(#null_chunk_expr);
                }
            },
        }
    };

    quote! {
        {
            #body
        }
    }
}

fn field_read_stmt(field: &Field, bit: u32, messages: &[Message]) -> TokenStream {
    let ident = field_ident(&field.name);
    let bitmask: u32 = 1 << bit;

    match (&field.kind, field.repeated) {
        (FieldKind::Scalar(ScalarType::Bytes), _) => quote! {
            result.#ident = crate::json_rt::read_bytes(t)?.unwrap_or_default();
            if !result.#ident.is_empty() {
                __present |= #bitmask;
            }
        },
        (FieldKind::Scalar(scalar), false) => {
            let read_fn = format_ident!("read_{}", scalar_fn_suffix(*scalar));
            quote! {
                let __value = crate::json_rt::#read_fn(t)?;
                if __value.is_some() {
                    __present |= #bitmask;
                }
                result.#ident = __value;
            }
        }
        (FieldKind::Scalar(scalar), true) => {
            let read_fn = format_ident!("read_{}", scalar_fn_suffix(*scalar));
            quote! {
                if *t.peek()? == crate::json_rt::Tok::Null {
                    t.next()?;
                    result.#ident = Vec::new();
                } else {
                    t.expect(&crate::json_rt::Tok::LBracket)?;
                    let mut __items = Vec::new();
                    if *t.peek()? == crate::json_rt::Tok::RBracket {
                        t.next()?;
                    } else {
                        loop {
                            let __elem = crate::json_rt::#read_fn(t)?.ok_or_else(|| {
                                t.error_at("null_element", "null is not allowed as a repeated field element")
                            })?;
                            __items.push(__elem);
                            match t.next()? {
                                crate::json_rt::Tok::Comma => continue,
                                crate::json_rt::Tok::RBracket => break,
                                other => {
                                    return Err(t.error_at(
                                        "unexpected_token",
                                        format!("expected ',' or ']', found {other}"),
                                    ))
                                }
                            }
                        }
                    }
                    result.#ident = __items;
                }
                if !result.#ident.is_empty() {
                    __present |= #bitmask;
                }
            }
        }
        (FieldKind::Message(reference), false) => {
            let idx = reference.resolved.expect("field must be resolved before codegen");
            let target = message_path(&messages[idx]);
            quote! {
                if *t.peek()? == crate::json_rt::Tok::Null {
                    t.next()?;
                    result.#ident = None;
                } else {
                    result.#ident = Some(#target::read_value(t, params)?);
                    __present |= #bitmask;
                }
            }
        }
        (FieldKind::Message(reference), true) => {
            let idx = reference.resolved.expect("field must be resolved before codegen");
            let target = message_path(&messages[idx]);
            quote! {
                if *t.peek()? == crate::json_rt::Tok::Null {
                    t.next()?;
                    result.#ident = Vec::new();
                } else {
                    t.expect(&crate::json_rt::Tok::LBracket)?;
                    let mut __items = Vec::new();
                    if *t.peek()? == crate::json_rt::Tok::RBracket {
                        t.next()?;
                    } else {
                        loop {
                            __items.push(#target::read_value(t, params)?);
                            match t.next()? {
                                crate::json_rt::Tok::Comma => continue,
                                crate::json_rt::Tok::RBracket => break,
                                other => {
                                    return Err(t.error_at(
                                        "unexpected_token",
                                        format!("expected ',' or ']', found {other}"),
                                    ))
                                }
                            }
                        }
                    }
                    result.#ident = __items;
                }
                if !result.#ident.is_empty() {
                    __present |= #bitmask;
                }
            }
        }
    }
}

fn field_empty_check(field: &Field) -> TokenStream {
    let ident = field_ident(&field.name);
    if field.repeated || matches!(field.kind, FieldKind::Scalar(ScalarType::Bytes)) {
        quote! { self.#ident.is_empty() }
    } else {
        quote! { self.#ident.is_none() }
    }
}

fn field_equal_expr(field: &Field) -> TokenStream {
    let ident = field_ident(&field.name);
    match (&field.kind, field.repeated) {
        (FieldKind::Scalar(scalar), false) if is_float(*scalar) => {
            let eq = equal_float_fn(*scalar);
            quote! {
                match (&self.#ident, &other.#ident) {
                    (Some(a), Some(b)) => #eq(*a, *b),
                    (None, None) => true,
                    _ => false,
                }
            }
        }
        (FieldKind::Scalar(scalar), true) if is_float(*scalar) => {
            let eq = equal_float_fn(*scalar);
            quote! {
                self.#ident.len() == other.#ident.len()
                    && self.#ident.iter().zip(other.#ident.iter()).all(|(a, b)| #eq(*a, *b))
            }
        }
        (FieldKind::Message(_), false) => quote! {
            match (&self.#ident, &other.#ident) {
                (Some(a), Some(b)) => a.equal(b),
                (None, None) => true,
                _ => false,
            }
        },
        (FieldKind::Message(_), true) => quote! {
            self.#ident.len() == other.#ident.len()
                && self.#ident.iter().zip(other.#ident.iter()).all(|(a, b)| a.equal(b))
        },
        _ => quote! { self.#ident == other.#ident },
    }
}

fn required_check_stmt(field: &Field, bit: u32) -> TokenStream {
    if field.is_transient() {
        return quote! {};
    }
    let name = &field.name;
    let bitmask: u32 = 1 << bit;
    quote! {
        if __present & #bitmask == 0 {
            return Err(t.error_at("missing_field", format!("missing field '{}'", #name)));
        }
    }
}

pub fn message_impl(message: &Message, schema: &Schema) -> TokenStream {
    let name = type_ident(&message.name);
    let obfuscate_strings = schema.obfuscate_strings();
    let number_names = schema.number_names();

    log::debug!(
        "emitting codec for message '{}' ({} field(s): {})",
        message.qualified_name(),
        message.fields.len(),
        message.fields.iter().map(|f| f.name.as_str()).join(", "),
    );

    let write_stmts = message
        .fields
        .iter()
        .map(|f| field_write_stmt(f, obfuscate_strings, number_names));

    let read_arms: Vec<(TokenStream, TokenStream)> = message
        .fields
        .iter()
        .enumerate()
        .filter(|(_, f)| !f.is_transient())
        .map(|(bit, field)| {
            let label = field.json_name(number_names);
            let key_expr = emit_key_expr(&label, obfuscate_strings);
            let body = field_read_stmt(field, bit as u32, &schema.messages);
            (quote! { key == #key_expr }, body)
        })
        .collect();
    let dispatch = build_dispatch(&read_arms);

    let required_checks =
        message.fields.iter().enumerate().map(|(bit, f)| required_check_stmt(f, bit as u32));

    let clear_body = quote! { *self = Self::default(); };
    let empty_checks = message.fields.iter().map(field_empty_check);
    let equal_checks = message.fields.iter().map(field_equal_expr);
    let swap_stmts = message.fields.iter().map(|f| {
        let ident = field_ident(&f.name);
        quote! { std::mem::swap(&mut self.#ident, &mut other.#ident); }
    });

    let is_empty_body = if message.fields.is_empty() {
        quote! { true }
    } else {
        quote! { #(#empty_checks)&&* }
    };
    let equal_body = if message.fields.is_empty() {
        quote! { true }
    } else {
        quote! { #(#equal_checks)&&* }
    };

    quote! {
        impl #name {
            /// Writes this value as a single RFC-8259 JSON object.
            pub fn serialize(&self, params: &crate::json_rt::Parameters) -> String {
                let mut parts: Vec<String> = Vec::new();
                #(#write_stmts)*
                let mut out = String::new();
                out.push('{');
                out.push_str(&parts.join(","));
                out.push('}');
                out
            }

            /// Parses a single RFC-8259 JSON object into this message type.
            pub fn deserialize(
                input: &str,
                params: &crate::json_rt::Parameters,
            ) -> crate::json_rt::JsonResult<Self> {
                let mut t = crate::json_rt::Tokenizer::new(input);
                let value = Self::read_value(&mut t, params)?;
                match t.next()? {
                    crate::json_rt::Tok::Eof => Ok(value),
                    other => {
                        Err(t.error_at("trailing_data", format!("unexpected trailing {other}")))
                    }
                }
            }

            /// Reads one value of this type from a tokenizer already
            /// positioned at its opening `{`. Used both by `deserialize`
            /// and, recursively, by enclosing messages reading a nested
            /// message field.
            pub(crate) fn read_value(
                t: &mut crate::json_rt::Tokenizer,
                params: &crate::json_rt::Parameters,
            ) -> crate::json_rt::JsonResult<Self> {
                let mut result = Self::default();
                let mut __present: u32 = 0;
                t.expect(&crate::json_rt::Tok::LBrace)?;
                if *t.peek()? == crate::json_rt::Tok::RBrace {
                    t.next()?;
                } else {
                    loop {
                        let key = match t.next()? {
                            crate::json_rt::Tok::Str(s) => s,
                            other => {
                                return Err(t.error_at(
                                    "unexpected_token",
                                    format!("expected a string key, found {other}"),
                                ))
                            }
                        };
                        t.expect(&crate::json_rt::Tok::Colon)?;
                        #dispatch
                        match t.next()? {
                            crate::json_rt::Tok::Comma => continue,
                            crate::json_rt::Tok::RBrace => break,
                            other => {
                                return Err(t.error_at(
                                    "unexpected_token",
                                    format!("expected ',' or '}}', found {other}"),
                                ))
                            }
                        }
                    }
                }
                if params.require_all_fields {
                    #(#required_checks)*
                }
                Ok(result)
            }

            /// Resets every field to its empty state.
            pub fn clear(&mut self) {
                #clear_body
            }

            /// True iff every field is absent or empty.
            pub fn is_empty(&self) -> bool {
                #is_empty_body
            }

            /// Field-by-field comparison; floating-point fields compare
            /// equal within one ULP.
            pub fn equal(&self, other: &Self) -> bool {
                #equal_body
            }

            /// Exchanges every field between `self` and `other`.
            pub fn swap(&mut self, other: &mut Self) {
                #(#swap_stmts)*
            }
        }
    }
}

/// Chains `(condition, body)` pairs into `if cond { body } else if cond2 {
/// body2 } else { t.ignore_value()?; }`, matching the deserializer's
/// `ExpectKey` dispatch: unmatched keys fall through to the runtime's
/// ignore-value primitive.
fn build_dispatch(arms: &[(TokenStream, TokenStream)]) -> TokenStream {
    let mut chain = quote! { { t.ignore_value()?; } };
    for (cond, body) in arms.iter().rev() {
        chain = quote! {
            if #cond {
                #body
            } else #chain
        };
    }
    chain
}

