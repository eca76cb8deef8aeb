//! Recursive-descent parser over the token stream.
//!
//! Grammar follows the proto3 subset verbatim; grounded in
//! `library/proto3.cc`'s `Proto3::parse`/`parseMessage`/`parseField` family,
//! adapted from a one-token-lookahead C-style parser to `Lexer::peek`/`next`.

use crate::ast::{
    Field, FieldKind, Message, MessageRef, OptionEntry, OptionKind, OptionMap, ScalarType, Schema,
};
use crate::error::{CompileError, CompileResult};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    file_name: String,
    package: Option<String>,
    syntax_seen: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, file_name: impl Into<String>) -> Self {
        Parser {
            lexer: Lexer::new(source),
            file_name: file_name.into(),
            package: None,
            syntax_seen: false,
        }
    }

    pub fn parse(mut self) -> CompileResult<Schema> {
        let mut schema = Schema::new(self.file_name.clone());

        loop {
            let tok = self.lexer.peek()?.clone();
            match tok.kind {
                TokenKind::Eof => break,
                TokenKind::Syntax => self.parse_syntax()?,
                TokenKind::Package => self.parse_package(&mut schema)?,
                TokenKind::Option => {
                    let entry = self.parse_option()?;
                    schema.global_options.insert(entry);
                }
                TokenKind::Message => {
                    let message = self.parse_message(schema.package.as_deref().unwrap_or(""))?;
                    schema.messages.push(message);
                }
                TokenKind::Enum => {
                    return Err(CompileError::parse(
                        tok.line,
                        tok.column,
                        "enum declarations are not supported",
                    ))
                }
                _ => {
                    return Err(self.unexpected(&tok, "a top-level declaration"));
                }
            }
        }

        Ok(schema)
    }

    fn unexpected(&self, tok: &Token, expected: &str) -> CompileError {
        CompileError::parse(
            tok.line,
            tok.column,
            format!("unexpected {}, expected {expected}", tok.kind),
        )
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> CompileResult<Token> {
        let tok = self.lexer.next()?;
        if std::mem::discriminant(&tok.kind) == std::mem::discriminant(kind) {
            Ok(tok)
        } else {
            Err(self.unexpected(&tok, what))
        }
    }

    fn expect_semicolon(&mut self) -> CompileResult<()> {
        self.expect(&TokenKind::Semicolon, "';'")?;
        Ok(())
    }

    fn expect_name(&mut self) -> CompileResult<(String, usize, usize)> {
        let tok = self.lexer.next()?;
        match tok.kind {
            TokenKind::Name(name) => Ok((name, tok.line, tok.column)),
            other => Err(CompileError::parse(
                tok.line,
                tok.column,
                format!("unexpected {other}, expected an identifier"),
            )),
        }
    }

    fn parse_syntax(&mut self) -> CompileResult<()> {
        let tok = self.lexer.next()?; // 'syntax'
        if self.syntax_seen {
            return Err(CompileError::parse(
                tok.line,
                tok.column,
                "duplicate 'syntax' declaration",
            ));
        }
        self.expect(&TokenKind::Equal, "'='")?;
        let value_tok = self.lexer.next()?;
        let value = match value_tok.kind {
            TokenKind::StringLit(s) => s,
            other => {
                return Err(CompileError::parse(
                    value_tok.line,
                    value_tok.column,
                    format!("unexpected {other}, expected a string literal"),
                ))
            }
        };
        if value != "proto3" {
            return Err(CompileError::parse(
                value_tok.line,
                value_tok.column,
                format!("unsupported syntax '{value}', only \"proto3\" is supported"),
            ));
        }
        self.expect_semicolon()?;
        self.syntax_seen = true;
        Ok(())
    }

    fn parse_package(&mut self, schema: &mut Schema) -> CompileResult<()> {
        let tok = self.lexer.next()?; // 'package'
        if self.package.is_some() {
            return Err(CompileError::parse(
                tok.line,
                tok.column,
                "duplicate 'package' declaration",
            ));
        }
        let name_tok = self.lexer.next()?;
        let name = match name_tok.kind {
            TokenKind::Name(n) | TokenKind::QualifiedName(n) => n,
            other => {
                return Err(CompileError::parse(
                    name_tok.line,
                    name_tok.column,
                    format!("unexpected {other}, expected a package name"),
                ))
            }
        };
        self.expect_semicolon()?;
        self.package = Some(name.clone());
        schema.package = Some(name);
        Ok(())
    }

    fn parse_option_value(&mut self) -> CompileResult<(OptionKind, String)> {
        let tok = self.lexer.next()?;
        Ok(match tok.kind {
            TokenKind::True => (OptionKind::Boolean, "true".to_string()),
            TokenKind::False => (OptionKind::Boolean, "false".to_string()),
            TokenKind::Name(n) | TokenKind::QualifiedName(n) => (OptionKind::Identifier, n),
            TokenKind::StringLit(s) => (OptionKind::String, s),
            TokenKind::Integer(i) => (OptionKind::Integer, i),
            other => {
                return Err(CompileError::parse(
                    tok.line,
                    tok.column,
                    format!("unexpected {other}, expected an option value"),
                ))
            }
        })
    }

    fn parse_option(&mut self) -> CompileResult<OptionEntry> {
        self.lexer.next()?; // 'option'
        let name_tok = self.lexer.next()?;
        let (name, line, column) = match name_tok.kind {
            TokenKind::Name(n) | TokenKind::QualifiedName(n) => (n, name_tok.line, name_tok.column),
            other => {
                return Err(CompileError::parse(
                    name_tok.line,
                    name_tok.column,
                    format!("unexpected {other}, expected an option name"),
                ))
            }
        };
        self.expect(&TokenKind::Equal, "'='")?;
        let (kind, value) = self.parse_option_value()?;
        self.expect_semicolon()?;
        Ok(OptionEntry { name, kind, value, line, column })
    }

    fn parse_field_options(&mut self) -> CompileResult<OptionMap> {
        self.lexer.next()?; // '['
        let mut options = OptionMap::new();

        if self.lexer.peek()?.kind == TokenKind::RBracket {
            self.lexer.next()?;
            return Ok(options);
        }

        loop {
            let name_tok = self.lexer.next()?;
            let (name, line, column) = match name_tok.kind {
                TokenKind::Name(n) | TokenKind::QualifiedName(n) => {
                    (n, name_tok.line, name_tok.column)
                }
                other => {
                    return Err(CompileError::parse(
                        name_tok.line,
                        name_tok.column,
                        format!("unexpected {other}, expected a field option name"),
                    ))
                }
            };
            self.expect(&TokenKind::Equal, "'='")?;
            let (kind, value) = self.parse_option_value()?;
            options.insert(OptionEntry { name, kind, value, line, column });

            let sep = self.lexer.next()?;
            match sep.kind {
                TokenKind::Comma => continue,
                TokenKind::RBracket => break,
                other => {
                    return Err(CompileError::parse(
                        sep.line,
                        sep.column,
                        format!("unexpected {other}, expected ',' or ']'"),
                    ))
                }
            }
        }
        Ok(options)
    }

    fn scalar_type(kind: &TokenKind) -> Option<ScalarType> {
        Some(match kind {
            TokenKind::TDouble => ScalarType::Double,
            TokenKind::TFloat => ScalarType::Float,
            TokenKind::TInt32 => ScalarType::Int32,
            TokenKind::TInt64 => ScalarType::Int64,
            TokenKind::TUint32 => ScalarType::Uint32,
            TokenKind::TUint64 => ScalarType::Uint64,
            TokenKind::TSint32 => ScalarType::Sint32,
            TokenKind::TSint64 => ScalarType::Sint64,
            TokenKind::TFixed32 => ScalarType::Fixed32,
            TokenKind::TFixed64 => ScalarType::Fixed64,
            TokenKind::TSfixed32 => ScalarType::Sfixed32,
            TokenKind::TSfixed64 => ScalarType::Sfixed64,
            TokenKind::TBool => ScalarType::Bool,
            TokenKind::TString => ScalarType::String,
            TokenKind::TBytes => ScalarType::Bytes,
            _ => return None,
        })
    }

    fn parse_field(&mut self, package: &str) -> CompileResult<Field> {
        let repeated = if self.lexer.peek()?.kind == TokenKind::Repeated {
            self.lexer.next()?;
            true
        } else {
            false
        };

        let type_tok = self.lexer.next()?;
        let (line, column) = (type_tok.line, type_tok.column);
        let kind = if let Some(scalar) = Self::scalar_type(&type_tok.kind) {
            FieldKind::Scalar(scalar)
        } else {
            match type_tok.kind {
                TokenKind::Name(n) => {
                    let qualified = if package.is_empty() {
                        n
                    } else {
                        format!("{package}.{n}")
                    };
                    FieldKind::Message(MessageRef::new(qualified, line, column))
                }
                TokenKind::QualifiedName(n) => {
                    FieldKind::Message(MessageRef::new(n, line, column))
                }
                TokenKind::Map => {
                    return Err(CompileError::parse(line, column, "'map' fields are not supported"))
                }
                other => {
                    return Err(CompileError::parse(
                        line,
                        column,
                        format!("unexpected {other}, expected a field type"),
                    ))
                }
            }
        };

        let (name, name_line, name_column) = self.expect_name()?;

        self.expect(&TokenKind::Equal, "'='")?;
        let index_tok = self.lexer.next()?;
        let index = match index_tok.kind {
            TokenKind::Integer(ref digits) => digits.parse::<u32>().map_err(|_| {
                CompileError::parse(
                    index_tok.line,
                    index_tok.column,
                    format!("field index '{digits}' is out of range"),
                )
            })?,
            ref other => {
                return Err(CompileError::parse(
                    index_tok.line,
                    index_tok.column,
                    format!("unexpected {other}, expected a field index"),
                ))
            }
        };
        if index == 0 {
            return Err(CompileError::parse(
                index_tok.line,
                index_tok.column,
                "field index must be a positive integer",
            ));
        }

        let options = if self.lexer.peek()?.kind == TokenKind::LBracket {
            self.parse_field_options()?
        } else {
            OptionMap::new()
        };

        self.expect_semicolon()?;

        Ok(Field {
            name,
            index,
            repeated,
            kind,
            options,
            line: name_line,
            column: name_column,
        })
    }

    fn parse_message(&mut self, package: &str) -> CompileResult<Message> {
        let message_tok = self.lexer.next()?; // 'message'
        let (name, _, _) = self.expect_name()?;
        self.expect(&TokenKind::LBrace, "'{'")?;

        let mut fields = Vec::new();
        let mut options = OptionMap::new();

        loop {
            let tok = self.lexer.peek()?.clone();
            match tok.kind {
                TokenKind::RBrace => {
                    self.lexer.next()?;
                    break;
                }
                TokenKind::Option => {
                    let entry = self.parse_option()?;
                    options.insert(entry);
                }
                TokenKind::Enum => {
                    return Err(CompileError::parse(
                        tok.line,
                        tok.column,
                        "enum declarations are not supported",
                    ))
                }
                TokenKind::Eof => {
                    return Err(CompileError::parse(
                        tok.line,
                        tok.column,
                        "unexpected end of file inside message body",
                    ))
                }
                _ => {
                    let field = self.parse_field(package)?;
                    if let Some(prior) = fields.iter().find(|f: &&Field| f.index == field.index) {
                        return Err(CompileError::parse(
                            field.line,
                            field.column,
                            format!(
                                "field '{}' reuses index {} already assigned to field '{}' in message '{name}'",
                                field.name, field.index, prior.name
                            ),
                        ));
                    }
                    fields.push(field);
                }
            }
        }

        Ok(Message {
            name,
            package: package.to_string(),
            fields,
            options,
            line: message_tok.line,
            column: message_tok.column,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> CompileResult<Schema> {
        Parser::new(src, "test.proto").parse()
    }

    #[test]
    fn parses_minimal_message() {
        let schema = parse(r#"syntax = "proto3"; message P { string name = 1; int32 age = 2; }"#)
            .unwrap();
        assert_eq!(schema.messages.len(), 1);
        assert_eq!(schema.messages[0].fields.len(), 2);
        assert_eq!(schema.messages[0].fields[0].name, "name");
        assert_eq!(schema.messages[0].fields[1].index, 2);
    }

    #[test]
    fn rejects_non_proto3_syntax() {
        let err = parse(r#"syntax = "proto2";"#).unwrap_err();
        assert!(matches!(err, CompileError::Parse { .. }));
    }

    #[test]
    fn rejects_duplicate_syntax() {
        let err = parse(r#"syntax = "proto3"; syntax = "proto3";"#).unwrap_err();
        assert!(matches!(err, CompileError::Parse { .. }));
    }

    #[test]
    fn records_package_and_qualifies_message_refs() {
        let schema = parse("package foo.bar; message A { B b = 1; }").unwrap();
        assert_eq!(schema.package.as_deref(), Some("foo.bar"));
        match &schema.messages[0].fields[0].kind {
            FieldKind::Message(r) => assert_eq!(r.qualified_name, "foo.bar.B"),
            _ => panic!("expected message field"),
        }
    }

    #[test]
    fn parses_repeated_and_field_options() {
        let schema =
            parse(r#"message P { repeated string friends = 3 [name="pals"]; }"#).unwrap();
        let field = &schema.messages[0].fields[0];
        assert!(field.repeated);
        assert_eq!(field.options.get_string("name"), Some("pals"));
    }

    #[test]
    fn rejects_trailing_comma_in_field_options() {
        let err = parse(r#"message P { string name = 1 [transient=true,]; }"#).unwrap_err();
        assert!(matches!(err, CompileError::Parse { .. }));
    }

    #[test]
    fn rejects_enum() {
        let err = parse("enum Color { }").unwrap_err();
        assert!(matches!(err, CompileError::Parse { .. }));
    }

    #[test]
    fn rejects_map_field() {
        let err = parse("message P { map<string,string> m = 1; }").unwrap_err();
        assert!(matches!(err, CompileError::Parse { .. }));
    }

    #[test]
    fn global_option_last_one_wins() {
        let schema =
            parse("option number_names = false; option number_names = true;").unwrap();
        assert_eq!(schema.global_options.get_bool("number_names"), Some(true));
    }

    #[test]
    fn rejects_duplicate_field_index_within_a_message() {
        let err = parse("message P { string a = 1; int32 b = 1; }").unwrap_err();
        assert!(matches!(err, CompileError::Parse { .. }));
    }

    #[test]
    fn non_contiguous_field_indices_are_allowed() {
        let schema = parse("message P { string a = 1; int32 b = 5; }").unwrap();
        assert_eq!(schema.messages[0].fields[1].index, 5);
    }
}
