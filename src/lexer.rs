//! Character-stream lexer.
//!
//! Mirrors `protogen`'s `InputStream`/`Tokenizer` pair in
//! `library/proto3.cc`: a cursor that tracks `(line, column)` one character
//! at a time, and a tokenizer built on top of it that classifies runs of
//! characters into [`Token`]s. Rust's `Peekable<Chars>` replaces the
//! C++ `get`/`unget` single-token pushback.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{CompileError, CompileResult};
use crate::token::{Token, TokenKind};

fn keyword(word: &str) -> Option<TokenKind> {
    Some(match word {
        "message" => TokenKind::Message,
        "repeated" => TokenKind::Repeated,
        "package" => TokenKind::Package,
        "syntax" => TokenKind::Syntax,
        "option" => TokenKind::Option,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "enum" => TokenKind::Enum,
        "map" => TokenKind::Map,
        "double" => TokenKind::TDouble,
        "float" => TokenKind::TFloat,
        "int32" => TokenKind::TInt32,
        "int64" => TokenKind::TInt64,
        "uint32" => TokenKind::TUint32,
        "uint64" => TokenKind::TUint64,
        "sint32" => TokenKind::TSint32,
        "sint64" => TokenKind::TSint64,
        "fixed32" => TokenKind::TFixed32,
        "fixed64" => TokenKind::TFixed64,
        "sfixed32" => TokenKind::TSfixed32,
        "sfixed64" => TokenKind::TSfixed64,
        "bool" => TokenKind::TBool,
        "string" => TokenKind::TString,
        "bytes" => TokenKind::TBytes,
        _ => return None,
    })
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
    peeked: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            line: 1,
            column: 0,
            peeked: None,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn skip_whitespace_and_comments(&mut self) -> CompileResult<()> {
        loop {
            match self.peek_char() {
                Some(c) if c == ' ' || c == '\t' || c == '\r' || c == '\n' => {
                    self.advance();
                }
                Some('/') => {
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    match lookahead.peek() {
                        Some('/') => {
                            self.advance();
                            self.advance();
                            while let Some(c) = self.peek_char() {
                                if c == '\n' {
                                    break;
                                }
                                self.advance();
                            }
                        }
                        Some('*') => {
                            let (line, column) = (self.line, self.column + 1);
                            self.advance();
                            self.advance();
                            let mut closed = false;
                            while let Some(c) = self.advance() {
                                if c == '*' && self.peek_char() == Some('/') {
                                    self.advance();
                                    closed = true;
                                    break;
                                }
                            }
                            if !closed {
                                return Err(CompileError::lex(
                                    line,
                                    column,
                                    "unterminated block comment",
                                ));
                            }
                        }
                        _ => break,
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn read_identifier_or_qualified(&mut self, line: usize, column: usize) -> Token {
        let mut lexeme = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let mut qualified = false;
        while self.peek_char() == Some('.') {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            match lookahead.peek() {
                Some(c) if c.is_ascii_alphabetic() || *c == '_' => {
                    qualified = true;
                    lexeme.push('.');
                    self.advance();
                    while let Some(c) = self.peek_char() {
                        if c.is_ascii_alphanumeric() || c == '_' {
                            lexeme.push(c);
                            self.advance();
                        } else {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }

        if qualified {
            return Token::new(TokenKind::QualifiedName(lexeme), line, column);
        }

        match keyword(&lexeme) {
            Some(kind) => Token::new(kind, line, column),
            None => Token::new(TokenKind::Name(lexeme), line, column),
        }
    }

    fn read_integer(&mut self, line: usize, column: usize) -> Token {
        let mut lexeme = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }
        Token::new(TokenKind::Integer(lexeme), line, column)
    }

    fn read_string(&mut self, line: usize, column: usize) -> CompileResult<Token> {
        self.advance();
        let mut lexeme = String::new();
        loop {
            match self.advance() {
                None => {
                    return Err(CompileError::lex(line, column, "unterminated string literal"))
                }
                Some('"') => break,
                Some('\n') | Some('\0') => {
                    return Err(CompileError::lex(line, column, "unterminated string literal"))
                }
                Some('\\') => {
                    lexeme.push('\\');
                    if let Some(escaped) = self.advance() {
                        lexeme.push(escaped);
                    }
                }
                Some(c) => lexeme.push(c),
            }
        }
        Ok(Token::new(TokenKind::StringLit(lexeme), line, column))
    }

    fn lex_one(&mut self) -> CompileResult<Token> {
        self.skip_whitespace_and_comments()?;

        let (line, column) = (self.line, self.column + 1);
        let c = match self.peek_char() {
            None => return Ok(Token::new(TokenKind::Eof, line, column)),
            Some(c) => c,
        };

        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(self.read_identifier_or_qualified(line, column));
        }
        if c.is_ascii_digit() {
            return Ok(self.read_integer(line, column));
        }
        if c == '"' {
            return self.read_string(line, column);
        }

        let kind = match c {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '<' => TokenKind::LAngle,
            '>' => TokenKind::RAngle,
            '=' => TokenKind::Equal,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            other => {
                return Err(CompileError::lex(
                    line,
                    column,
                    format!("unexpected character '{other}'"),
                ))
            }
        };
        self.advance();
        Ok(Token::new(kind, line, column))
    }

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> CompileResult<&Token> {
        if self.peeked.is_none() {
            let tok = self.lex_one()?;
            self.peeked = Some(tok);
        }
        Ok(self.peeked.as_ref().unwrap())
    }

    /// Consumes and returns the next token.
    pub fn next(&mut self) -> CompileResult<Token> {
        if let Some(tok) = self.peeked.take() {
            return Ok(tok);
        }
        self.lex_one()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next().unwrap();
            let done = tok.kind == TokenKind::Eof;
            out.push(tok.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn lexes_minimal_message() {
        let toks = kinds("message P { string name = 1; }");
        assert_eq!(
            toks,
            vec![
                TokenKind::Message,
                TokenKind::Name("P".into()),
                TokenKind::LBrace,
                TokenKind::TString,
                TokenKind::Name("name".into()),
                TokenKind::Equal,
                TokenKind::Integer("1".into()),
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn qualified_name_is_single_token() {
        let toks = kinds("foo.bar.Baz");
        assert_eq!(toks, vec![TokenKind::QualifiedName("foo.bar.Baz".into()), TokenKind::Eof]);
    }

    #[test]
    fn line_comment_is_skipped() {
        let toks = kinds("// comment\nmessage");
        assert_eq!(toks, vec![TokenKind::Message, TokenKind::Eof]);
    }

    #[test]
    fn block_comment_is_skipped() {
        let toks = kinds("/* multi\nline */message");
        assert_eq!(toks, vec![TokenKind::Message, TokenKind::Eof]);
    }

    #[test]
    fn unterminated_block_comment_errors() {
        let mut lexer = Lexer::new("/* never closed");
        let err = lexer.next().unwrap_err();
        assert!(matches!(err, CompileError::Lex { line: 1, column: 1, .. }));
    }

    #[test]
    fn unterminated_string_errors() {
        let mut lexer = Lexer::new("\"abc");
        let err = lexer.next().unwrap_err();
        assert!(matches!(err, CompileError::Lex { .. }));
    }

    #[test]
    fn unexpected_char_errors() {
        let mut lexer = Lexer::new("#");
        let err = lexer.next().unwrap_err();
        assert!(matches!(err, CompileError::Lex { line: 1, column: 1, .. }));
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let mut lexer = Lexer::new("message\nP");
        let first = lexer.next().unwrap();
        assert_eq!((first.line, first.column), (1, 1));
        let second = lexer.next().unwrap();
        assert_eq!((second.line, second.column), (2, 1));
    }

    #[test]
    fn peek_does_not_consume() {
        let mut lexer = Lexer::new("message");
        assert_eq!(lexer.peek().unwrap().kind, TokenKind::Message);
        assert_eq!(lexer.peek().unwrap().kind, TokenKind::Message);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Message);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Eof);
    }
}
