//! Token kinds produced by the [`crate::lexer::Lexer`].

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Eof,

    // Keywords
    Message,
    Repeated,
    Package,
    Syntax,
    Option,
    True,
    False,
    Enum,
    Map,

    // Scalar type keywords
    TDouble,
    TFloat,
    TInt32,
    TInt64,
    TUint32,
    TUint64,
    TSint32,
    TSint64,
    TFixed32,
    TFixed64,
    TSfixed32,
    TSfixed64,
    TBool,
    TString,
    TBytes,

    // Identifiers and literals
    Name(String),
    QualifiedName(String),
    Integer(String),
    StringLit(String),

    // Punctuation
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LAngle,
    RAngle,
    Equal,
    Semicolon,
    Comma,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Eof => "end of file",
            TokenKind::Message => "'message'",
            TokenKind::Repeated => "'repeated'",
            TokenKind::Package => "'package'",
            TokenKind::Syntax => "'syntax'",
            TokenKind::Option => "'option'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Enum => "'enum'",
            TokenKind::Map => "'map'",
            TokenKind::TDouble => "'double'",
            TokenKind::TFloat => "'float'",
            TokenKind::TInt32 => "'int32'",
            TokenKind::TInt64 => "'int64'",
            TokenKind::TUint32 => "'uint32'",
            TokenKind::TUint64 => "'uint64'",
            TokenKind::TSint32 => "'sint32'",
            TokenKind::TSint64 => "'sint64'",
            TokenKind::TFixed32 => "'fixed32'",
            TokenKind::TFixed64 => "'fixed64'",
            TokenKind::TSfixed32 => "'sfixed32'",
            TokenKind::TSfixed64 => "'sfixed64'",
            TokenKind::TBool => "'bool'",
            TokenKind::TString => "'string'",
            TokenKind::TBytes => "'bytes'",
            TokenKind::Name(_) => "identifier",
            TokenKind::QualifiedName(_) => "qualified identifier",
            TokenKind::Integer(_) => "integer literal",
            TokenKind::StringLit(_) => "string literal",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LAngle => "'<'",
            TokenKind::RAngle => "'>'",
            TokenKind::Equal => "'='",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Token { kind, line, column }
    }

    pub fn is_scalar_type(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::TDouble
                | TokenKind::TFloat
                | TokenKind::TInt32
                | TokenKind::TInt64
                | TokenKind::TUint32
                | TokenKind::TUint64
                | TokenKind::TSint32
                | TokenKind::TSint64
                | TokenKind::TFixed32
                | TokenKind::TFixed64
                | TokenKind::TSfixed32
                | TokenKind::TSfixed64
                | TokenKind::TBool
                | TokenKind::TString
                | TokenKind::TBytes
        )
    }
}
