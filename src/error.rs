//! Error taxonomy for the compilation pipeline.
//!
//! Every stage (lexer, parser, resolver, emitter) short-circuits on the first
//! error and surfaces it unchanged; each variant carries the `(line, column)`
//! of the offending token so the CLI can print `<path>:<line>:<column>: error:
//! <message>` the way `protogen`'s `exception::cause()` does.

use std::fmt;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("{message}")]
    Lex {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("{message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("unable to find message '{qualified_name}'")]
    UnresolvedType {
        qualified_name: String,
        line: usize,
        column: usize,
    },

    #[error("circular reference with '{message_name}'")]
    CircularReference {
        message_name: String,
        line: usize,
        column: usize,
    },

    #[error("more than {max} fields in message '{message_name}'")]
    LimitExceeded {
        message_name: String,
        max: usize,
        line: usize,
        column: usize,
    },

    #[error("{message}")]
    Option {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn lex(line: usize, column: usize, message: impl Into<String>) -> Self {
        CompileError::Lex {
            line,
            column,
            message: message.into(),
        }
    }

    pub fn parse(line: usize, column: usize, message: impl Into<String>) -> Self {
        CompileError::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    pub fn option_error(line: usize, column: usize, message: impl Into<String>) -> Self {
        CompileError::Option {
            message: message.into(),
            line,
            column,
        }
    }

    /// Position of the token that caused the error, or `None` for I/O errors
    /// which have no source position.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            CompileError::Lex { line, column, .. }
            | CompileError::Parse { line, column, .. }
            | CompileError::UnresolvedType { line, column, .. }
            | CompileError::CircularReference { line, column, .. }
            | CompileError::LimitExceeded { line, column, .. }
            | CompileError::Option { line, column, .. } => Some((*line, *column)),
            CompileError::Io(_) => None,
        }
    }

    /// Formats the diagnostic the way the CLI surface requires:
    /// `<path>:<line>:<column>: error: <message>`.
    pub fn diagnostic(&self, path: &str) -> String {
        struct Diag<'a>(&'a str, &'a CompileError);
        impl fmt::Display for Diag<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.1.position() {
                    Some((line, column)) => {
                        write!(f, "{}:{}:{}: error: {}", self.0, line, column, self.1)
                    }
                    None => write!(f, "{}: error: {}", self.0, self.1),
                }
            }
        }
        Diag(path, self).to_string()
    }
}
