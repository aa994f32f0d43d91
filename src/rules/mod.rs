//! The rule language front end: lexer, parser and AST.
//!
//! ```text
//! # comments run to the end of the line
//! skip node_modules
//! ignore .git
//! delete target when exists Cargo.toml and not exists keep.txt
//! delete node_modules when exists package.json
//! delete "My Documents/*.tmp" when parent exists .cleanme
//! ```
//!
//! Grammar:
//!
//! ```text
//! rule      = action pattern ("when" condition)?      ; "when" only after delete
//! action    = "delete" | "ignore" | "skip"
//! condition = predicate ("and" predicate)*
//! predicate = "not" predicate | location? "exists" pattern
//! location  = "here" | "parent" | "parents" | "child" | "children" | "sibling"
//! ```

mod ast;
mod lexer;
mod parser;

use thiserror::Error;

pub use ast::{Action, Condition, Location, Predicate, Rule};
pub use lexer::{tokenize, Token, TokenKind, KEYWORDS};

/// A lex or parse failure. Always fatal for the whole rule text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Lex and parse rule text. Performs no safety validation.
pub fn parse_rules(text: &str) -> Result<Vec<Rule>, ParseError> {
    let tokens = lexer::tokenize(text)?;
    parser::parse(tokens)
}
