use std::fmt;

use super::ParseError;

/// Words the lexer classifies as [`TokenKind::Keyword`].
pub const KEYWORDS: &[&str] = &[
    "delete", "ignore", "skip", "when", "exists", "and", "not", "here", "parent", "parents",
    "child", "children", "sibling",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Identifier,
    String,
    Comment,
    EndOfInput,
}

/// A lexed token. `text` holds the decoded value for strings
/// and the trimmed body for comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == word
    }

    /// Identifiers and quoted strings can both stand in for a path pattern.
    pub fn is_pattern(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier | TokenKind::String)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::EndOfInput => write!(f, "end of input"),
            TokenKind::String => write!(f, "string {:?}", self.text),
            TokenKind::Comment => write!(f, "comment"),
            TokenKind::Keyword | TokenKind::Identifier => write!(f, "'{}'", self.text),
        }
    }
}

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Characters allowed in an unquoted identifier, glob metacharacters included.
pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '_' | '.' | '-' | '*' | '/' | '?' | '[' | ']' | '{' | '}' | ',' | '!'
        )
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut cur = Cursor::new(input);

    while let Some(c) = cur.peek() {
        let (line, column) = (cur.line, cur.column);
        match c {
            ' ' | '\t' | '\r' | '\n' => {
                cur.bump();
            }
            '#' => {
                let mut body = String::new();
                cur.bump();
                while let Some(c) = cur.peek() {
                    if c == '\n' {
                        break;
                    }
                    body.push(c);
                    cur.bump();
                }
                tokens.push(Token::new(TokenKind::Comment, body.trim(), line, column));
            }
            '"' | '\'' => {
                let s = read_quoted(&mut cur)?;
                tokens.push(Token::new(TokenKind::String, s, line, column));
            }
            c if is_ident_char(c) => {
                let word = read_word(&mut cur);
                let kind = if is_keyword(&word) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Identifier
                };
                tokens.push(Token::new(kind, word, line, column));
            }
            other => {
                return Err(ParseError::new(
                    line,
                    column,
                    format!("unexpected character {other:?}"),
                ));
            }
        }
    }

    tokens.push(Token::new(TokenKind::EndOfInput, "", cur.line, cur.column));
    Ok(tokens)
}

fn read_quoted(cur: &mut Cursor) -> Result<String, ParseError> {
    let (line, column) = (cur.line, cur.column);
    let Some(quote) = cur.bump() else {
        return Err(ParseError::new(line, column, "expected quoted string"));
    };
    let mut s = String::new();

    while let Some(c) = cur.bump() {
        if c == quote {
            return Ok(s);
        }
        if c != '\\' {
            s.push(c);
            continue;
        }
        match cur.bump() {
            Some('n') => s.push('\n'),
            Some('t') => s.push('\t'),
            Some('\\') => s.push('\\'),
            Some(q @ ('\'' | '"')) => s.push(q),
            Some(other) => {
                s.push('\\');
                s.push(other);
            }
            None => break,
        }
    }

    Err(ParseError::new(line, column, "unterminated string"))
}

fn read_word(cur: &mut Cursor) -> String {
    let mut word = String::new();
    while let Some(c) = cur.peek() {
        if !is_ident_char(c) {
            break;
        }
        word.push(c);
        cur.bump();
    }
    word
}
