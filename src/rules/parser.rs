use super::ast::{Action, Condition, Location, Predicate, Rule};
use super::lexer::{Token, TokenKind};
use super::ParseError;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        let mut tokens: Vec<Token> = tokens
            .into_iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .collect();
        if tokens.last().map(|t| t.kind) != Some(TokenKind::EndOfInput) {
            let (line, column) = tokens.last().map_or((1, 1), |t| (t.line, t.column));
            tokens.push(Token {
                kind: TokenKind::EndOfInput,
                text: String::new(),
                line,
                column,
            });
        }
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        // the list always ends with EndOfInput and `advance` never moves past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if tok.kind != TokenKind::EndOfInput {
            self.pos += 1;
        }
        tok
    }

    fn at_end(&self) -> bool {
        self.peek().kind == TokenKind::EndOfInput
    }

    fn error_at(tok: &Token, message: impl Into<String>) -> ParseError {
        ParseError::new(tok.line, tok.column, message)
    }

    /// rule = action pattern ("when" condition)?
    fn parse_rule(&mut self) -> Result<Rule, ParseError> {
        let tok = self.advance();
        let action = match (tok.kind, tok.text.as_str()) {
            (TokenKind::Keyword, "delete") => Action::Delete,
            (TokenKind::Keyword, "ignore") => Action::Ignore,
            (TokenKind::Keyword, "skip") => Action::Skip,
            _ => {
                return Err(Self::error_at(
                    &tok,
                    format!("expected an action (delete, ignore, skip), found {tok}"),
                ))
            }
        };

        let target = self.parse_pattern(&format!("'{action}'"))?;
        let mut rule = Rule::new(action, target);

        if action == Action::Delete && self.peek().is_keyword("when") {
            self.advance();
            rule.condition = Some(self.parse_condition()?);
        }

        Ok(rule)
    }

    /// condition = predicate ("and" predicate)*
    fn parse_condition(&mut self) -> Result<Condition, ParseError> {
        let mut predicates = vec![self.parse_predicate()?];
        while self.peek().is_keyword("and") {
            self.advance();
            predicates.push(self.parse_predicate()?);
        }
        // fold only yields None for an empty list
        Condition::fold(predicates)
            .ok_or_else(|| Self::error_at(self.peek(), "expected a condition"))
    }

    /// predicate = "not" predicate | location? "exists" pattern
    fn parse_predicate(&mut self) -> Result<Predicate, ParseError> {
        if self.peek().is_keyword("not") {
            self.advance();
            if self.at_end() {
                return Err(Self::error_at(
                    self.peek(),
                    "expected a predicate after 'not', found end of input",
                ));
            }
            let inner = self.parse_predicate()?;
            return Ok(Predicate::negate(inner));
        }

        let location = match self.peek().kind {
            TokenKind::Keyword => Location::from_keyword(&self.peek().text),
            _ => None,
        };
        if location.is_some() {
            self.advance();
        }
        let location = location.unwrap_or_default();

        let tok = self.advance();
        if !tok.is_keyword("exists") {
            return Err(Self::error_at(&tok, format!("expected 'exists', found {tok}")));
        }

        let pattern = self.parse_pattern("'exists'")?;
        Ok(Predicate::exists(location, pattern))
    }

    fn parse_pattern(&mut self, after: &str) -> Result<String, ParseError> {
        let tok = self.advance();
        if !tok.is_pattern() {
            return Err(Self::error_at(
                &tok,
                format!("expected a pattern after {after}, found {tok}"),
            ));
        }
        Ok(tok.text)
    }
}

/// Parses a token stream into rules. Comment tokens are dropped.
/// The first error aborts the whole parse.
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Rule>, ParseError> {
    let mut parser = Parser::new(tokens);
    let mut rules = Vec::new();
    while !parser.at_end() {
        rules.push(parser.parse_rule()?);
    }
    Ok(rules)
}
