//! Recursive-descent parser for inflation expressions.
//!
//! Grammar:
//!
//! ```text
//! expr  := fields EOF
//! fields := field ("," field)*
//! field := IDENT ("{" fields "}")?
//! ```
//!
//! The empty expression parses to the empty policy; everything else that
//! deviates from the grammar (unbalanced braces, trailing separators,
//! empty brace groups) is a [`PolicyParseError`].

use std::collections::HashMap;

use beacon_core::{FacadeError, InflationPolicy};
use thiserror::Error;

use crate::lexer::{Token, TokenKind};

/// Parse error with the byte position of the offending token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Parse error at position {position}: {message}")]
pub struct PolicyParseError {
    pub message: String,
    pub position: usize,
}

impl From<PolicyParseError> for FacadeError {
    fn from(err: PolicyParseError) -> Self {
        FacadeError::Policy {
            message: err.message,
            position: err.position,
        }
    }
}

/// Parser over a lexed token stream.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a new parser from a vector of tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse the tokens into an inflation policy.
    pub fn parse(&mut self) -> Result<InflationPolicy, PolicyParseError> {
        if let Some(token) = self
            .tokens
            .iter()
            .find(|t| matches!(t.kind, TokenKind::Error(_)))
        {
            let message = match &token.kind {
                TokenKind::Error(msg) => msg.clone(),
                _ => "Lexer error".to_string(),
            };
            return Err(PolicyParseError {
                message,
                position: token.span.start,
            });
        }

        // An empty expression legitimately requests nothing.
        if self.check(&TokenKind::Eof) {
            return Ok(InflationPolicy::empty());
        }

        let policy = self.parse_fields()?;
        self.expect_eof()?;
        Ok(policy)
    }

    /// Parse a comma-separated field list (one nesting level).
    fn parse_fields(&mut self) -> Result<InflationPolicy, PolicyParseError> {
        let mut children = HashMap::new();

        loop {
            let name = self.expect_ident()?;

            let child = if self.check(&TokenKind::LBrace) {
                self.advance();
                let nested = self.parse_fields()?;
                self.expect(&TokenKind::RBrace)?;
                Some(nested)
            } else {
                None
            };

            // Duplicate field names collapse to the last occurrence.
            children.insert(name, child);

            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        Ok(InflationPolicy::from_children(children))
    }

    fn expect_ident(&mut self) -> Result<String, PolicyParseError> {
        match &self.current().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error("Expected field name")),
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), PolicyParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&format!("Expected {}", describe(kind))))
        }
    }

    fn expect_eof(&mut self) -> Result<(), PolicyParseError> {
        if self.check(&TokenKind::Eof) {
            Ok(())
        } else {
            Err(self.error("Unexpected trailing input"))
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    fn current(&self) -> &Token {
        // The token stream always ends with Eof, so pos stays in bounds.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn error(&self, message: &str) -> PolicyParseError {
        PolicyParseError {
            message: message.to_string(),
            position: self.current().span.start,
        }
    }
}

fn describe(kind: &TokenKind) -> &'static str {
    match kind {
        TokenKind::Ident(_) => "field name",
        TokenKind::LBrace => "'{'",
        TokenKind::RBrace => "'}'",
        TokenKind::Comma => "','",
        TokenKind::Eof => "end of expression",
        TokenKind::Error(_) => "valid token",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(source: &str) -> Result<InflationPolicy, PolicyParseError> {
        Parser::new(Lexer::new(source).tokenize()).parse()
    }

    #[test]
    fn single_field() {
        let policy = parse("activity").unwrap();
        assert!(policy.has_child_field("activity"));
        assert_eq!(policy.len(), 1);
    }

    #[test]
    fn sibling_groups() {
        let policy = parse("a{x},b{y}").unwrap();
        assert!(policy.child_policy("a").unwrap().has_child_field("x"));
        assert!(policy.child_policy("b").unwrap().has_child_field("y"));
    }

    #[test]
    fn trailing_comma_is_an_error() {
        let err = parse("activity,").unwrap_err();
        assert_eq!(err.position, 9);
        assert!(err.message.contains("field name"));
    }

    #[test]
    fn leading_comma_is_an_error() {
        assert!(parse(",activity").is_err());
    }

    #[test]
    fn unbalanced_open_brace_is_an_error() {
        assert!(parse("activity{").is_err());
        assert!(parse("activity{device").is_err());
    }

    #[test]
    fn unbalanced_close_brace_is_an_error() {
        let err = parse("activity}").unwrap_err();
        assert!(err.message.contains("trailing input"));
    }

    #[test]
    fn empty_brace_group_is_an_error() {
        // A leaf request is spelled without braces.
        assert!(parse("activity{}").is_err());
    }

    #[test]
    fn duplicate_fields_collapse_to_last() {
        let policy = parse("a{x},a{y}").unwrap();
        assert_eq!(policy.len(), 1);
        let a = policy.child_policy("a").unwrap();
        assert!(a.has_child_field("y"));
        assert!(!a.has_child_field("x"));
    }

    #[test]
    fn error_positions_point_at_the_offending_token() {
        let err = parse("a{b;c}").unwrap_err();
        assert_eq!(err.position, 3);
    }
}
