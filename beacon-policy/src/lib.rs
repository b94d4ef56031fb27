//! Beacon Policy - Inflation-Expression Parser
//!
//! Turns a client-supplied field-selection expression such as
//! `activity{identityProvider,device,publisher},history` into an
//! [`InflationPolicy`](beacon_core::InflationPolicy) tree. The pipeline is
//! lexer -> token stream -> recursive-descent parser.
//!
//! An empty expression is legal and yields the empty policy ("populate
//! nothing"); malformed input fails with a [`PolicyParseError`] carrying
//! the offending byte position, so callers can always tell the two apart.

pub mod lexer;
pub mod parser;

pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{Parser, PolicyParseError};

use beacon_core::InflationPolicy;

/// Parse a field-selection expression into an inflation policy.
///
/// This is the one entry point facades use; `None`-like absence of an
/// expression should be handled by the caller (no parse, no policy).
pub fn parse(expression: &str) -> Result<InflationPolicy, PolicyParseError> {
    let tokens = Lexer::new(expression).tokenize();
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_canonical_expression() {
        let policy = parse("activity{identityProvider,device,publisher},history").unwrap();

        assert!(policy.has_child_field("activity"));
        assert!(policy.has_child_field("history"));
        assert!(!policy.has_child_field("foo"));

        let activity = policy.child_policy("activity").unwrap();
        assert!(activity.has_child_field("identityProvider"));
        assert!(activity.has_child_field("device"));
        assert!(activity.has_child_field("publisher"));

        // history is a leaf request
        assert!(policy.child_policy("history").is_none());
    }

    #[test]
    fn empty_expression_is_the_empty_policy() {
        let policy = parse("").unwrap();
        assert!(policy.is_empty());
    }

    #[test]
    fn unbalanced_brace_is_an_error_not_an_empty_policy() {
        let err = parse("activity{").unwrap_err();
        assert!(err.message.contains("field name"));
    }

    #[test]
    fn deep_nesting() {
        let policy = parse("a{b{c{d}}}").unwrap();
        let a = policy.child_policy("a").unwrap();
        let b = a.child_policy("b").unwrap();
        let c = b.child_policy("c").unwrap();
        assert!(c.has_child_field("d"));
        assert!(c.child_policy("d").is_none());
    }
}
