//! Recursive-descent parser for the textual expression form.
//!
//! Grammar (whitespace stripped before parsing):
//!
//! ```text
//! expr   := OPNAME '(' expr (',' expr)* ')' | OPNAME | '%' VARCHARS | '(' expr ')'
//! OPNAME := ASCII letters; bare letters with no '(' are a variable
//! VARCHARS := alphanumerics, '.', '_'
//! ```
//!
//! Parse failures are typed and carry positions into the stripped input;
//! callers retain the original string alongside the error so a malformed
//! expression never aborts the batch.

use super::ExprNode;

/// Structural errors produced while parsing an expression string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Input was empty after whitespace stripping
    #[error("empty expression")]
    Empty,

    /// Input ended where a token was required
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// Input ended inside an operator's argument list
    #[error("unclosed '(' after operator {op}")]
    UnclosedGroup {
        /// Operator whose argument list was left open
        op: String,
    },

    /// Argument list continued with neither ',' nor ')'
    #[error("expected ',' or ')' at position {pos}")]
    ExpectedSeparator {
        /// Offset into the stripped input
        pos: usize,
    },

    /// A '(' group was never closed
    #[error("missing closing ')' for parenthesized group at position {pos}")]
    MissingClosingParen {
        /// Offset into the stripped input
        pos: usize,
    },

    /// A character outside the grammar was encountered
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar {
        /// The offending character
        ch: char,
        /// Offset into the stripped input
        pos: usize,
    },

    /// A complete expression was followed by extra characters
    #[error("trailing characters after expression at position {pos}: {rest}")]
    TrailingInput {
        /// Offset into the stripped input
        pos: usize,
        /// The unconsumed remainder
        rest: String,
    },

    /// `NOT` was applied to other than exactly one argument
    #[error("NOT takes exactly one argument, found {found}")]
    NotArity {
        /// Number of arguments encountered
        found: usize,
    },
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn parse_token(&mut self) -> Result<ExprNode, ParseError> {
        let c = self.peek().ok_or(ParseError::UnexpectedEnd)?;
        if c.is_ascii_alphabetic() {
            self.parse_name_or_call()
        } else if c == '%' {
            Ok(self.parse_operand())
        } else if c == '(' {
            self.parse_group()
        } else {
            Err(ParseError::UnexpectedChar { ch: c, pos: self.pos })
        }
    }

    /// An operator application `NAME(...)`, or a bare name treated as a
    /// variable when no '(' follows.
    fn parse_name_or_call(&mut self) -> Result<ExprNode, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        if self.peek() != Some('(') {
            return Ok(ExprNode::Var(name));
        }
        self.pos += 1; // consume '('
        let name = name.to_uppercase();
        let mut args = Vec::new();
        loop {
            if self.pos >= self.chars.len() {
                return Err(ParseError::UnclosedGroup { op: name });
            }
            args.push(self.parse_token()?);
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                },
                Some(')') => {
                    self.pos += 1;
                    break;
                },
                _ => return Err(ParseError::ExpectedSeparator { pos: self.pos }),
            }
        }
        if name == "NOT" && args.len() != 1 {
            return Err(ParseError::NotArity { found: args.len() });
        }
        Ok(ExprNode::Op { name, args })
    }

    /// An operand reference: '%' followed by alphanumerics, '.', '_'.
    fn parse_operand(&mut self) -> ExprNode {
        let start = self.pos;
        self.pos += 1; // consume '%'
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '.' || c == '_') {
            self.pos += 1;
        }
        ExprNode::Var(self.chars[start..self.pos].iter().collect())
    }

    /// A redundant parenthesized group `( expr )`.
    fn parse_group(&mut self) -> Result<ExprNode, ParseError> {
        self.pos += 1; // consume '('
        let node = self.parse_token()?;
        if self.peek() != Some(')') {
            return Err(ParseError::MissingClosingParen { pos: self.pos });
        }
        self.pos += 1;
        Ok(node)
    }
}

/// Parse an expression string into an AST.
pub fn parse(input: &str) -> Result<ExprNode, ParseError> {
    let chars: Vec<char> = input.chars().filter(|c| !c.is_whitespace()).collect();
    if chars.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut p = Parser { chars, pos: 0 };
    let node = p.parse_token()?;
    if p.pos != p.chars.len() {
        return Err(ParseError::TrailingInput {
            pos: p.pos,
            rest: p.chars[p.pos..].iter().collect(),
        });
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leaf_operand() {
        assert_eq!(parse("%I0.0").unwrap(), ExprNode::var("%I0.0"));
    }

    #[test]
    fn test_parse_bare_name_is_variable() {
        assert_eq!(parse("RUN").unwrap(), ExprNode::var("RUN"));
    }

    #[test]
    fn test_parse_nested() {
        let ast = parse("OR(AND(%I0.0, NOT(%I0.1)), %Q0.2)").unwrap();
        match &ast {
            ExprNode::Op { name, args } => {
                assert_eq!(name, "OR");
                assert_eq!(args.len(), 2);
                assert_eq!(
                    args[0],
                    ExprNode::and(vec![
                        ExprNode::var("%I0.0"),
                        ExprNode::not(ExprNode::var("%I0.1")),
                    ])
                );
                assert_eq!(args[1], ExprNode::var("%Q0.2"));
            },
            other => panic!("expected OR node, got {:?}", other),
        }
    }

    #[test]
    fn test_operator_names_case_insensitive() {
        assert_eq!(
            parse("and(%I0.0, %I0.1)").unwrap(),
            parse("AND(%I0.0, %I0.1)").unwrap()
        );
    }

    #[test]
    fn test_redundant_parentheses() {
        assert_eq!(parse("(%I0.0)").unwrap(), ExprNode::var("%I0.0"));
    }

    #[test]
    fn test_missing_close_paren() {
        let err = parse("AND(%I0.0").unwrap_err();
        assert_eq!(err, ParseError::ExpectedSeparator { pos: 9 });
    }

    #[test]
    fn test_unclosed_after_operator() {
        assert_eq!(
            parse("AND(").unwrap_err(),
            ParseError::UnclosedGroup { op: "AND".to_string() }
        );
    }

    #[test]
    fn test_unexpected_character() {
        assert_eq!(
            parse("AND(#, %I0.0)").unwrap_err(),
            ParseError::UnexpectedChar { ch: '#', pos: 4 }
        );
    }

    #[test]
    fn test_trailing_input() {
        assert!(matches!(
            parse("%I0.0)").unwrap_err(),
            ParseError::TrailingInput { pos: 5, .. }
        ));
    }

    #[test]
    fn test_not_arity() {
        assert_eq!(
            parse("NOT(%I0.0, %I0.1)").unwrap_err(),
            ParseError::NotArity { found: 2 }
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse("   ").unwrap_err(), ParseError::Empty);
    }

    #[test]
    fn test_group_missing_close() {
        assert_eq!(
            parse("(%I0.0").unwrap_err(),
            ParseError::MissingClosingParen { pos: 6 }
        );
    }
}
