//! Evaluable (Python) emission of expression trees.
//!
//! The downstream coil-binding collaborator consumes a boolean Python
//! expression per network. Emission sanitizes operand names into valid
//! identifiers and rejects operators outside `{AND, OR, NOT}`; the
//! rejection is fatal for that single expression only.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{parse, ExprNode, ParseError};
use crate::error::{Error, Result};

lazy_static! {
    static ref NON_IDENT: Regex = Regex::new(r"[^0-9A-Za-z_]").unwrap();
    static ref LEADING_DIGIT: Regex = Regex::new(r"^\d").unwrap();
}

/// Turn an operand reference into a valid identifier.
///
/// Strips a leading `%`, maps `.` (and any other non-identifier
/// character) to `_`, and prefixes `v_` when the result would start
/// with a digit: `%I8.7` → `I8_7`, `3X` → `v_3X`.
pub fn sanitize_identifier(raw: &str) -> String {
    let s = raw.trim();
    let s = s.strip_prefix('%').unwrap_or(s);
    let s = s.replace('.', "_");
    let s = NON_IDENT.replace_all(&s, "_").into_owned();
    if LEADING_DIGIT.is_match(&s) {
        format!("v_{}", s)
    } else {
        s
    }
}

/// Render an AST as a parenthesized Python boolean expression.
pub fn to_python(node: &ExprNode) -> Result<String> {
    match node {
        ExprNode::Var(name) => Ok(sanitize_identifier(name)),
        ExprNode::Op { name, args } => match name.as_str() {
            "NOT" => {
                if args.len() != 1 {
                    return Err(Error::Expression(ParseError::NotArity { found: args.len() }));
                }
                Ok(format!("(not {})", to_python(&args[0])?))
            },
            "AND" => join_args(args, " and "),
            "OR" => join_args(args, " or "),
            other => Err(Error::UnknownOperator(other.to_string())),
        },
    }
}

fn join_args(args: &[ExprNode], sep: &str) -> Result<String> {
    let parts: Vec<String> = args.iter().map(to_python).collect::<Result<_>>()?;
    Ok(format!("({})", parts.join(sep)))
}

/// Terminal artifact of expression conversion.
///
/// Either outcome is valid output: a conversion failure is recorded next
/// to the original string instead of crashing the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertedExpression {
    /// The expression exactly as composed by the grouping engine.
    pub original_expression: String,

    /// Evaluable Python form, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python_expression: Option<String>,

    /// Failure description, present when parsing or emission failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConvertedExpression {
    /// Parse and convert an interchange string.
    pub fn convert(original: &str) -> Self {
        match parse(original).map_err(Error::from).and_then(|ast| to_python(&ast)) {
            Ok(py) => Self {
                original_expression: original.to_string(),
                python_expression: Some(py),
                error: None,
            },
            Err(e) => Self {
                original_expression: original.to_string(),
                python_expression: None,
                error: Some(e.to_string()),
            },
        }
    }

    /// Convert an already-built AST.
    pub fn from_node(node: &ExprNode) -> Self {
        match to_python(node) {
            Ok(py) => Self {
                original_expression: node.to_string(),
                python_expression: Some(py),
                error: None,
            },
            Err(e) => Self {
                original_expression: node.to_string(),
                python_expression: None,
                error: Some(e.to_string()),
            },
        }
    }

    /// Whether conversion succeeded.
    pub fn is_ok(&self) -> bool {
        self.python_expression.is_some()
    }
}
