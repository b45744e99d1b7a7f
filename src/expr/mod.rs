//! Boolean expression trees and their textual interchange form.
//!
//! Internally every expression is an [`ExprNode`]; the `AND(a, b)` /
//! `OR(a, b)` / `NOT(a)` string form exists only at interchange
//! boundaries (persisted artifacts, readable renderings) and is produced
//! or parsed exactly once per crossing.

pub mod parser;
pub mod python;

pub use parser::{parse, ParseError};
pub use python::{sanitize_identifier, to_python, ConvertedExpression};

use std::fmt;

/// A node of a parsed boolean expression.
///
/// Operator names are stored uppercase. `NOT` nodes carry exactly one
/// argument (enforced by the parser); operator names outside
/// `{AND, OR, NOT}` survive until evaluable emission, where they fail
/// that single expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprNode {
    /// A leaf operand reference, e.g. `%I0.0`.
    Var(String),
    /// An operator application.
    Op {
        /// Uppercase operator name.
        name: String,
        /// Operator arguments, in source order.
        args: Vec<ExprNode>,
    },
}

impl ExprNode {
    /// Leaf variable node.
    pub fn var(name: impl Into<String>) -> Self {
        ExprNode::Var(name.into())
    }

    /// `NOT(arg)` node.
    pub fn not(arg: ExprNode) -> Self {
        ExprNode::Op {
            name: "NOT".to_string(),
            args: vec![arg],
        }
    }

    /// `AND(args...)` node.
    pub fn and(args: Vec<ExprNode>) -> Self {
        ExprNode::Op {
            name: "AND".to_string(),
            args,
        }
    }

    /// `OR(args...)` node.
    pub fn or(args: Vec<ExprNode>) -> Self {
        ExprNode::Op {
            name: "OR".to_string(),
            args,
        }
    }
}

impl fmt::Display for ExprNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprNode::Var(name) => write!(f, "{}", name),
            ExprNode::Op { name, args } => {
                write!(f, "{}(", name)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ")")
            },
        }
    }
}

/// Serde adapter mapping `Option<ExprNode>` to its canonical string form
/// (empty string for `None`).
///
/// Used on [`crate::extract::Block::expression`] so persisted artifacts
/// carry the interchange string while the in-memory value stays an AST.
pub mod expr_string {
    use super::ExprNode;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize an optional expression as its canonical string.
    pub fn serialize<S>(value: &Option<ExprNode>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(node) => serializer.serialize_str(&node.to_string()),
            None => serializer.serialize_str(""),
        }
    }

    /// Parse an expression string back into an AST (empty ⇒ `None`).
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<ExprNode>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        super::parse(trimmed)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}
