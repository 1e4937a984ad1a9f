/*
 * lexdfa: lexical grammars to minimized DFA tables
 * Copyright (C) 2021  Xie Ruifeng
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

//! Loosely-typed expression trees, as handed over by grammar front ends.

use std::convert::{TryFrom, TryInto};

use super::Expr;
use crate::error::{Error, Result};

/// An untyped expression node: a kind tag, an optional text payload, and children.
///
/// Recognized kinds are `literal` (text, no children), `sequence` and
/// `alternation` (any number of children), and `optional`, `zero_or_more`,
/// `one_or_more` (exactly one child).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node {
    /// The node kind.
    pub kind: String,
    /// Text payload, for literals.
    pub text: Option<String>,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Node {
    /// A leaf node with a text payload.
    pub fn leaf(kind: &str, text: &str) -> Self {
        Node { kind: kind.to_string(), text: Some(text.to_string()), children: Vec::new() }
    }

    /// An inner node with children.
    pub fn branch(kind: &str, children: Vec<Node>) -> Self {
        Node { kind: kind.to_string(), text: None, children }
    }

    fn malformed<T>(&self, reason: &str) -> Result<T> {
        Err(Error::MalformedExpressionNode {
            kind: self.kind.clone(),
            reason: reason.to_string(),
        })
    }

    fn into_children(self) -> Result<Vec<Expr>> {
        if self.text.is_some() {
            return self.malformed("unexpected text payload");
        }
        self.children.into_iter().map(TryInto::try_into).collect()
    }

    fn into_only_child(self) -> Result<Box<Expr>> {
        if self.children.len() != 1 {
            let reason = format!("expected exactly 1 child, found {}", self.children.len());
            return self.malformed(&reason);
        }
        let mut children = self.into_children()?;
        Ok(Box::new(children.remove(0)))
    }
}

impl TryFrom<Node> for Expr {
    type Error = Error;
    fn try_from(node: Node) -> Result<Self> {
        match node.kind.as_str() {
            "literal" => {
                if !node.children.is_empty() {
                    return node.malformed("a literal has no children");
                }
                if node.text.is_none() {
                    return node.malformed("missing text payload");
                }
                Ok(Expr::Literal(node.text.unwrap_or_default()))
            }
            "sequence" => node.into_children().map(Expr::Sequence),
            "alternation" if node.children.is_empty() =>
                node.malformed("an alternation needs at least 1 alternative"),
            "alternation" => node.into_children().map(Expr::Alternation),
            "optional" => node.into_only_child().map(Expr::Optional),
            "zero_or_more" => node.into_only_child().map(Expr::ZeroOrMore),
            "one_or_more" => node.into_only_child().map(Expr::OneOrMore),
            _ => Err(Error::UnknownExpressionNode { kind: node.kind }),
        }
    }
}
