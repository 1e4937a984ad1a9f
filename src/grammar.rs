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

//! Lexical grammars: ordered lists of named regular productions.

pub mod expr;
pub mod node;

pub use expr::Expr;
pub use node::Node;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::error::{Error, Result};

/// A lexer production `name = expr ;`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Production {
    /// The token name.
    pub name: Arc<str>,
    /// The regular expression body.
    pub expr: Expr,
    /// Tokens of this production are recognized but discarded (e.g. whitespace).
    pub skippable: bool,
}

impl Production {
    /// Create a new (non-skippable) production.
    pub fn new(name: &str, expr: Expr) -> Self {
        Production { name: Arc::from(name), expr, skippable: false }
    }

    /// Mark this production as skippable.
    pub fn skipped(mut self) -> Self {
        self.skippable = true;
        self
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {} ;", self.name, self.expr)
    }
}

/// Token priorities: 1-based declaration rank, lower numbers win.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PriorityMap(BTreeMap<Arc<str>, u32>);

impl PriorityMap {
    /// Priority of a token, `None` for unknown tokens.
    pub fn get(&self, token: &str) -> Option<u32> {
        self.0.get(token).copied()
    }

    /// Number of ranked tokens.
    pub fn len(&self) -> usize { self.0.len() }

    /// Whether no token is ranked.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

/// An ordered list of lexer productions, with unique names.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Grammar {
    productions: Vec<Production>,
}

impl Grammar {
    /// Create a grammar, rejecting duplicated production names.
    pub fn new(productions: Vec<Production>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for p in &productions {
            if !seen.insert(p.name.clone()) {
                return Err(Error::DuplicateProduction { name: p.name.to_string() });
            }
        }
        Ok(Grammar { productions })
    }

    /// Productions, in declaration order.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// The priority map derived from declaration order.
    pub fn priorities(&self) -> PriorityMap {
        PriorityMap(self.productions.iter()
            .zip(1..)
            .map(|(p, rank)| (p.name.clone(), rank))
            .collect())
    }

    /// Token names, sorted lexicographically: the token table for serialization.
    pub fn token_names(&self) -> Vec<Arc<str>> {
        let mut names = self.productions.iter()
            .map(|p| p.name.clone())
            .collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    /// Names of the skippable productions.
    pub fn skippable_tokens(&self) -> BTreeSet<Arc<str>> {
        self.productions.iter()
            .filter(|p| p.skippable)
            .map(|p| p.name.clone())
            .collect()
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for p in &self.productions {
            writeln!(f, "{}", p)?;
        }
        Ok(())
    }
}
