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

//! Regular expressions over literals, and their reference semantics.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Regular expression operators of a lexer production body.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expr {
    /// `"abc"`, matches exactly this string.
    Literal(String),
    /// `a, b, c`
    Sequence(Vec<Expr>),
    /// `a | b | c`
    Alternation(Vec<Expr>),
    /// `[a]`, zero or one.
    Optional(Box<Expr>),
    /// `{a}`, zero or more.
    ZeroOrMore(Box<Expr>),
    /// `{a}+`, one or more.
    OneOrMore(Box<Expr>),
}

impl Expr {
    #[allow(missing_docs)]
    pub fn literal(s: &str) -> Self { Expr::Literal(s.to_string()) }
    #[allow(missing_docs)]
    pub fn concat(rs: Vec<Expr>) -> Self { Expr::Sequence(rs) }
    #[allow(missing_docs)]
    pub fn alt(rs: Vec<Expr>) -> Self { Expr::Alternation(rs) }
    #[allow(missing_docs)]
    pub fn optional(r: Expr) -> Self { Expr::Optional(Box::new(r)) }
    #[allow(missing_docs)]
    pub fn many(r: Expr) -> Self { Expr::ZeroOrMore(Box::new(r)) }
    #[allow(missing_docs)]
    pub fn some(r: Expr) -> Self { Expr::OneOrMore(Box::new(r)) }

    /// Whether `input` as a whole is in the language of this expression.
    ///
    /// This is the compositional reference semantics, computed directly on
    /// the expression tree without any automaton. It is slow, and serves as
    /// an oracle for the automaton pipeline.
    ///
    /// ```
    /// # use lexdfa::grammar::Expr;
    /// let e = Expr::concat(vec![Expr::literal("a"), Expr::many(Expr::literal("b"))]);
    /// assert!(e.matches("abbb"));
    /// assert!(!e.matches("ba"));
    /// ```
    pub fn matches(&self, input: &str) -> bool {
        let chars = input.chars().collect::<Vec<_>>();
        let start = std::iter::once(0).collect();
        self.match_ends(&chars, &start).contains(&chars.len())
    }

    /// All positions where a match starting at one of `starts` may end.
    fn match_ends(&self, input: &[char], starts: &BTreeSet<usize>) -> BTreeSet<usize> {
        match self {
            Expr::Literal(s) => {
                let s = s.chars().collect::<Vec<_>>();
                starts.iter().copied()
                    .filter(|&p| input[p..].starts_with(&s))
                    .map(|p| p + s.len())
                    .collect()
            }
            Expr::Sequence(rs) => rs.iter()
                .fold(starts.clone(), |ps, r| r.match_ends(input, &ps)),
            Expr::Alternation(rs) => rs.iter()
                .flat_map(|r| r.match_ends(input, starts))
                .collect(),
            Expr::Optional(r) => {
                let mut res = r.match_ends(input, starts);
                res.extend(starts.iter().copied());
                res
            }
            Expr::ZeroOrMore(r) => r.closure(input, starts.clone()),
            Expr::OneOrMore(r) => {
                let once = r.match_ends(input, starts);
                r.closure(input, once)
            }
        }
    }

    /// Positions reachable from `res` by zero or more matches of `self`.
    fn closure(&self, input: &[char], mut res: BTreeSet<usize>) -> BTreeSet<usize> {
        let mut frontier = res.clone();
        while !frontier.is_empty() {
            frontier = self.match_ends(input, &frontier)
                .into_iter()
                .filter(|p| !res.contains(p))
                .collect();
            res.extend(frontier.iter().copied());
        }
        res
    }
}

/// Pretty printing with a precedence context.
pub trait Pretty {
    /// Extra context needed for printing.
    type Context;
    /// Format `self` in the given context.
    fn pretty_fmt(&self, f: &mut Formatter<'_>, context: Self::Context) -> std::fmt::Result;
}

impl<P: Pretty> Pretty for &P {
    type Context = P::Context;
    fn pretty_fmt(&self, f: &mut Formatter<'_>, context: Self::Context) -> std::fmt::Result {
        P::pretty_fmt(self, f, context)
    }
}

impl<P: Pretty> Pretty for Box<P> {
    type Context = P::Context;
    fn pretty_fmt(&self, f: &mut Formatter<'_>, context: Self::Context) -> std::fmt::Result {
        P::pretty_fmt(self, f, context)
    }
}

fn sep_by<I>(f: &mut Formatter<'_>, mut xs: I,
             (k, sep, empty): (usize, &str, &str), n: usize) -> std::fmt::Result
    where I: Iterator, I::Item: Pretty<Context=usize> {
    if let Some(x) = xs.next() {
        if k < n { write!(f, "(")?; }
        x.pretty_fmt(f, k)?;
        for x in xs {
            write!(f, "{}", sep)?;
            x.pretty_fmt(f, k)?;
        }
        if k < n { write!(f, ")")?; }
        Ok(())
    } else {
        write!(f, "{}", empty)
    }
}

fn bracket(f: &mut Formatter<'_>, x: impl Pretty<Context=usize>,
           (open, close): (&str, &str)) -> std::fmt::Result {
    write!(f, "{}", open)?;
    x.pretty_fmt(f, 0)?;
    write!(f, "{}", close)
}

impl Pretty for Expr {
    type Context = usize;
    fn pretty_fmt(&self, f: &mut Formatter<'_>, n: usize) -> std::fmt::Result {
        match self {
            Expr::Literal(s) => write!(f, "\"{}\"", s.escape_debug()),
            Expr::Alternation(rs) => sep_by(f, rs.iter(), (0, " | ", "()"), n),
            Expr::Sequence(rs) => sep_by(f, rs.iter(), (1, ", ", "\"\""), n),
            Expr::Optional(r) => bracket(f, r, ("[", "]")),
            Expr::ZeroOrMore(r) => bracket(f, r, ("{", "}")),
            Expr::OneOrMore(r) => bracket(f, r, ("{", "}+")),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.pretty_fmt(f, 0)
    }
}
