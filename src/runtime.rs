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

//! Table-driven tokenizer.
//!
//! Tokens are matched greedily: the tokenizer follows the table until no edge
//! is left for the next character, then emits the token of the state it
//! stopped in. It never backtracks to an earlier accepting state.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use thiserror::Error;

use crate::error::Error;
use crate::table::Table;

/// Errors raised while tokenizing.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Error)]
pub enum LexError {
    /// No edge for the next character, and the current state does not accept.
    #[error("lexical error at byte {index}")]
    LexicalError {
        /// Byte offset of the offending character, or the input length at end of input.
        index: usize,
    },
    /// A token was accepted without consuming any character.
    #[error("empty token match at byte {index}")]
    EmptyTokenMatch {
        /// Byte offset of the token boundary.
        index: usize,
    },
}

/// Source location.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Location {
    /// line number, starting from 1.
    pub line: usize,
    /// column number, starting from 1.
    pub column: usize,
    /// byte offset into the input, starting from 0.
    pub offset: usize,
}

impl Default for Location {
    fn default() -> Self { Location { line: 1, column: 1, offset: 0 } }
}

impl Location {
    /// Create a new location, the same as `Location::default()`.
    pub fn new() -> Self { Self::default() }

    /// Step over one character.
    pub fn step(&mut self, c: char) {
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open source range: a pair of `Location`s.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Range {
    /// Where the range begins (inclusive).
    pub begin: Location,
    /// Where the range ends (non-inclusive).
    pub end: Location,
}

/// A recognized token.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Token<'a> {
    /// Name of the production.
    pub name: Arc<str>,
    /// Index of the production in the sorted token-name list.
    pub index: usize,
    /// The matched text.
    pub text: &'a str,
    /// Where the text is in the input.
    pub range: Range,
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?} @{}-{}", self.name, self.text, self.range.begin, self.range.end)
    }
}

/// Splits an input into tokens, dropping skippable ones.
pub struct Tokenizer<'a> {
    table: &'a Table,
    token_names: &'a [Arc<str>],
    input: &'a str,
    location: Location,
    failed: bool,
}

impl<'a> Tokenizer<'a> {
    /// Tokenize `input` with a table and its sorted token-name list.
    pub fn new(table: &'a Table, token_names: &'a [Arc<str>], input: &'a str)
               -> crate::error::Result<Self> {
        let bad = (0..table.state_count())
            .filter_map(|s| table.token_index(s))
            .find(|&t| t >= token_names.len());
        if let Some(t) = bad {
            return Err(Error::MalformedTable {
                reason: format!("token index {} out of range for {} token(s)", t, token_names.len()),
            });
        }
        Ok(Self::new_unchecked(table, token_names, input))
    }

    pub(crate) fn new_unchecked(table: &'a Table, token_names: &'a [Arc<str>], input: &'a str) -> Self {
        Tokenizer { table, token_names, input, location: Location::new(), failed: false }
    }

    /// Where the next token begins.
    pub fn location(&self) -> Location { self.location }

    fn next_token(&mut self) -> Result<Option<Token<'a>>, LexError> {
        loop {
            let begin = self.location;
            let rest = &self.input[begin.offset..];
            if rest.is_empty() { return Ok(None); }
            let mut state = 0;
            let mut end = begin;
            for c in rest.chars() {
                match self.table.transition(state, c) {
                    Some(t) => {
                        state = t;
                        end.step(c);
                    }
                    None => break,
                }
            }
            let index = self.table.token_index(state)
                .ok_or(LexError::LexicalError { index: end.offset })?;
            if end.offset == begin.offset {
                return Err(LexError::EmptyTokenMatch { index: begin.offset });
            }
            self.location = end;
            let name = &self.token_names[index];
            let text = &self.input[begin.offset..end.offset];
            if self.table.is_skippable(state) {
                trace!(tokenizer, "skipped {} {:?} at {}", name, text, begin);
                continue;
            }
            trace!(tokenizer, "{} {:?} at {}", name, text, begin);
            let range = Range { begin, end };
            return Ok(Some(Token { name: name.clone(), index, text, range }));
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed { return None; }
        let res = self.next_token();
        self.failed = res.is_err();
        res.transpose()
    }
}
