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

//! States, input symbols, and the state allocator.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use derivative::Derivative;

use crate::utils::inc;

/// State identity, unique within one allocator.
#[derive(Derivative)]
#[derivative(Debug = "transparent")]
#[derive(Copy, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct StateId(u32);

impl StateId {
    /// The raw identifier.
    pub fn unwrap(self) -> u32 { self.0 }
}

/// What an accepting state completes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Accept {
    /// The lexer production recognized.
    pub token: Arc<str>,
    /// Declaration rank of the production, lower wins.
    pub priority: u32,
}

impl Accept {
    /// Create a new acceptance tag.
    pub fn new(token: &Arc<str>, priority: u32) -> Self {
        Accept { token: token.clone(), priority }
    }
}

/// An automaton state.
///
/// States are compared by identity only: two distinct states are never equal,
/// whatever their acceptance tags.
#[derive(Clone, Debug)]
#[derive(Derivative)]
#[derivative(Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct State {
    id: StateId,
    #[derivative(Ord = "ignore")]
    #[derivative(PartialOrd = "ignore")]
    #[derivative(PartialEq = "ignore")]
    #[derivative(Hash = "ignore")]
    accept: Option<Accept>,
}

impl State {
    /// Identity of this state.
    pub fn id(&self) -> StateId { self.id }

    /// The acceptance tag, if this state accepts.
    pub fn accept(&self) -> Option<&Accept> { self.accept.as_ref() }

    /// Whether this state accepts.
    pub fn is_accepting(&self) -> bool { self.accept.is_some() }

    /// The token completed by this state, if any.
    pub fn token(&self) -> Option<&str> {
        self.accept.as_ref().map(|a| &*a.token)
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "q{}", self.id.0)?;
        if let Some(a) = &self.accept {
            write!(f, "[{}]", a.token)?;
        }
        Ok(())
    }
}

/// Input symbol on a transition.
#[derive(Debug, Copy, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub enum Symbol {
    /// The empty move, distinct from every character.
    Epsilon,
    /// A single input character.
    Char(char),
}

impl Symbol {
    /// The character consumed, `None` for epsilon.
    pub fn char(self) -> Option<char> {
        match self {
            Symbol::Epsilon => None,
            Symbol::Char(c) => Some(c),
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Epsilon => write!(f, "ε"),
            Symbol::Char(c) => write!(f, "{}", c.escape_debug()),
        }
    }
}

/// Issues fresh states. Each compilation owns exactly one allocator.
#[derive(Debug, Default)]
pub struct Allocator {
    next_available_state: u32,
}

impl Allocator {
    /// Create a new allocator, starting from state `0`.
    pub fn new() -> Self { Self::default() }

    /// A fresh state, with an optional acceptance tag.
    pub fn new_state(&mut self, accept: Option<Accept>) -> State {
        State { id: StateId(inc(&mut self.next_available_state)), accept }
    }

    /// A fresh plain (non-accepting) state.
    pub fn state(&mut self) -> State {
        self.new_state(None)
    }

    /// A fresh accepting state.
    pub fn accepting(&mut self, accept: Accept) -> State {
        self.new_state(Some(accept))
    }

    /// How many states have been issued so far.
    pub fn issued(&self) -> u32 {
        self.next_available_state
    }
}
