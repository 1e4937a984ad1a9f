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

//! Thompson construction: lexer productions to an epsilon-NFA.

use super::{Accept, Allocator, Nfa, State, Symbol};
use super::validity::check_epsilon_nfa;
use crate::error::{Error, Result};
use crate::grammar::{Expr, PriorityMap, Production};

/// Builds expression fragments between given entry and exit states.
pub struct Builder<'a> {
    allocator: &'a mut Allocator,
    nfa: Nfa,
}

impl<'a> Builder<'a> {
    /// A builder whose automaton has only a fresh start state.
    pub fn new(allocator: &'a mut Allocator) -> Self {
        let start = allocator.state();
        Builder { allocator, nfa: Nfa::new(start) }
    }

    /// The global start state.
    pub fn start(&self) -> State {
        self.nfa.start().clone()
    }

    fn new_arc(&mut self, s: &State, a: Symbol, t: &State) {
        assert!(self.nfa.add_transition(s, a, t), "transition {}({} -> {}) already exists.", a, s, t)
    }

    fn epsilon(&mut self, s: &State, t: &State) {
        self.new_arc(s, Symbol::Epsilon, t)
    }

    /// Build `r` between fresh states `a` and `b`, wired as `s -> a`, `b -> t`.
    fn wrapped(&mut self, r: &Expr, s: &State, t: &State) -> (State, State) {
        let a = self.allocator.state();
        let b = self.allocator.state();
        self.epsilon(s, &a);
        self.build(r, &a, &b);
        self.epsilon(&b, t);
        (a, b)
    }

    /// Add the fragment for `expr`, running from `s` to `e`.
    pub fn build(&mut self, expr: &Expr, s: &State, e: &State) {
        match expr {
            Expr::Literal(text) => {
                let mut last = self.allocator.state();
                self.epsilon(s, &last);
                for c in text.chars() {
                    let next = self.allocator.state();
                    self.new_arc(&last, Symbol::Char(c), &next);
                    last = next;
                }
                self.epsilon(&last, e);
            }
            Expr::Sequence(rs) => match rs.split_last() {
                None => self.epsilon(s, e),
                Some((r, init)) => {
                    let mut last = s.clone();
                    for x in init {
                        let next = self.allocator.state();
                        self.build(x, &last, &next);
                        last = next;
                    }
                    self.build(r, &last, e);
                }
            }
            Expr::Alternation(rs) => for r in rs {
                self.wrapped(r, s, e);
            }
            Expr::Optional(r) => {
                self.epsilon(s, e);
                self.wrapped(r, s, e);
            }
            Expr::ZeroOrMore(r) => {
                self.epsilon(s, e);
                let (a, b) = self.wrapped(r, s, e);
                self.epsilon(&b, &a);
            }
            Expr::OneOrMore(r) => {
                let (a, b) = self.wrapped(r, s, e);
                self.epsilon(&b, &a);
            }
        }
    }

    /// Add a production: a private entry from the global start, and an
    /// accepting exit tagged with the production.
    pub fn production(&mut self, p: &Production, priority: u32) -> State {
        let start = self.start();
        let entry = self.allocator.state();
        let exit = self.allocator.accepting(Accept::new(&p.name, priority));
        // carried even if the body never reaches it, so the checker sees a dead production
        self.nfa.add_state(exit.clone());
        self.epsilon(&start, &entry);
        self.build(&p.expr, &entry, &exit);
        exit
    }

    /// The epsilon-NFA built so far.
    pub fn finish(self) -> Nfa {
        self.nfa
    }
}

/// Build the epsilon-NFA of a list of productions.
pub fn construct(allocator: &mut Allocator, productions: &[Production],
                 priorities: &PriorityMap) -> Result<Nfa> {
    let mut builder = Builder::new(allocator);
    for p in productions {
        let priority = priorities.get(&p.name)
            .ok_or_else(|| Error::UnknownToken { name: p.name.to_string() })?;
        builder.production(p, priority);
    }
    let nfa = builder.finish();
    trace!(pipeline, "epsilon-NFA: {} states, {} transitions",
           nfa.states().len(), nfa.transition_count());
    check_epsilon_nfa(&nfa)?;
    Ok(nfa)
}
