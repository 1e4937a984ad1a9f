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

//! Epsilon elimination: epsilon-NFA to NFA.
//!
//! Every state is merged with its epsilon-closure into one fresh state. The
//! acceptance tag of a merged state comes from the first accepting member of
//! the closure, in ascending state order, and is not priority-aware: tokens
//! are only ranked during subset construction.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::{Allocator, Nfa, State, Symbol};
use super::validity::check_nfa;
use crate::error::Result;

type StateSet = BTreeSet<State>;

/// Memoized epsilon-closures of every state of an automaton.
pub struct Closures<'a> {
    nfa: &'a Nfa,
    closures: BTreeMap<State, StateSet>,
}

impl<'a> Closures<'a> {
    /// Compute the closure of every state in `nfa`.
    pub fn new(nfa: &'a Nfa) -> Self {
        let mut res = Closures { nfa, closures: BTreeMap::new() };
        for s in nfa.states() {
            let c = res.epsilon_closure(s);
            res.closures.insert(s.clone(), c);
        }
        res
    }

    fn epsilon_closure(&self, x: &State) -> StateSet {
        let mut to_insert = VecDeque::new();
        to_insert.push_back(x);
        let mut res = StateSet::new();
        while let Some(x) = to_insert.pop_front() {
            if let Some(known) = self.closures.get(x) {
                res.extend(known.iter().cloned());
            } else if res.insert(x.clone()) {
                for y in self.nfa.targets(x, Symbol::Epsilon) {
                    to_insert.push_front(y);
                }
            }
        }
        res
    }

    /// The epsilon-closure of `s`, including `s` itself.
    pub fn of(&self, s: &State) -> &StateSet {
        &self.closures[s]
    }
}

/// Remove every epsilon transition of `enfa`.
pub fn eliminate(allocator: &mut Allocator, enfa: &Nfa) -> Result<Nfa> {
    let closures = Closures::new(enfa);
    let merged = enfa.states().iter()
        .map(|s| {
            let accept = closures.of(s).iter()
                .find_map(State::accept)
                .cloned();
            (s, allocator.new_state(accept))
        })
        .collect::<BTreeMap<&State, State>>();
    let mut nfa = Nfa::new(merged[enfa.start()].clone());
    for (&s, from) in &merged {
        nfa.add_state(from.clone());
        for cs in closures.of(s) {
            let outgoing = enfa.neighbors(cs).into_iter()
                .flat_map(|m| m.iter())
                .filter(|(a, _)| **a != Symbol::Epsilon);
            for (&a, ts) in outgoing {
                for t in ts {
                    nfa.add_transition(from, a, &merged[t]);
                }
            }
        }
    }
    nfa.prune_unreachable();
    trace!(pipeline, "NFA: {} states, {} transitions",
           nfa.states().len(), nfa.transition_count());
    check_nfa(&nfa)?;
    Ok(nfa)
}
