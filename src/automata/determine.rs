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

//! Subset construction: NFA to DFA.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::rc::Rc;

use super::{Accept, Allocator, Dfa, Nfa, State, Symbol};
use super::validity::check_dfa;
use crate::error::Result;

type NFAStateSet = BTreeSet<State>;

/// The acceptance tag of a subset: the accepting member of the earliest
/// declared production, first found on ties.
fn subset_accept(s: &NFAStateSet) -> Option<Accept> {
    s.iter()
        .filter_map(State::accept)
        .min_by_key(|a| a.priority)
        .cloned()
}

#[derive(Default)]
struct StateCollector {
    states: BTreeMap<Rc<NFAStateSet>, State>,
    states_to_process: VecDeque<Rc<NFAStateSet>>,
}

impl StateCollector {
    fn add_or_get_state_set(&mut self, allocator: &mut Allocator, s: NFAStateSet) -> State {
        if let Some(n) = self.states.get(&s) {
            return n.clone();
        }
        let n = allocator.new_state(subset_accept(&s));
        let s = Rc::new(s);
        self.states.insert(s.clone(), n.clone());
        self.states_to_process.push_back(s);
        n
    }
}

struct Determiner<'a> {
    nfa: &'a Nfa,
    input_set: Box<[char]>,
}

impl<'a> Determiner<'a> {
    fn new(nfa: &'a Nfa) -> Self {
        Determiner {
            nfa,
            input_set: nfa.alphabet().into_iter().collect(),
        }
    }

    fn transitioned(&self, s: &NFAStateSet, c: char) -> NFAStateSet {
        s.iter()
            .flat_map(|x| self.nfa.targets(x, Symbol::Char(c)))
            .cloned()
            .collect()
    }

    fn determine(&self, allocator: &mut Allocator) -> Dfa {
        let mut states = StateCollector::default();
        let start = std::iter::once(self.nfa.start().clone()).collect();
        let start = states.add_or_get_state_set(allocator, start);
        let mut dfa = Dfa::new(start);
        while let Some(s) = states.states_to_process.pop_front() {
            let ns = states.states[&s].clone();
            dfa.add_state(ns.clone());
            for &c in self.input_set.iter() {
                let t = self.transitioned(&s, c);
                if !t.is_empty() {
                    let nt = states.add_or_get_state_set(allocator, t);
                    let old = dfa.set_transition(&ns, Symbol::Char(c), &nt);
                    assert!(old.is_none(), "transition {}({} -> _) set twice.", c.escape_debug(), ns);
                }
            }
        }
        dfa
    }
}

/// Convert an epsilon-free NFA into a DFA.
pub fn determine(allocator: &mut Allocator, nfa: &Nfa) -> Result<Dfa> {
    let dfa = Determiner::new(nfa).determine(allocator);
    trace!(pipeline, "DFA: {} states, {} transitions",
           dfa.states().len(), dfa.transition_count());
    check_dfa(&dfa)?;
    Ok(dfa)
}
