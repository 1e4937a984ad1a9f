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

//! Finite automata, and the stages converting one form into another.
//!
//! One representation serves every stage: [`Automaton<T>`] maps each state
//! and input symbol to `T`, either a set of states ([`Nfa`], also used for
//! epsilon-NFAs) or a single state ([`Dfa`]). Stages never mutate their input;
//! each one allocates fresh states from the [`Allocator`] it is handed.

pub mod state;
pub mod thompson;
pub mod epsilon;
pub mod determine;
pub mod minimize;
pub mod validity;

pub use state::{Accept, Allocator, State, StateId, Symbol};

use std::collections::{BTreeMap, BTreeSet, VecDeque, btree_set};
use std::iter::Once;

use either::Either;

/// Targets of the transitions on one `(state, symbol)` pair.
pub trait Targets {
    /// Iterate through the target states.
    fn targets(&self) -> Either<Once<&State>, btree_set::Iter<'_, State>>;
}

impl Targets for State {
    fn targets(&self) -> Either<Once<&State>, btree_set::Iter<'_, State>> {
        Either::Left(std::iter::once(self))
    }
}

impl Targets for BTreeSet<State> {
    fn targets(&self) -> Either<Once<&State>, btree_set::Iter<'_, State>> {
        Either::Right(self.iter())
    }
}

/// A finite automaton.
#[derive(Clone, Debug)]
pub struct Automaton<T> {
    start: State,
    states: BTreeSet<State>,
    neighbors: BTreeMap<State, BTreeMap<Symbol, T>>,
}

/// Nondeterministic automata, with or without epsilon transitions.
pub type Nfa = Automaton<BTreeSet<State>>;

/// Deterministic automata.
pub type Dfa = Automaton<State>;

impl<T: Targets> Automaton<T> {
    /// An automaton with only the start state.
    pub fn new(start: State) -> Self {
        Automaton {
            states: std::iter::once(start.clone()).collect(),
            start,
            neighbors: BTreeMap::new(),
        }
    }

    /// The start state.
    pub fn start(&self) -> &State { &self.start }

    /// All states carried by this automaton.
    pub fn states(&self) -> &BTreeSet<State> { &self.states }

    /// Outgoing transitions of a state, `None` if it has none.
    pub fn neighbors(&self, s: &State) -> Option<&BTreeMap<Symbol, T>> {
        self.neighbors.get(s)
    }

    /// Targets of the transitions from `s` on `a`.
    pub fn targets(&self, s: &State, a: Symbol) -> impl Iterator<Item=&State> + '_ {
        self.neighbors.get(s)
            .and_then(|m| m.get(&a))
            .into_iter()
            .flat_map(Targets::targets)
    }

    /// Add a state without any transition.
    pub fn add_state(&mut self, s: State) -> bool {
        self.states.insert(s)
    }

    /// All transitions, as `(departure, input, destination)` triples.
    pub fn transitions(&self) -> impl Iterator<Item=(&State, Symbol, &State)> + '_ {
        self.neighbors.iter().flat_map(|(s, m)| m.iter()
            .flat_map(move |(&a, t)| t.targets().map(move |u| (s, a, u))))
    }

    /// Number of transitions.
    pub fn transition_count(&self) -> usize {
        self.transitions().count()
    }

    /// All accepting states.
    pub fn accepting_states(&self) -> impl Iterator<Item=&State> + '_ {
        self.states.iter().filter(|s| s.is_accepting())
    }

    /// Characters appearing on any transition.
    pub fn alphabet(&self) -> BTreeSet<char> {
        self.neighbors.values()
            .flat_map(|m| m.keys())
            .filter_map(|a| a.char())
            .collect()
    }

    /// States in breadth-first order from the start state, following
    /// transitions in ascending symbol order. Unreachable states come last.
    pub fn ordered_states(&self) -> Vec<&State> {
        let mut visited = BTreeSet::new();
        let mut res = Vec::with_capacity(self.states.len());
        let mut queue = VecDeque::new();
        visited.insert(&self.start);
        queue.push_back(&self.start);
        while let Some(s) = queue.pop_front() {
            res.push(s);
            if let Some(m) = self.neighbors.get(s) {
                for t in m.values().flat_map(Targets::targets) {
                    if visited.insert(t) { queue.push_back(t) }
                }
            }
        }
        res.extend(self.states.iter().filter(|s| !visited.contains(s)));
        res
    }

    /// States reachable from the start state.
    pub fn reachable(&self) -> BTreeSet<State> {
        let mut res = BTreeSet::new();
        let mut to_visit = vec![&self.start];
        while let Some(s) = to_visit.pop() {
            if res.insert(s.clone()) {
                to_visit.extend(self.neighbors.get(s)
                    .into_iter()
                    .flat_map(|m| m.values().flat_map(Targets::targets)));
            }
        }
        res
    }

    /// Drop every state (and its transitions) unreachable from the start state.
    pub fn prune_unreachable(&mut self) {
        let reachable = self.reachable();
        self.neighbors.retain(|s, _| reachable.contains(s));
        self.states = reachable;
    }

    /// Graphviz dump, numbering states by [`ordered_states`](Self::ordered_states).
    pub fn debug_format(&self) -> Result<String, std::fmt::Error> {
        let index = self.ordered_states().into_iter()
            .zip(0..)
            .collect::<BTreeMap<&State, usize>>();
        let mut edges = self.transitions()
            .map(|(s, a, t)| (index[s], a, index[t]))
            .collect::<Vec<_>>();
        edges.sort_unstable();
        let mut buffer = String::new();
        use std::fmt::Write;
        writeln!(buffer, r#"digraph {{"#)?;
        writeln!(buffer, r#"  rankdir="LR";"#)?;
        for (s, a, t) in edges {
            writeln!(buffer, r#"  {} -> {} [label="{}"];"#, s, t, a)?;
        }
        writeln!(buffer, r#"  start [shape="plaintext"];"#)?;
        writeln!(buffer, r#"  start -> {};"#, index[&self.start])?;
        let mut finals = self.accepting_states()
            .map(|f| (index[f], f.token().unwrap_or_default()))
            .collect::<Vec<_>>();
        finals.sort_unstable();
        for (f, token) in finals {
            writeln!(buffer, r#"  {} [shape="doublecircle", xlabel="{}"];"#, f, token)?;
        }
        writeln!(buffer, r#"}}"#)?;
        Ok(buffer)
    }
}

impl Nfa {
    /// Add a transition, and both its end points. Returns `false` if it already exists.
    pub fn add_transition(&mut self, s: &State, a: Symbol, t: &State) -> bool {
        self.states.insert(s.clone());
        self.states.insert(t.clone());
        self.neighbors.entry(s.clone())
            .or_default()
            .entry(a)
            .or_default()
            .insert(t.clone())
    }
}

impl Dfa {
    /// Set the transition from `s` on `a`, returning the previous destination.
    pub fn set_transition(&mut self, s: &State, a: Symbol, t: &State) -> Option<State> {
        self.states.insert(s.clone());
        self.states.insert(t.clone());
        self.neighbors.entry(s.clone())
            .or_default()
            .insert(a, t.clone())
    }

    /// The destination from `s` on input `c`.
    pub fn step(&self, s: &State, c: char) -> Option<&State> {
        self.neighbors.get(s)?.get(&Symbol::Char(c))
    }

    /// The state reached after consuming the whole `input`.
    pub fn run(&self, input: &str) -> Option<&State> {
        input.chars().try_fold(&self.start, |s, c| self.step(s, c))
    }

    /// The acceptance tag after consuming the whole `input`, `None` if rejected.
    pub fn accepts(&self, input: &str) -> Option<&Accept> {
        self.run(input)?.accept()
    }
}
