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

//! Structural invariants, checked on the output of every stage.

use std::collections::BTreeSet;
use std::fmt::Display;

use super::{Automaton, State, Symbol, Targets};
use crate::error::{Error, Result};

/// A transition graph, as seen by the checker.
pub trait Graph {
    /// Node identity.
    type Node: Clone + Ord + Display;
    /// The start node.
    fn start_node(&self) -> Self::Node;
    /// Every node carried, reachable or not.
    fn nodes(&self) -> Vec<Self::Node>;
    /// Whether a node accepts.
    fn is_final(&self, n: &Self::Node) -> bool;
    /// Outgoing edges of a node, duplicates included.
    fn edges(&self, n: &Self::Node) -> Vec<(Symbol, Self::Node)>;
}

impl<T: Targets> Graph for Automaton<T> {
    type Node = State;

    fn start_node(&self) -> State { self.start().clone() }

    fn nodes(&self) -> Vec<State> {
        self.states().iter().cloned().collect()
    }

    fn is_final(&self, n: &State) -> bool { n.is_accepting() }

    fn edges(&self, n: &State) -> Vec<(Symbol, State)> {
        self.neighbors(n).into_iter()
            .flat_map(|m| m.iter())
            .flat_map(|(&a, t)| t.targets().map(move |u| (a, u.clone())))
            .collect()
    }
}

/// At least one accepting state.
pub fn check_final<G: Graph>(g: &G) -> Result<()> {
    if g.nodes().iter().any(|n| g.is_final(n)) {
        Ok(())
    } else {
        Err(Error::NoFinalState)
    }
}

/// Every node is reachable from the start node.
pub fn check_connected<G: Graph>(g: &G) -> Result<()> {
    let mut reached = BTreeSet::new();
    let mut to_visit = vec![g.start_node()];
    while let Some(n) = to_visit.pop() {
        if reached.contains(&n) { continue; }
        to_visit.extend(g.edges(&n).into_iter().map(|(_, t)| t));
        reached.insert(n);
    }
    let unreachable = g.nodes().iter().filter(|n| !reached.contains(*n)).count();
    if unreachable == 0 {
        Ok(())
    } else {
        Err(Error::DisconnectedAutomaton { unreachable })
    }
}

/// No epsilon transition.
pub fn check_epsilon_free<G: Graph>(g: &G) -> Result<()> {
    for n in g.nodes() {
        if g.edges(&n).iter().any(|(a, _)| *a == Symbol::Epsilon) {
            return Err(Error::UnexpectedEpsilonTransition { state: n.to_string() });
        }
    }
    Ok(())
}

/// No node has two transitions on the same character.
pub fn check_deterministic<G: Graph>(g: &G) -> Result<()> {
    for n in g.nodes() {
        let mut seen = BTreeSet::new();
        for c in g.edges(&n).into_iter().filter_map(|(a, _)| a.char()) {
            if !seen.insert(c) {
                return Err(Error::NonDeterministicTransition { state: n.to_string(), symbol: c });
            }
        }
    }
    Ok(())
}

/// Invariants of an epsilon-NFA: finality and connectivity.
pub fn check_epsilon_nfa<G: Graph>(g: &G) -> Result<()> {
    check_final(g)?;
    check_connected(g)
}

/// Invariants of an NFA: those of an epsilon-NFA, and no epsilon transition.
pub fn check_nfa<G: Graph>(g: &G) -> Result<()> {
    check_epsilon_nfa(g)?;
    check_epsilon_free(g)
}

/// Invariants of a DFA: those of an NFA, and determinism.
pub fn check_dfa<G: Graph>(g: &G) -> Result<()> {
    check_nfa(g)?;
    check_deterministic(g)
}
