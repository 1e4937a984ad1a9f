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

//! Myhill-Nerode minimization by pairwise marking.
//!
//! A pair of states is marked once it is known to be distinguishable. Marks
//! start from acceptance (and token) differences and are propagated backwards
//! along common symbols until nothing changes. Each unmarked class then
//! becomes one state of the minimized DFA.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use super::{Allocator, Dfa, State, Symbol};
use super::validity::check_dfa;
use crate::error::Result;
use crate::utils::min_max;

/// Distinguishable pairs, always stored as `(smaller, larger)`.
struct Marks(BTreeSet<(usize, usize)>);

impl Marks {
    fn contains(&self, x: usize, y: usize) -> bool {
        let (_, a, b) = min_max(x, y);
        a != b && self.0.contains(&(a, b))
    }

    fn mark(&mut self, x: usize, y: usize) -> bool {
        let (_, a, b) = min_max(x, y);
        self.0.insert((a, b))
    }
}

struct Minimizer<'a> {
    dfa: &'a Dfa,
    states: Vec<&'a State>,
    index: BTreeMap<&'a State, usize>,
}

impl<'a> Minimizer<'a> {
    fn new(dfa: &'a Dfa) -> Self {
        let states = dfa.ordered_states();
        let index = states.iter().copied().zip(0..).collect();
        Minimizer { dfa, states, index }
    }

    fn outgoing(&self, i: usize) -> BTreeMap<Symbol, usize> {
        self.dfa.neighbors(self.states[i]).into_iter()
            .flat_map(|m| m.iter())
            .map(|(&a, t)| (a, self.index[t]))
            .collect()
    }

    fn distinguishable(&self, marks: &Marks, i: usize, j: usize) -> bool {
        let (x, y) = (self.outgoing(i), self.outgoing(j));
        !x.keys().eq(y.keys()) || x.iter().any(|(a, &s)| marks.contains(s, y[a]))
    }

    fn marks(&self) -> Marks {
        let n = self.states.len();
        let mut marks = Marks(BTreeSet::new());
        for (i, j) in (0..n).tuple_combinations() {
            if self.states[i].token() != self.states[j].token() {
                marks.mark(i, j);
            }
        }
        loop {
            let mut changed = false;
            for (i, j) in (0..n).tuple_combinations() {
                if !marks.contains(i, j) && self.distinguishable(&marks, i, j) {
                    changed |= marks.mark(i, j);
                }
            }
            if !changed { break marks; }
        }
    }

    /// Class index of every state; classes are numbered by their smallest member.
    fn classes(&self, marks: &Marks) -> (Vec<usize>, Vec<usize>) {
        let mut class_of = Vec::with_capacity(self.states.len());
        let mut representatives = Vec::new();
        for i in 0..self.states.len() {
            match representatives.iter().position(|&r| !marks.contains(r, i)) {
                Some(c) => class_of.push(c),
                None => {
                    class_of.push(representatives.len());
                    representatives.push(i);
                }
            }
        }
        (class_of, representatives)
    }

    fn minimize(&self, allocator: &mut Allocator) -> Dfa {
        let marks = self.marks();
        let (class_of, representatives) = self.classes(&marks);
        let new_states = representatives.iter()
            .map(|&r| allocator.new_state(self.states[r].accept().cloned()))
            .collect::<Vec<_>>();
        let class = |s: &State| &new_states[class_of[self.index[s]]];
        let mut res = Dfa::new(class(self.dfa.start()).clone());
        for s in &new_states {
            res.add_state(s.clone());
        }
        for (s, a, t) in self.dfa.transitions() {
            let (s, t) = (class(s), class(t));
            if let Some(old) = res.set_transition(s, a, t) {
                assert_eq!(&old, t, "classes of {} disagree on {}.", s, a);
            }
        }
        res.prune_unreachable();
        res
    }
}

/// Merge every pair of indistinguishable states of `dfa`.
pub fn minimize(allocator: &mut Allocator, dfa: &Dfa) -> Result<Dfa> {
    let res = Minimizer::new(dfa).minimize(allocator);
    trace!(pipeline, "minimized DFA: {} states (from {}), {} transitions",
           res.states().len(), dfa.states().len(), res.transition_count());
    check_dfa(&res)?;
    Ok(res)
}

#[cfg(test)]
mod tests {
    use expect_test::expect;
    use indoc::indoc;

    use super::*;
    use crate::automata::determine::determine;
    use crate::automata::epsilon::eliminate;
    use crate::automata::thompson::construct;
    use crate::grammar::{Expr, Grammar, Production};
    use crate::utils::logging::setup_logger;

    fn stages(productions: Vec<Production>) -> (Allocator, Dfa) {
        setup_logger();
        let g = Grammar::new(productions).unwrap();
        let mut allocator = Allocator::new();
        let enfa = construct(&mut allocator, g.productions(), &g.priorities()).unwrap();
        let nfa = eliminate(&mut allocator, &enfa).unwrap();
        let dfa = determine(&mut allocator, &nfa).unwrap();
        (allocator, dfa)
    }

    fn minimize_one(expr: Expr) -> Dfa {
        let (mut allocator, dfa) = stages(vec![Production::new("S", expr)]);
        minimize(&mut allocator, &dfa).unwrap()
    }

    #[test]
    fn test_alternation_merges_finals() {
        let dfa = minimize_one(Expr::alt(vec![Expr::literal("a"), Expr::literal("b")]));
        assert_eq!(
            dfa.debug_format().unwrap(),
            indoc!(r#"
                digraph {
                  rankdir="LR";
                  0 -> 1 [label="a"];
                  0 -> 1 [label="b"];
                  start [shape="plaintext"];
                  start -> 0;
                  1 [shape="doublecircle", xlabel="S"];
                }
            "#)
        );
    }

    #[test]
    fn test_loop_collapses() {
        let dfa = minimize_one(Expr::many(Expr::literal("a")));
        expect![[r#"
            digraph {
              rankdir="LR";
              0 -> 0 [label="a"];
              start [shape="plaintext"];
              start -> 0;
              0 [shape="doublecircle", xlabel="S"];
            }
        "#]].assert_eq(&dfa.debug_format().unwrap());
        assert_eq!(dfa.states().len(), 1);
        assert_eq!(minimize_one(Expr::alt(vec![Expr::literal("a"), Expr::literal("b")])).states().len(), 2);
    }

    #[test]
    fn test_common_successor_merges() {
        let dfa = minimize_one(Expr::alt(vec![Expr::literal("b"), Expr::literal("bb")]));
        expect![[r#"
            digraph {
              rankdir="LR";
              0 -> 1 [label="b"];
              1 -> 2 [label="b"];
              start [shape="plaintext"];
              start -> 0;
              1 [shape="doublecircle", xlabel="S"];
              2 [shape="doublecircle", xlabel="S"];
            }
        "#]].assert_eq(&dfa.debug_format().unwrap());
        let dfa = minimize_one(Expr::many(Expr::alt(vec![Expr::literal("a"), Expr::literal("aa")])));
        assert_eq!(dfa.states().len(), 1);
    }

    #[test]
    fn test_shared_prefix_kept_apart() {
        let (mut allocator, dfa) = stages(vec![
            Production::new("A", Expr::literal("ab")),
            Production::new("B", Expr::literal("ac")),
        ]);
        let min = minimize(&mut allocator, &dfa).unwrap();
        let after_a = min.step(min.start(), 'a').unwrap();
        let out = min.neighbors(after_a).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[&Symbol::Char('b')].token(), Some("A"));
        assert_eq!(out[&Symbol::Char('c')].token(), Some("B"));
        assert_eq!(min.states().len(), 4);
    }

    #[test]
    fn test_identifier() {
        let letter = || Expr::alt(vec![Expr::literal("a"), Expr::literal("b"), Expr::literal("_")]);
        let digit = Expr::alt(vec![Expr::literal("0"), Expr::literal("1")]);
        let (mut allocator, dfa) = stages(vec![Production::new("IDENT", Expr::concat(vec![
            letter(),
            Expr::many(Expr::alt(vec![letter(), digit])),
        ]))]);
        let min = minimize(&mut allocator, &dfa).unwrap();
        assert!(min.states().len() < dfa.states().len());
        expect![[r#"
            digraph {
              rankdir="LR";
              0 -> 1 [label="_"];
              0 -> 1 [label="a"];
              0 -> 1 [label="b"];
              1 -> 1 [label="0"];
              1 -> 1 [label="1"];
              1 -> 1 [label="_"];
              1 -> 1 [label="a"];
              1 -> 1 [label="b"];
              start [shape="plaintext"];
              start -> 0;
              1 [shape="doublecircle", xlabel="IDENT"];
            }
        "#]].assert_eq(&min.debug_format().unwrap());
    }

    #[test]
    fn test_tokens_never_merged() {
        let (mut allocator, dfa) = stages(vec![
            Production::new("A", Expr::literal("a")),
            Production::new("B", Expr::literal("b")),
        ]);
        let min = minimize(&mut allocator, &dfa).unwrap();
        assert_eq!(min.states().len(), 3);
        assert_eq!(min.accepts("a").map(|a| &*a.token), Some("A"));
        assert_eq!(min.accepts("b").map(|a| &*a.token), Some("B"));
    }

    #[test]
    fn test_idempotent() {
        let (mut allocator, dfa) = stages(vec![
            Production::new("KW", Expr::literal("do")),
            Production::new("ID", Expr::some(Expr::alt(vec![Expr::literal("d"), Expr::literal("o")]))),
        ]);
        let once = minimize(&mut allocator, &dfa).unwrap();
        let twice = minimize(&mut allocator, &once).unwrap();
        assert_eq!(once.states().len(), twice.states().len());
        assert_eq!(once.debug_format().unwrap(), twice.debug_format().unwrap());
    }
}
