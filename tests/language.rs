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

//! Property tests: compiled automata against the reference semantics of
//! the expression tree.

use proptest::prelude::*;

use lexdfa::automata::{Allocator, Dfa};
use lexdfa::automata::determine::determine;
use lexdfa::automata::epsilon::eliminate;
use lexdfa::automata::minimize::minimize;
use lexdfa::automata::thompson::construct;
use lexdfa::automata::validity::{check_dfa, check_epsilon_nfa, check_nfa};
use lexdfa::grammar::{Expr, Grammar, Production};
use lexdfa::table::Table;

/// Random expressions over `a` and `b`. Alternations are never empty, so
/// every production can reach its accepting state.
fn expr() -> impl Strategy<Value=Expr> {
    let leaf = "[ab]{0,2}".prop_map(|s| Expr::literal(&s));
    leaf.prop_recursive(4, 24, 3, |inner| prop_oneof![
        prop::collection::vec(inner.clone(), 0..3).prop_map(Expr::concat),
        prop::collection::vec(inner.clone(), 1..3).prop_map(Expr::alt),
        inner.clone().prop_map(Expr::optional),
        inner.clone().prop_map(Expr::many),
        inner.prop_map(Expr::some),
    ])
}

fn input() -> impl Strategy<Value=String> {
    "[abc]{0,6}"
}

/// Every stage, keeping the DFA before minimization too.
fn stages(grammar: &Grammar) -> (Dfa, Dfa) {
    let mut allocator = Allocator::new();
    let enfa = construct(&mut allocator, grammar.productions(), &grammar.priorities()).unwrap();
    check_epsilon_nfa(&enfa).unwrap();
    let nfa = eliminate(&mut allocator, &enfa).unwrap();
    check_nfa(&nfa).unwrap();
    let dfa = determine(&mut allocator, &nfa).unwrap();
    let min = minimize(&mut allocator, &dfa).unwrap();
    check_dfa(&min).unwrap();
    (dfa, min)
}

fn single(e: &Expr) -> Grammar {
    Grammar::new(vec![Production::new("S", e.clone())]).unwrap()
}

/// Walk the serialized table over `input`, `None` if stuck.
fn run_table(table: &Table, input: &str) -> Option<usize> {
    input.chars().try_fold(0, |s, c| table.transition(s, c))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn language_equivalence(e in expr(), inputs in prop::collection::vec(input(), 8)) {
        let (dfa, min) = stages(&single(&e));
        for s in &inputs {
            let expected = e.matches(s);
            prop_assert_eq!(dfa.accepts(s).is_some(), expected, "{} on {:?}", e, s);
            prop_assert_eq!(min.accepts(s).is_some(), expected, "{} on {:?}", e, s);
        }
    }

    #[test]
    fn minimization_shrinks_and_is_stable(e in expr()) {
        let (dfa, min) = stages(&single(&e));
        prop_assert!(min.states().len() <= dfa.states().len());
        let again = minimize(&mut Allocator::new(), &min).unwrap();
        prop_assert_eq!(again.states().len(), min.states().len());
        prop_assert_eq!(again.debug_format().unwrap(), min.debug_format().unwrap());
    }

    #[test]
    fn earliest_production_wins(e1 in expr(), e2 in expr(), inputs in prop::collection::vec(input(), 8)) {
        let grammar = Grammar::new(vec![
            Production::new("FIRST", e1.clone()),
            Production::new("SECOND", e2.clone()),
        ]).unwrap();
        let (_, min) = stages(&grammar);
        for s in &inputs {
            let expected = if e1.matches(s) {
                Some("FIRST")
            } else if e2.matches(s) {
                Some("SECOND")
            } else {
                None
            };
            prop_assert_eq!(min.accepts(s).map(|a| &*a.token), expected, "{:?}", s);
        }
    }

    #[test]
    fn table_agrees_with_dfa(e in expr(), inputs in prop::collection::vec(input(), 8)) {
        let grammar = single(&e);
        let lexer = lexdfa::compile(&grammar).unwrap();
        let table = lexer.table();
        let decoded = Table::decode(&table.encode());
        prop_assert_eq!(decoded.as_ref(), Ok(table));
        for s in &inputs {
            let accepted = run_table(table, s).map_or(false, |t| table.is_accepting(t));
            prop_assert_eq!(accepted, e.matches(s), "{} on {:?}", e, s);
        }
    }
}
