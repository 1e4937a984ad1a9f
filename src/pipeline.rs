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

//! The whole compilation, from a grammar to a transition table.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::automata::{Allocator, Dfa, State};
use crate::automata::thompson::construct;
use crate::automata::epsilon::eliminate;
use crate::automata::determine::determine;
use crate::automata::minimize::minimize;
use crate::error::Result;
use crate::grammar::Grammar;
use crate::runtime::Tokenizer;
use crate::table::Table;

/// A compiled lexer.
#[derive(Clone, Debug)]
pub struct Lexer {
    token_names: Vec<Arc<str>>,
    dfa: Dfa,
    table: Table,
    shadowed: Vec<Arc<str>>,
}

impl Lexer {
    /// Token names, sorted: the table's token indices point here.
    pub fn token_names(&self) -> &[Arc<str>] { &self.token_names }

    /// The minimized DFA.
    pub fn dfa(&self) -> &Dfa { &self.dfa }

    /// The serialized DFA.
    pub fn table(&self) -> &Table { &self.table }

    /// Productions that never win, in declaration order.
    pub fn shadowed(&self) -> &[Arc<str>] { &self.shadowed }

    /// Tokenize `input`.
    pub fn tokenize<'a>(&'a self, input: &'a str) -> Tokenizer<'a> {
        Tokenizer::new_unchecked(&self.table, &self.token_names, input)
    }
}

/// Compile a grammar. Each call owns its own state allocator, so separate
/// grammars may be compiled on separate threads.
pub fn compile(grammar: &Grammar) -> Result<Lexer> {
    let mut allocator = Allocator::new();
    trace!(pipeline, "compiling {} production(s)", grammar.productions().len());
    let enfa = construct(&mut allocator, grammar.productions(), &grammar.priorities())?;
    let nfa = eliminate(&mut allocator, &enfa)?;
    let dfa = determine(&mut allocator, &nfa)?;
    let dfa = minimize(&mut allocator, &dfa)?;
    let token_names = grammar.token_names();
    let table = Table::from_dfa(&dfa, &token_names, &grammar.skippable_tokens())?;
    let tagged = dfa.accepting_states()
        .filter_map(State::token)
        .collect::<BTreeSet<_>>();
    let shadowed = grammar.productions().iter()
        .filter(|p| !tagged.contains(&*p.name))
        .map(|p| p.name.clone())
        .collect::<Vec<_>>();
    if !shadowed.is_empty() {
        warn!(pipeline, "shadowed by earlier productions: {}", shadowed.join(", "));
    }
    trace!(pipeline, "done, {} states issued", allocator.issued());
    Ok(Lexer { token_names, dfa, table, shadowed })
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::error::Error;
    use crate::grammar::{Expr, Production};
    use crate::utils::logging::setup_logger;

    fn grammar(productions: Vec<Production>) -> Grammar {
        setup_logger();
        Grammar::new(productions).unwrap()
    }

    #[test]
    fn test_scenarios() {
        let cases = vec![
            (Expr::literal("a"), vec!["a"], vec!["", "b", "aa"]),
            (Expr::optional(Expr::literal("a")), vec!["", "a"], vec!["aa", "b"]),
            (Expr::many(Expr::literal("a")), vec!["", "a", "aa", "aaa"], vec!["b", "ab"]),
            (Expr::alt(vec![Expr::literal("a"), Expr::literal("b")]), vec!["a", "b"], vec!["", "ab", "c"]),
        ];
        for (e, accepted, rejected) in cases {
            let text = e.to_string();
            let lexer = compile(&grammar(vec![Production::new("S", e)])).unwrap();
            for s in accepted {
                assert!(lexer.dfa().accepts(s).is_some(), "{} should accept {:?}", text, s);
            }
            for s in rejected {
                assert!(lexer.dfa().accepts(s).is_none(), "{} should reject {:?}", text, s);
            }
        }
    }

    #[test]
    fn test_shared_prefix() {
        let lexer = compile(&grammar(vec![
            Production::new("A", Expr::literal("ab")),
            Production::new("B", Expr::literal("ac")),
        ])).unwrap();
        let table = lexer.table();
        assert_eq!(table.state_count(), 4);
        assert_eq!(table.edges(1).collect::<Vec<_>>(), vec![('b', 2), ('c', 3)]);
        assert!(lexer.shadowed().is_empty());
    }

    #[test]
    fn test_shadowed() {
        let lexer = compile(&grammar(vec![
            Production::new("ANY", Expr::some(Expr::alt(vec![Expr::literal("i"), Expr::literal("f")]))),
            Production::new("IF", Expr::literal("if")),
            Production::new("F", Expr::literal("f")),
        ])).unwrap();
        let shadowed = lexer.shadowed().iter().map(|s| &**s).collect::<Vec<_>>();
        assert_eq!(shadowed, vec!["IF", "F"]);
        assert_eq!(lexer.token_names().len(), 3);
    }

    #[test]
    fn test_errors() {
        assert_eq!(compile(&grammar(vec![])).map(|_| ()), Err(Error::NoFinalState));
        let res = compile(&grammar(vec![
            Production::new("A", Expr::literal("a")),
            Production::new("NOTHING", Expr::alt(vec![])),
        ]));
        assert!(matches!(res, Err(Error::DisconnectedAutomaton { .. })));
    }

    #[test]
    fn test_overlapping_literals() {
        let lexer = compile(&grammar(vec![
            Production::new("S", Expr::alt(vec![Expr::literal("b"), Expr::literal("bb")])),
        ])).unwrap();
        assert_eq!(lexer.table().state_count(), 3);
        let res = lexer.tokenize("bbb").map(|t| t.map(|t| t.text)).collect::<Vec<_>>();
        assert_eq!(res, vec![Ok("bb"), Ok("b")]);
    }

    #[test]
    fn test_parallel_compilation() {
        let make = || grammar(vec![
            Production::new("WS", Expr::some(Expr::literal(" "))).skipped(),
            Production::new("KW", Expr::literal("let")),
            Production::new("ID", Expr::some(Expr::alt(vec![
                Expr::literal("l"), Expr::literal("e"), Expr::literal("t"),
            ]))),
        ]);
        let expected = compile(&make()).unwrap().table().to_text();
        let handles = (0..4)
            .map(|_| {
                let g = make();
                thread::spawn(move || compile(&g).map(|lexer| lexer.table().to_text()))
            })
            .collect::<Vec<_>>();
        for h in handles {
            assert_eq!(h.join().unwrap(), Ok(expected.clone()));
        }
    }
}
