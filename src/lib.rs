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

//! Compile lexical grammars into minimized DFAs and flat transition tables.
//!
//! ```
//! use lexdfa::grammar::{Expr, Grammar, Production};
//!
//! let grammar = Grammar::new(vec![
//!     Production::new("WS", Expr::some(Expr::literal(" "))).skipped(),
//!     Production::new("IF", Expr::literal("if")),
//!     Production::new("ID", Expr::some(Expr::alt(vec![Expr::literal("i"), Expr::literal("f")]))),
//! ]).unwrap();
//! let lexer = lexdfa::compile(&grammar).unwrap();
//! let tokens = lexer.tokenize("if fi")
//!     .map(|t| t.map(|t| t.name.to_string()))
//!     .collect::<Result<Vec<_>, _>>()
//!     .unwrap();
//! assert_eq!(tokens, vec!["IF", "ID"]);
//! ```

#![warn(missing_docs)]

#[macro_use]
pub mod utils;

pub mod error;
pub mod grammar;
pub mod automata;
pub mod table;
pub mod runtime;
pub mod pipeline;

pub use error::{Error, Result};
pub use pipeline::{compile, Lexer};
