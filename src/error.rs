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

//! Error reporting for the lexer compiler.
//!
//! None of these errors is recoverable: every stage is a pure function of
//! its input, so compiling the same grammar again fails the same way.

use thiserror::Error;

/// An exhaustive list of compile-time errors.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum Error {
    /// No accepting state: the grammar accepts nothing at all.
    #[error("automaton has no final state")]
    NoFinalState,
    /// Some states cannot be reached from the start state.
    #[error("automaton is not a single connected component: {unreachable} unreachable state(s)")]
    DisconnectedAutomaton {
        /// How many carried states are unreachable.
        unreachable: usize,
    },
    /// An epsilon transition survived into an NFA or a DFA.
    #[error("unexpected epsilon transition out of state {state}")]
    UnexpectedEpsilonTransition {
        /// The departure state.
        state: String,
    },
    /// Two transitions out of one DFA state consume the same symbol.
    #[error("duplicate transition out of state {state} on {symbol:?}")]
    NonDeterministicTransition {
        /// The departure state.
        state: String,
        /// The duplicated input symbol.
        symbol: char,
    },
    /// A front-end node of a kind outside the six regular operators.
    #[error("unknown expression node '{kind}'")]
    UnknownExpressionNode {
        /// The offending node kind.
        kind: String,
    },
    /// A known node kind with the wrong payload, e.g. `optional` with two children.
    #[error("malformed expression node '{kind}': {reason}")]
    MalformedExpressionNode {
        /// The offending node kind.
        kind: String,
        /// What is wrong with it.
        reason: String,
    },
    /// Two productions share one name.
    #[error("production '{name}' is defined more than once")]
    DuplicateProduction {
        /// The duplicated production name.
        name: String,
    },
    /// A DFA state is tagged with a token absent from the token table.
    #[error("token '{name}' is missing from the token table")]
    UnknownToken {
        /// The token name.
        name: String,
    },
    /// A serialized transition table failed to decode.
    #[error("malformed transition table: {reason}")]
    MalformedTable {
        /// What is wrong with it.
        reason: String,
    },
}

/// Compiler result.
pub type Result<T> = std::result::Result<T, Error>;
