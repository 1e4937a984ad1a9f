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

//! Flat transition tables, for table-driven tokenizers.
//!
//! The binary layout is big-endian:
//!
//! ```text
//! i32                     num_states
//! i32                     num_destinations
//! u8[num_states]          is_accepting   (0xFF / 0x00)
//! u8[num_states]          is_skippable   (0xFF / 0x00)
//! i32[num_states]         token_index    (-1 if not accepting)
//! i32[num_states + 1]     offsets
//! u32[num_destinations]   symbols        (Unicode scalar values)
//! i32[num_destinations]   destinations
//! ```
//!
//! State `0` is the start state. Edges of state `i` are
//! `offsets[i]..offsets[i + 1]`, sorted by symbol.

use std::collections::{BTreeMap, BTreeSet};
use std::convert::TryFrom;
use std::sync::Arc;

use crate::automata::{Dfa, State, Symbol};
use crate::automata::validity::{Graph, check_dfa};
use crate::error::{Error, Result};
use crate::utils::{from_hex, to_hex};

const TRUE: u8 = 0xFF;
const FALSE: u8 = 0x00;

fn malformed(reason: impl Into<String>) -> Error {
    Error::MalformedTable { reason: reason.into() }
}

/// A serialized DFA.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Table {
    accepting: Vec<bool>,
    skippable: Vec<bool>,
    token_index: Vec<Option<usize>>,
    offsets: Vec<usize>,
    symbols: Vec<char>,
    destinations: Vec<usize>,
}

impl Table {
    /// Flatten `dfa`. States are numbered breadth-first from the start state,
    /// following edges in ascending symbol order. `token_names` must be sorted.
    pub fn from_dfa(dfa: &Dfa, token_names: &[Arc<str>],
                    skippable: &BTreeSet<Arc<str>>) -> Result<Table> {
        let states = dfa.ordered_states();
        let index = states.iter().copied()
            .zip(0..)
            .collect::<BTreeMap<&State, usize>>();
        let mut table = Table {
            accepting: Vec::with_capacity(states.len()),
            skippable: Vec::with_capacity(states.len()),
            token_index: Vec::with_capacity(states.len()),
            offsets: Vec::with_capacity(states.len() + 1),
            symbols: Vec::new(),
            destinations: Vec::new(),
        };
        table.offsets.push(0);
        for s in states {
            let token = match s.token() {
                None => None,
                Some(t) => Some(token_names.binary_search_by(|n| (**n).cmp(t))
                    .map_err(|_| Error::UnknownToken { name: t.to_string() })?),
            };
            table.accepting.push(s.is_accepting());
            table.skippable.push(s.token().map_or(false, |t| skippable.contains(t)));
            table.token_index.push(token);
            for (&a, t) in dfa.neighbors(s).into_iter().flat_map(|m| m.iter()) {
                let c = a.char()
                    .ok_or_else(|| Error::UnexpectedEpsilonTransition { state: s.to_string() })?;
                table.symbols.push(c);
                table.destinations.push(index[t]);
            }
            table.offsets.push(table.symbols.len());
        }
        trace!(pipeline, "table: {} states, {} destinations",
               table.state_count(), table.destination_count());
        check_dfa(&table)?;
        Ok(table)
    }

    /// Number of states.
    pub fn state_count(&self) -> usize { self.accepting.len() }

    /// Number of edges.
    pub fn destination_count(&self) -> usize { self.destinations.len() }

    /// Whether state `s` accepts.
    pub fn is_accepting(&self, s: usize) -> bool { self.accepting[s] }

    /// Whether the token accepted at `s` is discarded.
    pub fn is_skippable(&self, s: usize) -> bool { self.skippable[s] }

    /// Index of the token accepted at `s` in the sorted token-name list.
    pub fn token_index(&self, s: usize) -> Option<usize> { self.token_index[s] }

    /// Outgoing edges of `s`, in ascending symbol order.
    pub fn edges(&self, s: usize) -> impl Iterator<Item=(char, usize)> + '_ {
        let range = self.offsets[s]..self.offsets[s + 1];
        self.symbols[range.clone()].iter().copied()
            .zip(self.destinations[range].iter().copied())
    }

    /// Destination of the edge from `s` on `c`, by binary search.
    pub fn transition(&self, s: usize, c: char) -> Option<usize> {
        let (lo, hi) = (self.offsets[s], self.offsets[s + 1]);
        self.symbols[lo..hi].binary_search(&c).ok()
            .map(|i| self.destinations[lo + i])
    }

    /// Big-endian binary encoding.
    pub fn encode(&self) -> Vec<u8> {
        fn flag(b: &bool) -> u8 { if *b { TRUE } else { FALSE } }
        let n = self.state_count();
        let mut res = Vec::with_capacity(8 + 2 * n + 4 * (2 * n + 1) + 8 * self.destination_count());
        res.extend_from_slice(&(n as i32).to_be_bytes());
        res.extend_from_slice(&(self.destination_count() as i32).to_be_bytes());
        res.extend(self.accepting.iter().map(flag));
        res.extend(self.skippable.iter().map(flag));
        for t in &self.token_index {
            res.extend_from_slice(&t.map_or(-1, |t| t as i32).to_be_bytes());
        }
        for &o in &self.offsets {
            res.extend_from_slice(&(o as i32).to_be_bytes());
        }
        for &c in &self.symbols {
            res.extend_from_slice(&(c as u32).to_be_bytes());
        }
        for &d in &self.destinations {
            res.extend_from_slice(&(d as i32).to_be_bytes());
        }
        res
    }

    /// Decode and validate the output of [`encode`](Self::encode).
    pub fn decode(bytes: &[u8]) -> Result<Table> {
        let mut reader = Reader { bytes };
        let n = reader.count("state count")?;
        let m = reader.count("destination count")?;
        if n == 0 {
            return Err(malformed("no start state"));
        }
        let accepting = reader.flags(n)?;
        let skippable = reader.flags(n)?;
        let token_index = reader.words(n)?.into_iter()
            .zip(&accepting)
            .map(|(t, &acc)| match (t as i32, acc) {
                (-1, false) => Ok(None),
                (t, true) if t >= 0 => Ok(Some(t as usize)),
                (t, _) => Err(malformed(format!("token index {} on a state with accepting = {}", t, acc))),
            })
            .collect::<Result<Vec<_>>>()?;
        let offsets = reader.words(n + 1)?.into_iter()
            .map(|o| o as usize)
            .collect::<Vec<_>>();
        if offsets[0] != 0 || offsets[n] != m || offsets.windows(2).any(|w| w[0] > w[1]) {
            return Err(malformed("offsets are not a prefix sum of the edges"));
        }
        let symbols = reader.words(m)?.into_iter()
            .map(|c| std::char::from_u32(c)
                .ok_or_else(|| malformed(format!("invalid scalar value {:#x}", c))))
            .collect::<Result<Vec<_>>>()?;
        let destinations = reader.words(m)?.into_iter()
            .map(|d| d as usize)
            .collect::<Vec<_>>();
        if let Some(d) = destinations.iter().find(|&&d| d >= n) {
            return Err(malformed(format!("destination {} out of range", *d as i32)));
        }
        if !reader.bytes.is_empty() {
            return Err(malformed(format!("{} trailing byte(s)", reader.bytes.len())));
        }
        let table = Table { accepting, skippable, token_index, offsets, symbols, destinations };
        for s in 0..n {
            let edges = table.edges(s).collect::<Vec<_>>();
            if edges.windows(2).any(|w| w[0].0 >= w[1].0) {
                return Err(malformed(format!("edges of state {} are not sorted", s)));
            }
        }
        Ok(table)
    }

    /// Lowercase hexadecimal form of [`encode`](Self::encode), for embedding
    /// in generated sources.
    pub fn to_text(&self) -> String {
        to_hex(&self.encode())
    }

    /// Parse the output of [`to_text`](Self::to_text).
    pub fn from_text(text: &str) -> Result<Table> {
        let bytes = from_hex(text.trim()).ok_or_else(|| malformed("not hexadecimal text"))?;
        Table::decode(&bytes)
    }
}

impl Graph for Table {
    type Node = usize;

    fn start_node(&self) -> usize { 0 }

    fn nodes(&self) -> Vec<usize> { (0..self.state_count()).collect() }

    fn is_final(&self, n: &usize) -> bool { self.accepting[*n] }

    fn edges(&self, n: &usize) -> Vec<(Symbol, usize)> {
        Table::edges(self, *n).map(|(c, t)| (Symbol::Char(c), t)).collect()
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.bytes.len() < len {
            return Err(malformed("unexpected end of table"));
        }
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        Ok(head)
    }

    fn words(&mut self, count: usize) -> Result<Vec<u32>> {
        let len = count.checked_mul(4).ok_or_else(|| malformed("table too large"))?;
        Ok(self.take(len)?
            .chunks(4)
            .map(|w| u32::from_be_bytes([w[0], w[1], w[2], w[3]]))
            .collect())
    }

    fn count(&mut self, what: &str) -> Result<usize> {
        let x = self.words(1)?[0] as i32;
        usize::try_from(x).map_err(|_| malformed(format!("negative {}: {}", what, x)))
    }

    fn flags(&mut self, count: usize) -> Result<Vec<bool>> {
        self.take(count)?.iter()
            .map(|&b| match b {
                TRUE => Ok(true),
                FALSE => Ok(false),
                b => Err(malformed(format!("invalid flag byte {:#04x}", b))),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::{Accept, Allocator};

    fn names(xs: &[&str]) -> Vec<Arc<str>> {
        xs.iter().map(|&x| Arc::from(x)).collect()
    }

    /// `A = "ab" ; B = "ac" ;`, built by hand.
    fn shared_prefix() -> Dfa {
        let tokens = names(&["A", "B"]);
        let mut allocator = Allocator::new();
        let s = allocator.state();
        let m = allocator.state();
        let a = allocator.accepting(Accept::new(&tokens[0], 1));
        let b = allocator.accepting(Accept::new(&tokens[1], 2));
        let mut dfa = Dfa::new(s.clone());
        dfa.set_transition(&m, Symbol::Char('c'), &b);
        dfa.set_transition(&m, Symbol::Char('b'), &a);
        dfa.set_transition(&s, Symbol::Char('a'), &m);
        dfa
    }

    fn table() -> Table {
        Table::from_dfa(&shared_prefix(), &names(&["A", "B"]), &BTreeSet::new()).unwrap()
    }

    #[test]
    fn test_layout() {
        let t = table();
        assert_eq!(t.state_count(), 4);
        assert_eq!(t.destination_count(), 3);
        assert_eq!(t.edges(1).collect::<Vec<_>>(), vec![('b', 2), ('c', 3)]);
        assert_eq!((t.token_index(0), t.token_index(2), t.token_index(3)), (None, Some(0), Some(1)));
        assert_eq!(t.transition(0, 'a'), Some(1));
        assert_eq!(t.transition(1, 'c'), Some(3));
        assert_eq!(t.transition(1, 'a'), None);
        assert_eq!(t.transition(3, 'a'), None);
        assert_eq!(
            t.to_text(),
            concat!(
                "00000004", "00000003",
                "0000ffff", "00000000",
                "ffffffff", "ffffffff", "00000000", "00000001",
                "00000000", "00000001", "00000003", "00000003", "00000003",
                "00000061", "00000062", "00000063",
                "00000001", "00000002", "00000003",
            )
        );
    }

    #[test]
    fn test_round_trip() {
        let t = table();
        assert_eq!(Table::decode(&t.encode()), Ok(t.clone()));
        assert_eq!(Table::from_text(&t.to_text()), Ok(t));
    }

    #[test]
    fn test_skippable() {
        let skip = names(&["B"]).into_iter().collect();
        let t = Table::from_dfa(&shared_prefix(), &names(&["A", "B"]), &skip).unwrap();
        assert_eq!((0..4).map(|s| t.is_skippable(s)).collect::<Vec<_>>(),
                   vec![false, false, false, true]);
        assert_eq!(&t.encode()[12..16], &[0x00, 0x00, 0x00, 0xFF]);
    }

    #[test]
    fn test_unknown_token() {
        let res = Table::from_dfa(&shared_prefix(), &names(&["A"]), &BTreeSet::new());
        assert_eq!(res, Err(Error::UnknownToken { name: "B".to_string() }));
    }

    #[test]
    fn test_checked_after_flattening() {
        let mut dfa = shared_prefix();
        let mut allocator = Allocator::new();
        // ids from a second allocator start over, so skip past the existing ones
        let island = (0..5).map(|_| allocator.state()).last().unwrap();
        dfa.add_state(island);
        let res = Table::from_dfa(&dfa, &names(&["A", "B"]), &BTreeSet::new());
        assert_eq!(res, Err(Error::DisconnectedAutomaton { unreachable: 1 }));

        let mut dfa = shared_prefix();
        let start = dfa.start().clone();
        dfa.set_transition(&start, Symbol::Epsilon, &start);
        let res = Table::from_dfa(&dfa, &names(&["A", "B"]), &BTreeSet::new());
        assert_eq!(res, Err(Error::UnexpectedEpsilonTransition { state: "q0".to_string() }));
    }

    #[test]
    fn test_malformed() {
        let good = table().encode();
        assert_eq!(good.len(), 76);
        let broken = |f: &dyn Fn(&mut Vec<u8>)| {
            let mut bytes = good.clone();
            f(&mut bytes);
            match Table::decode(&bytes) {
                Err(Error::MalformedTable { reason }) => reason,
                res => panic!("unexpected result: {:?}", res),
            }
        };
        assert_eq!(broken(&|b| b.truncate(70)), "unexpected end of table");
        assert_eq!(broken(&|b| b.push(0)), "1 trailing byte(s)");
        assert_eq!(broken(&|b| b[8] = 0x01), "invalid flag byte 0x01");
        assert_eq!(broken(&|b| b[8] = 0xFF), "token index -1 on a state with accepting = true");
        assert_eq!(broken(&|b| b[39] = 5), "offsets are not a prefix sum of the edges");
        assert_eq!(broken(&|b| b[54] = 0xD8), "invalid scalar value 0xd861");
        assert_eq!(broken(&|b| b[75] = 9), "destination 9 out of range");
        assert_eq!(broken(&|b| b[3] = 0), "no start state");
        assert_eq!(broken(&|b| b[0] = 0x80), "negative state count: -2147483644");
        assert!(matches!(Table::from_text("0g"), Err(Error::MalformedTable { .. })));
    }
}
