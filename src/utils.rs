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

//! useful common utilities.

#[macro_use]
pub(crate) mod logging;

/// Return the minimum and the maxinum.
///
/// ```
/// # use lexdfa::utils::min_max;
/// assert_eq!((true, 1, 2), min_max(1, 2));
/// assert_eq!((false, 1, 2), min_max(2, 1));
/// ```
#[inline]
pub fn min_max<T: Ord>(x: T, y: T) -> (bool, T, T) {
    if x <= y {
        (true, x, y)
    } else {
        (false, y, x)
    }
}

/// Good old self-increment.
///
/// ```
/// # use lexdfa::utils::inc;
/// let mut x = 42;
/// assert_eq!(inc(&mut x), 42);
/// assert_eq!(x, 43);
/// ```
pub fn inc(x: &mut u32) -> u32 {
    let res = *x;
    *x += 1;
    res
}

/// Write `bytes` as lowercase hexadecimal, two digits per byte.
///
/// ```
/// # use lexdfa::utils::to_hex;
/// assert_eq!(to_hex(&[0x00, 0xff, 0x2a]), "00ff2a");
/// ```
pub fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut res = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // writing into a `String` never fails
        let _ = write!(res, "{:02x}", b);
    }
    res
}

/// Parse the output of [`to_hex`] back, `None` on odd length or non-hex digits.
///
/// ```
/// # use lexdfa::utils::from_hex;
/// assert_eq!(from_hex("00ff2A"), Some(vec![0x00, 0xff, 0x2a]));
/// assert_eq!(from_hex("abc"), None);
/// assert_eq!(from_hex("zz"), None);
/// ```
pub fn from_hex(text: &str) -> Option<Vec<u8>> {
    let text = text.as_bytes();
    if text.len() % 2 != 0 { return None; }
    text.chunks(2).map(|pair| {
        let hi = (pair[0] as char).to_digit(16)?;
        let lo = (pair[1] as char).to_digit(16)?;
        Some((hi * 16 + lo) as u8)
    }).collect()
}
