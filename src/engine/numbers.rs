//! Number literals
//!
//!     The literal grammar, in regex notation, is
//!
//!         -?( 0[xX](h_?)*h
//!           | ( [1-9](_?d)*(\.((d_?)*d)?)? | \.d(_?d)* )([eE][-+]?d(_?d)*)?
//!           | 0 )
//!
//!     where the hex, decimal and zero branches must start on a word boundary that is not
//!     preceded by `$`, and the whole literal must not be followed by a word character or `$`.
//!     Digit groups therefore only ever contain single underscores between two digits.
//!
//!     The trailing condition is a lookahead, which the regex crate does not support, and a
//!     plain "longest match then check" is not equivalent: `1.x` must still produce the
//!     number `1`. So the matcher enumerates candidate ends in the exact order a backtracking
//!     engine would try them (greedy groups longest first, alternatives left to right) and
//!     returns the first one the trailing condition accepts.

use std::iter;
use std::ops::Range;

/// Finds the leftmost number literal that starts at or after `from`.
pub fn find_number(text: &str, from: usize) -> Option<Range<usize>> {
    let bytes = text.as_bytes();
    (from..bytes.len())
        .filter(|&start| matches!(bytes[start], b'-' | b'.' | b'0'..=b'9'))
        .find_map(|start| match_number(bytes, start).map(|end| start..end))
}

/// Matches a literal starting exactly at `start`, returning its end.
pub fn match_number(bytes: &[u8], start: usize) -> Option<usize> {
    // Without the sign every branch needs a digit or a dot at `start`, so a failed signed
    // match never succeeds unsigned.
    let body = if bytes.get(start) == Some(&b'-') {
        start + 1
    } else {
        start
    };

    hex(bytes, body)
        .or_else(|| decimal(bytes, body))
        .or_else(|| zero(bytes, body))
}

fn is_word(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

fn is_digit(byte: u8) -> bool {
    byte.is_ascii_digit()
}

fn is_hex_digit(byte: u8) -> bool {
    byte.is_ascii_hexdigit()
}

/// Word boundary in front of a digit, not preceded by `$`.
fn starts_word(bytes: &[u8], at: usize) -> bool {
    match at.checked_sub(1).map(|prev| bytes[prev]) {
        None => true,
        Some(prev) => !is_word(prev) && prev != b'$',
    }
}

/// Nothing that could continue an identifier follows.
fn ends_literal(bytes: &[u8], at: usize) -> bool {
    bytes
        .get(at)
        .map_or(true, |&next| !is_word(next) && next != b'$')
}

/// Every possible end of a `d(_?d)*` group starting at `at`, shortest first.
fn group_ends(bytes: &[u8], at: usize, digit: fn(u8) -> bool) -> Vec<usize> {
    let mut ends = Vec::new();
    if !bytes.get(at).copied().is_some_and(digit) {
        return ends;
    }

    let mut cursor = at + 1;
    ends.push(cursor);
    loop {
        match bytes.get(cursor) {
            Some(&byte) if digit(byte) => cursor += 1,
            Some(b'_') if bytes.get(cursor + 1).copied().is_some_and(digit) => cursor += 2,
            _ => break,
        }
        ends.push(cursor);
    }
    ends
}

fn exponent_ends(bytes: &[u8], at: usize) -> Vec<usize> {
    if !matches!(bytes.get(at), Some(b'e' | b'E')) {
        return Vec::new();
    }
    let digits = match bytes.get(at + 1) {
        Some(b'-' | b'+') => at + 2,
        _ => at + 1,
    };
    group_ends(bytes, digits, is_digit)
}

fn hex(bytes: &[u8], at: usize) -> Option<usize> {
    if bytes.get(at) != Some(&b'0')
        || !matches!(bytes.get(at + 1), Some(b'x' | b'X'))
        || !starts_word(bytes, at)
    {
        return None;
    }
    group_ends(bytes, at + 2, is_hex_digit)
        .into_iter()
        .rev()
        .find(|&end| ends_literal(bytes, end))
}

fn decimal(bytes: &[u8], at: usize) -> Option<usize> {
    let mut mantissas = Vec::new();

    if matches!(bytes.get(at), Some(b'1'..=b'9')) && starts_word(bytes, at) {
        for integer in group_ends(bytes, at, is_digit).into_iter().rev() {
            if bytes.get(integer) == Some(&b'.') {
                mantissas.extend(group_ends(bytes, integer + 1, is_digit).into_iter().rev());
                mantissas.push(integer + 1);
            }
            mantissas.push(integer);
        }
    } else if bytes.get(at) == Some(&b'.') {
        mantissas.extend(group_ends(bytes, at + 1, is_digit).into_iter().rev());
    }

    mantissas.into_iter().find_map(|mantissa| {
        exponent_ends(bytes, mantissa)
            .into_iter()
            .rev()
            .chain(iter::once(mantissa))
            .find(|&end| ends_literal(bytes, end))
    })
}

fn zero(bytes: &[u8], at: usize) -> Option<usize> {
    (bytes.get(at) == Some(&b'0') && starts_word(bytes, at) && ends_literal(bytes, at + 1))
        .then_some(at + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whole(text: &str) -> bool {
        find_number(text, 0) == Some(0..text.len())
    }

    #[test]
    fn test_accepts_grouped_literals() {
        for text in [
            "-1",
            "0",
            "654_321",
            "5_43_21",
            "1_2e10",
            "12e1_0",
            "1e-5",
            "3.14_15",
            "3_1.4_15",
            ".5",
            "1.",
            "0x8765_4321",
            "0x123_1234_1234_1234",
            "0X123",
            "0xfff_fff",
        ] {
            assert!(whole(text), "expected {text:?} to be one literal");
        }
    }

    #[test]
    fn test_rejects_misplaced_underscores() {
        for text in [
            "1234_",
            "12__34",
            "12_e34",
            "12e_34",
            "3.1415_",
            "3__1.4__15",
            "1._2",
            "1.2e_12",
            "1._",
            "0x1234__1234__1234__123",
            "0x_1",
            "01",
        ] {
            assert!(!whole(text), "expected {text:?} not to be one literal");
        }
    }

    #[test]
    fn test_backtracks_to_shorter_literal() {
        // `1.` is followed by a word character, `1` is followed by a dot.
        assert_eq!(find_number("1.x", 0), Some(0..1));
        assert_eq!(find_number("1.2e_12", 0), Some(0..1));
    }

    #[test]
    fn test_zero_point_splits_in_two() {
        assert_eq!(find_number("0.5", 0), Some(0..1));
        assert_eq!(find_number("0.5", 1), Some(1..3));
    }

    #[test]
    fn test_not_inside_identifiers() {
        assert_eq!(find_number("id$1", 0), None);
        assert_eq!(find_number("uint256", 0), None);
        assert_eq!(find_number("x1 2", 0), Some(3..4));
    }

    #[test]
    fn test_sign_is_part_of_literal() {
        assert_eq!(find_number("a = -42;", 0), Some(4..7));
    }
}
