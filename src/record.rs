use std::iter::FusedIterator;

use itertools::Itertools;
use num_bigint::BigInt;

use crate::error::ParseError;

/// Lazily scans text for signed decimal integers, i.e. substrings matching `-?[0-9]+`.
///
/// The scan is finite and [`Clone`]; cloning it mid-way restarts from that point.
#[derive(Clone, Debug)]
pub struct SignedIntegers<'a> {
    rest: &'a str,
}

/// Begin scanning `text` for signed integers. See [`SignedIntegers`].
pub fn signed_integers(text: &str) -> SignedIntegers<'_> {
    SignedIntegers { rest: text }
}

impl Iterator for SignedIntegers<'_> {
    type Item = BigInt;

    fn next(&mut self) -> Option<BigInt> {
        let rest = self.rest;
        let bytes = rest.as_bytes();
        let start = bytes.iter().position(u8::is_ascii_digit)?;
        let end = bytes[start..].iter()
            .position(|b| !b.is_ascii_digit())
            .map_or(bytes.len(), |len| start + len);
        // a minus sign only counts when it touches the digits
        let negative = start > 0 && bytes[start - 1] == b'-';

        let magnitude = BigInt::parse_bytes(&bytes[start..end], 10)?;
        self.rest = &rest[end..];

        Some(if negative { -magnitude } else { magnitude })
    }
}

impl FusedIterator for SignedIntegers<'_> {}

/// The integers of one line of puzzle text, in order of appearance.
///
/// Records carry no meaning of their own; callers assign positions, e.g. `0..3` as a position and `3..6` as a velocity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumericRecord {
    line: usize,
    values: Vec<BigInt>,
}

impl NumericRecord {
    /// Scan `text`, which sits on 1-based line `line` of its input.
    ///
    /// A line without any integer is rejected.
    pub fn parse(line: usize, text: &str) -> Result<Self, ParseError> {
        let values = signed_integers(text).collect_vec();
        if values.is_empty() {
            return Err(ParseError::NoNumbers { line });
        }

        Ok(Self { line, values })
    }

    /// The line this record was read from.
    pub fn line(&self) -> usize {
        self.line
    }

    /// All integers of the record.
    pub fn values(&self) -> &[BigInt] {
        &self.values
    }

    /// The record as exactly `N` integers.
    pub fn exactly<const N: usize>(&self) -> Result<[BigInt; N], ParseError> {
        if self.values.len() != N {
            return Err(ParseError::TokenCount { line: self.line, expected: N, found: self.values.len() });
        }

        Ok(std::array::from_fn(|i| self.values[i].clone()))
    }
}
