//! Row ranges and their token form.
//!
//! A range `[start, end)` is written as `"<start>-<end>"`. The same token is
//! used as a split identifier and as a continuation token.

use std::fmt;
use std::str::FromStr;
use tabulon_common::{Error, Result};

const SEPARATOR: char = '-';

/// Half-open interval of row indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    /// Callers must keep `start <= end`; untrusted input goes through [`RowRange::parse_token`].
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "range start {} past end {}", start, end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when `other` lies entirely inside this range.
    pub fn contains_range(&self, other: &RowRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn to_token(&self) -> String {
        encode(self.start, self.end)
    }

    pub fn parse_token(token: &str) -> Result<Self> {
        let (start, end) = decode(token)?;
        Ok(Self { start, end })
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.start, SEPARATOR, self.end)
    }
}

impl FromStr for RowRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_token(s)
    }
}

pub fn encode(start: usize, end: usize) -> String {
    format!("{}{}{}", start, SEPARATOR, end)
}

pub fn decode(token: &str) -> Result<(usize, usize)> {
    let mut parts = token.split(SEPARATOR);
    let (start, end) = match (parts.next(), parts.next(), parts.next()) {
        (Some(start), Some(end), None) => (start, end),
        _ => return Err(Error::malformed_token(token, "expected exactly one '-' separator")),
    };
    let start = parse_bound(token, start, "start")?;
    let end = parse_bound(token, end, "end")?;
    if start > end {
        return Err(Error::malformed_token(token, "start is greater than end"));
    }
    Ok((start, end))
}

// `usize::from_str` accepts a leading '+', which is not part of the token grammar.
fn parse_bound(token: &str, digits: &str, which: &str) -> Result<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::malformed_token(
            token,
            format!("{} is not a non-negative integer", which),
        ));
    }
    digits
        .parse::<usize>()
        .map_err(|e| Error::malformed_token(token, format!("{} out of range: {}", which, e)))
}
