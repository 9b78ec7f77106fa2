use serde::Serialize;
use std::fmt;
use std::ops::Range;

use crate::error::ValidationError;

/// Inclusive, 1-indexed page range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of pages in the range
    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// 0-based page indices covered by the range
    pub fn indices(&self) -> Range<usize> {
        self.start - 1..self.end
    }

    fn check(self, total: usize) -> Result<Self, ValidationError> {
        if self.start == 0 || self.start > self.end || self.end > total {
            return Err(ValidationError::RangeOutOfBounds {
                start: self.start,
                end: self.end,
                total,
            });
        }
        Ok(self)
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Parse a range list such as `"1-3,4-10,12"` against a page total.
///
/// Ranges may overlap. Every range is validated before any is returned.
pub fn parse_ranges(input: &str, total: usize) -> Result<Vec<PageRange>, ValidationError> {
    let mut ranges = Vec::new();
    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let range = match token.split_once('-') {
            Some((a, b)) => PageRange::new(parse_page(a, token)?, parse_page(b, token)?),
            None => {
                let page = parse_page(token, token)?;
                PageRange::new(page, page)
            }
        };
        ranges.push(range.check(total)?);
    }
    if ranges.is_empty() {
        return Err(ValidationError::InvalidRange(input.to_string()));
    }
    Ok(ranges)
}

fn parse_page(value: &str, token: &str) -> Result<usize, ValidationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidRange(token.to_string()))
}
