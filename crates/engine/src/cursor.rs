//! Page cursor: narrows a split into pages.
//!
//! No state is kept between calls. Whatever remains of a split after a page
//! travels back to the caller as a continuation token, which is itself a
//! [`RowRange`] token.

use crate::range::RowRange;
use tabulon_common::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagePolicy {
    /// First call returns the lower half, the continuation returns the rest.
    /// Every split completes in at most two fetches.
    #[default]
    Halve,
    /// The whole split in one page.
    Whole,
    /// At most `max_rows` split rows per page, continuing from the cut.
    /// Function tables count as one split row, so their output is never cut.
    Bounded { max_rows: usize },
}

/// Rows to return for one call, and the token for the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStep {
    pub rows: RowRange,
    pub next_token: Option<String>,
}

impl PageStep {
    fn terminal(rows: RowRange) -> Self {
        Self { rows, next_token: None }
    }

    fn cut(remaining: RowRange, at: usize) -> Self {
        if at >= remaining.end {
            return Self::terminal(remaining);
        }
        Self {
            rows: RowRange::new(remaining.start, at),
            next_token: Some(RowRange::new(at, remaining.end).to_token()),
        }
    }

    pub fn is_last(&self) -> bool {
        self.next_token.is_none()
    }
}

pub fn advance(split: RowRange, continuation_token: Option<&str>, policy: PagePolicy) -> Result<PageStep> {
    match continuation_token {
        None => Ok(first_page(split, policy)),
        Some(token) => {
            let remaining = RowRange::parse_token(token)?;
            if !split.contains_range(&remaining) {
                return Err(Error::malformed_token(
                    token,
                    format!("continuation lies outside split {}", split),
                ));
            }
            Ok(resume(remaining, policy))
        }
    }
}

fn first_page(split: RowRange, policy: PagePolicy) -> PageStep {
    match policy {
        PagePolicy::Halve if split.len() > 1 => {
            let mid = split.start + split.len() / 2;
            PageStep::cut(split, mid)
        }
        PagePolicy::Halve | PagePolicy::Whole => PageStep::terminal(split),
        PagePolicy::Bounded { max_rows } => bounded(split, max_rows),
    }
}

fn resume(remaining: RowRange, policy: PagePolicy) -> PageStep {
    match policy {
        PagePolicy::Halve | PagePolicy::Whole => PageStep::terminal(remaining),
        PagePolicy::Bounded { max_rows } => bounded(remaining, max_rows),
    }
}

fn bounded(remaining: RowRange, max_rows: usize) -> PageStep {
    let at = remaining.start.saturating_add(max_rows.max(1));
    PageStep::cut(remaining, at)
}
