//! Split planning: partitions `[0, row_count)` into contiguous ranges.

use crate::range::RowRange;
use tabulon_common::wire::SplitsRequest;
use tabulon_common::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPolicy {
    /// `k` ranges of `ceil(row_count / k)` rows; trailing empty ranges are dropped.
    FixedCount(usize),
    /// Consecutive ranges of `s` rows, the last one truncated.
    FixedSize(usize),
    /// One range over the whole table.
    Single,
}

impl SplitPolicy {
    /// Picks the policy a split request asks for, falling back to `default`.
    ///
    /// `splitCount` wins over `splitSize`. `maxSplitCount` does not pick a
    /// policy; see [`max_splits`].
    pub fn from_request(request: &SplitsRequest, default: SplitPolicy) -> Result<Self> {
        let policy = match (request.split_count, request.split_size) {
            (Some(count), _) => SplitPolicy::FixedCount(count),
            (None, Some(size)) => SplitPolicy::FixedSize(size),
            (None, None) => default,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            SplitPolicy::FixedCount(0) => {
                Err(Error::InvalidSplitPolicy("split count must be positive".to_string()))
            }
            SplitPolicy::FixedSize(0) => {
                Err(Error::InvalidSplitPolicy("split size must be positive".to_string()))
            }
            _ => Ok(()),
        }
    }
}

pub fn plan(row_count: usize, policy: SplitPolicy) -> Result<Vec<RowRange>> {
    policy.validate()?;
    if row_count == 0 {
        return Ok(Vec::new());
    }
    let size = match policy {
        SplitPolicy::FixedCount(count) => row_count.div_ceil(count),
        SplitPolicy::FixedSize(size) => size,
        SplitPolicy::Single => row_count,
    };
    Ok(chunk(row_count, size))
}

fn chunk(row_count: usize, size: usize) -> Vec<RowRange> {
    (0..row_count)
        .step_by(size)
        .map(|start| RowRange::new(start, start.saturating_add(size).min(row_count)))
        .collect()
}

/// The cap `maxSplitCount` puts on the number of splits, if any.
pub fn max_splits(request: &SplitsRequest) -> Result<Option<usize>> {
    match request.max_split_count {
        Some(0) => Err(Error::InvalidSplitPolicy("max split count must be positive".to_string())),
        max => Ok(max),
    }
}

/// Plans with `policy`, then widens the splits to `ceil(row_count / max)` rows
/// when the policy would produce more than `max_splits` of them.
pub fn plan_capped(row_count: usize, policy: SplitPolicy, max_splits: Option<usize>) -> Result<Vec<RowRange>> {
    let ranges = plan(row_count, policy)?;
    match max_splits {
        Some(max) if ranges.len() > max => plan(row_count, SplitPolicy::FixedCount(max)),
        _ => Ok(ranges),
    }
}
