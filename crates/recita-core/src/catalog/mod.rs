//! Partition of the global verse numbering into chapters.
//!
//! A [`Catalog`] is built once from an ordered table of group sizes. It keeps
//! the inclusive global range of each group and maps a 1-based global index to
//! its group and 1-based offset within that group.

mod table;

pub use table::{CHAPTER_COUNT, TOTAL_VERSES, VERSE_COUNTS};

/// Errors from building or querying a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionError {
    #[error("group table has {actual} entries, expected {expected}")]
    GroupCount { expected: usize, actual: usize },
    #[error("group table sums to {actual}, expected {expected}")]
    Total { expected: u64, actual: u64 },
    #[error("group {group} is empty")]
    EmptyGroup { group: u32 },
    #[error("global index out of range: {index} (valid 1..={total})")]
    OutOfRange { index: u32, total: u32 },
}

/// Location of one item: 1-based group number and 1-based offset within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub group: u32,
    pub offset: u32,
}

/// Contiguous inclusive global range covered by one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupRange {
    pub group: u32,
    pub start: u32,
    pub end: u32,
}

impl GroupRange {
    pub fn size(&self) -> u32 {
        self.end - self.start + 1
    }

    pub fn contains(&self, index: u32) -> bool {
        self.start <= index && index <= self.end
    }
}

/// Validated group-size table with precomputed prefix-sum ranges.
#[derive(Debug, Clone)]
pub struct Catalog {
    ranges: Vec<GroupRange>,
    total: u32,
}

impl Catalog {
    /// Builds the partition, checking table length and sum.
    pub fn new(
        sizes: &[u32],
        expected_groups: usize,
        expected_total: u32,
    ) -> Result<Self, PartitionError> {
        if sizes.len() != expected_groups {
            return Err(PartitionError::GroupCount {
                expected: expected_groups,
                actual: sizes.len(),
            });
        }
        let sum: u64 = sizes.iter().map(|&n| u64::from(n)).sum();
        if sum != u64::from(expected_total) {
            return Err(PartitionError::Total {
                expected: u64::from(expected_total),
                actual: sum,
            });
        }

        let mut ranges = Vec::with_capacity(sizes.len());
        let mut running = 0u32;
        for (i, &count) in sizes.iter().enumerate() {
            let group = i as u32 + 1;
            if count == 0 {
                return Err(PartitionError::EmptyGroup { group });
            }
            ranges.push(GroupRange {
                group,
                start: running + 1,
                end: running + count,
            });
            running += count;
        }

        Ok(Self {
            ranges,
            total: running,
        })
    }

    /// The canonical 114-chapter verse table.
    pub fn verses() -> Result<Self, PartitionError> {
        Self::new(&VERSE_COUNTS, CHAPTER_COUNT, TOTAL_VERSES)
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn ranges(&self) -> &[GroupRange] {
        &self.ranges
    }

    /// Maps a 1-based global index to its group and offset.
    ///
    /// Binary search over range ends; an index equal to a group's `end`
    /// belongs to that group.
    pub fn locate(&self, index: u32) -> Result<Position, PartitionError> {
        if index == 0 || index > self.total {
            return Err(PartitionError::OutOfRange {
                index,
                total: self.total,
            });
        }
        let slot = self.ranges.partition_point(|r| r.end < index);
        let range = self.ranges[slot];
        debug_assert!(range.contains(index));
        Ok(Position {
            group: range.group,
            offset: index - range.start + 1,
        })
    }
}
