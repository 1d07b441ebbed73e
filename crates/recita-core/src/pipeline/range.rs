//! Requested global index range (`--start`, `--end`, `--limit`).

/// Rejected before any work starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid range {start}..={end} (valid 1..={total}, start <= end)")]
pub struct RangeError {
    pub start: u32,
    pub end: u32,
    pub total: u32,
}

/// Validated inclusive range of global indices, optionally truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    start: u32,
    end: u32,
}

impl IndexRange {
    /// `limit` keeps only the first N indices; `None` or `Some(0)` means no limit.
    pub fn new(start: u32, end: u32, limit: Option<u32>, total: u32) -> Result<Self, RangeError> {
        if start < 1 || end > total || start > end {
            return Err(RangeError { start, end, total });
        }
        let end = match limit {
            Some(n) if n > 0 => end.min(start.saturating_add(n - 1)),
            _ => end,
        };
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of indices; never zero.
    pub fn count(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    pub fn indices(&self) -> Vec<u32> {
        (self.start..=self.end).collect()
    }
}
