use serde::{Deserialize, Serialize};

/// The genomic region a plot currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocusState {
    pub chr: String,
    pub start: u64,
    pub end: u64,
}

impl LocusState {
    pub fn new(chr: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            chr: chr.into(),
            start,
            end,
        }
    }

    #[inline(always)]
    pub fn span(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Inclusive containment of a single position.
    pub fn contains(&self, position: u64) -> bool {
        position >= self.start && position <= self.end
    }

    /// Whether the closed interval `[start, end]` touches the region.
    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        start <= self.end && end >= self.start
    }
}

impl Default for LocusState {
    fn default() -> Self {
        Self {
            chr: "1".to_string(),
            start: 0,
            end: 0,
        }
    }
}
