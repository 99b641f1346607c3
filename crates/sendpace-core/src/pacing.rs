//! Randomized inter-send gap sampling.
//!
//! Consecutive sends from one mailbox are spaced by a gap drawn from a
//! configured range. Production sampling is uniform with fresh entropy
//! per call; the deterministic policies exist so tests and replays can
//! pin cadences.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::prelude::*;

use crate::error::ValidationError;

/// Longest configurable gap: one minute short of a full UTC day. A
/// longer gap could never land a same-day slot.
pub const MAX_GAP_MINUTES: i64 = 1439;

/// Inclusive gap range in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapRange {
    pub min_minutes: i64,
    pub max_minutes: i64,
}

impl GapRange {
    /// Build a validated range. Both bounds are inclusive and must be
    /// positive with `min_minutes <= max_minutes`; `max_minutes` is
    /// capped at [`MAX_GAP_MINUTES`].
    pub fn new(min_minutes: i64, max_minutes: i64) -> Result<Self, ValidationError> {
        if min_minutes < 1 || max_minutes < min_minutes || max_minutes > MAX_GAP_MINUTES {
            return Err(ValidationError::InvalidGapRange {
                min: min_minutes,
                max: max_minutes,
            });
        }
        Ok(Self {
            min_minutes,
            max_minutes,
        })
    }

    /// Whether `minutes` falls inside the range.
    pub fn contains(&self, minutes: i64) -> bool {
        minutes >= self.min_minutes && minutes <= self.max_minutes
    }
}

/// Draws the pause inserted between consecutive sends from one mailbox.
///
/// Implementations must sample independently on every call; no state is
/// shared across allocations.
pub trait GapPolicy: Send + Sync {
    /// Next gap in whole minutes, drawn from `range` inclusive.
    fn next_gap(&self, range: GapRange) -> i64;
}

/// Uniform sampling over the inclusive range, fresh entropy per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformGapPolicy;

impl GapPolicy for UniformGapPolicy {
    fn next_gap(&self, range: GapRange) -> i64 {
        rand::thread_rng().gen_range(range.min_minutes..=range.max_minutes)
    }
}

/// Always returns the same gap.
#[derive(Debug, Clone, Copy)]
pub struct FixedGapPolicy(pub i64);

impl GapPolicy for FixedGapPolicy {
    fn next_gap(&self, _range: GapRange) -> i64 {
        self.0
    }
}

/// Replays a scripted sequence of gaps, cycling when exhausted.
#[derive(Debug)]
pub struct SequenceGapPolicy {
    gaps: Vec<i64>,
    next: AtomicUsize,
}

impl SequenceGapPolicy {
    pub fn new(gaps: Vec<i64>) -> Self {
        Self {
            gaps,
            next: AtomicUsize::new(0),
        }
    }
}

impl GapPolicy for SequenceGapPolicy {
    fn next_gap(&self, range: GapRange) -> i64 {
        if self.gaps.is_empty() {
            return range.min_minutes;
        }
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.gaps.len();
        self.gaps[idx]
    }
}
