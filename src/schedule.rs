//! The ping delay schedule a master session drives.
//!
//! An ordered, fixed sequence of positive delays in seconds. The schedule is
//! owned by one master session for its lifetime, consumed front to back, and
//! never mutated.

use crate::DEFAULT_DELAYS;

/// Ordered sequence of ping delays, in seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelaySchedule {
    delays: Vec<i32>,
}

impl DelaySchedule {
    /// Build a schedule from raw delay values.
    ///
    /// The sequence is truncated at the first non-positive value, mirroring
    /// the wire-level `-1` sentinel convention, so `[15, 30, -1]` and
    /// `[15, 30]` describe the same schedule.
    pub fn new<I: IntoIterator<Item = i32>>(raw: I) -> Self {
        let delays = raw.into_iter().take_while(|&d| d > 0).collect();
        Self { delays }
    }

    /// The delays in probing order.
    pub fn delays(&self) -> &[i32] {
        &self.delays
    }

    /// Number of probe rounds this schedule describes.
    pub fn len(&self) -> usize {
        self.delays.len()
    }

    /// True if the schedule describes no rounds at all.
    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }

    /// Iterate the delays in probing order.
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.delays.iter().copied()
    }
}

impl Default for DelaySchedule {
    fn default() -> Self {
        Self::new(DEFAULT_DELAYS)
    }
}
