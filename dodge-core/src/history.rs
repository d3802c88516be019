//! Bounded, chronologically ordered observation buffer.
//!
//! One `Sample` is recorded per tick; once capacity is reached the oldest
//! entries are evicted. Out-of-order arrival is a caller bug and the sample
//! is dropped with a warning rather than silently breaking ordering.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::DEFAULT_HISTORY_CAPACITY;

/// One observation: where the dot and the cursor were at a given time.
/// Coordinates are clamped into the arena by the producer before insertion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(rename = "timestamp")]
    pub timestamp_ms: u64,
    #[serde(rename = "dotX")]
    pub dot_x: f64,
    #[serde(rename = "dotY")]
    pub dot_y: f64,
    #[serde(rename = "mouseX")]
    pub mouse_x: f64,
    #[serde(rename = "mouseY")]
    pub mouse_y: f64,
}

impl Sample {
    pub fn is_finite(&self) -> bool {
        self.dot_x.is_finite()
            && self.dot_y.is_finite()
            && self.mouse_x.is_finite()
            && self.mouse_y.is_finite()
    }
}

#[derive(Clone, Debug)]
pub struct History {
    samples: VecDeque<Sample>,
    capacity: usize,
    dropped: u64,
}

impl History {
    /// Capacity is clamped to at least one slot.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Records a sample, evicting the oldest once past capacity. Returns
    /// false (and counts the drop) for out-of-order timestamps or non-finite
    /// coordinates; equal timestamps are accepted.
    pub fn append(&mut self, sample: Sample) -> bool {
        if !sample.is_finite() {
            warn!(timestamp_ms = sample.timestamp_ms, "dropping non-finite observation");
            self.dropped += 1;
            return false;
        }
        if let Some(last) = self.samples.back() {
            if sample.timestamp_ms < last.timestamp_ms {
                warn!(
                    timestamp_ms = sample.timestamp_ms,
                    last_ms = last.timestamp_ms,
                    "dropping out-of-order observation"
                );
                self.dropped += 1;
                return false;
            }
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
        true
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Observations dropped at the buffer boundary since construction.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Oldest-first iteration over the recorded window.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Defensive copy of the current window, oldest first. Callers can never
    /// mutate recorded history through the returned vector.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(t: u64) -> Sample {
        Sample {
            timestamp_ms: t,
            dot_x: 400.0,
            dot_y: 400.0,
            mouse_x: 100.0,
            mouse_y: 100.0,
        }
    }

    #[test]
    fn keeps_only_the_most_recent_capacity_samples() {
        let mut history = History::new(4);
        for t in 0..10 {
            assert!(history.append(sample(t)));
        }
        let window = history.snapshot();
        assert_eq!(window.len(), 4);
        let times: Vec<u64> = window.iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(times, vec![6, 7, 8, 9]);
    }

    #[test]
    fn drops_out_of_order_timestamps() {
        let mut history = History::new(8);
        assert!(history.append(sample(100)));
        assert!(!history.append(sample(99)));
        assert_eq!(history.len(), 1);
        assert_eq!(history.dropped(), 1);
        // Equal timestamps are non-decreasing, so they stay.
        assert!(history.append(sample(100)));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn drops_non_finite_coordinates() {
        let mut history = History::new(8);
        let mut bad = sample(10);
        bad.mouse_x = f64::NAN;
        assert!(!history.append(bad));
        assert!(history.is_empty());
        assert_eq!(history.dropped(), 1);
    }

    #[test]
    fn snapshot_is_a_copy() {
        let mut history = History::new(8);
        history.append(sample(1));
        let mut window = history.snapshot();
        window[0].dot_x = -1.0;
        assert_eq!(history.latest().unwrap().dot_x, 400.0);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut history = History::new(0);
        assert!(history.append(sample(1)));
        assert!(history.append(sample(2)));
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().unwrap().timestamp_ms, 2);
    }
}
