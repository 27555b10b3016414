//! Fixed-capacity sliding accumulator with an O(1) running sum

use std::collections::VecDeque;

/// Holds at most `capacity` samples. Pushing into a full window evicts the
/// oldest sample first, then adds the newest, keeping the running sum in step.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    capacity: usize,
    samples: VecDeque<f64>,
    sum: f64,
}

impl SlidingWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
            sum: 0.0,
        }
    }

    /// Add a sample, returning the evicted one when the window was full
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let evicted = if self.samples.len() == self.capacity {
            let oldest = self.samples.pop_front();
            if let Some(old) = oldest {
                self.sum -= old;
            }
            oldest
        } else {
            None
        };
        self.samples.push_back(value);
        self.sum += value;
        evicted
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            None
        } else {
            Some(self.sum / self.samples.len() as f64)
        }
    }

    /// Samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }
}
