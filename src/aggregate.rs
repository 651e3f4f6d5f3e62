//! Running Average
//!
//! Sum and count are accumulated per shard, partial states are merged, and the mean is only
//! computed at `finalize`. The sum is kept at 128 bits so that no realistic number of `i64`
//! inputs can overflow it.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningAverage {
    pub sum: i128,
    pub count: u64,
}

impl RunningAverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, value: i64) {
        self.sum += i128::from(value);
        self.count += 1;
    }

    pub fn merge(&mut self, other: &RunningAverage) {
        self.sum += other.sum;
        self.count += other.count;
    }

    /// Integer mean truncated toward zero, `None` when nothing was accumulated.
    pub fn finalize(&self) -> Option<i64> {
        if self.count == 0 {
            return None;
        }
        // A mean of i64 values always fits back into i64
        Some((self.sum / i128::from(self.count)) as i64)
    }
}
