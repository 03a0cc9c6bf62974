//! Bounded rolling history channels.
//!
//! Samples live in one contiguous buffer so indicators can borrow the whole
//! retained history as an oldest-first slice. Evicted samples are compacted
//! away in bulk once they fill a full capacity's worth of the buffer.

pub const DEFAULT_MAX_BARS_BACK: usize = 5000;

/// Insertion-ordered samples capped at `capacity`; the oldest sample is evicted first.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingSeries<T = f64> {
    buffer: Vec<T>,
    start: usize,
    capacity: usize,
}

impl<T: Clone> RollingSeries<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Vec::with_capacity(capacity.min(1024)),
            start: 0,
            capacity,
        }
    }

    pub fn push(&mut self, value: T) {
        self.buffer.push(value);
        if self.len() > self.capacity {
            self.start += 1;
            if self.start >= self.capacity {
                self.buffer.drain(..self.start);
                self.start = 0;
            }
        }
    }

    /// Replace the most recent sample, or push if the series is empty.
    pub fn replace_last(&mut self, value: T) {
        if self.is_empty() {
            self.push(value);
        } else if let Some(last) = self.buffer.last_mut() {
            *last = value;
        }
    }

    /// Sample `offset` bars back from the most recent one (0 = current).
    pub fn get(&self, offset: usize) -> Option<&T> {
        let window = self.window();
        window.len().checked_sub(offset + 1).map(|i| &window[i])
    }

    pub fn last(&self) -> Option<&T> {
        self.window().last()
    }

    pub fn last_mut(&mut self) -> Option<&mut T> {
        if self.is_empty() {
            None
        } else {
            self.buffer.last_mut()
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len() - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest-first view of the retained history.
    pub fn window(&self) -> &[T] {
        &self.buffer[self.start..]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.window().iter()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.window().to_vec()
    }
}

/// A rolling series written at most once per bar.
///
/// `record` with the stamp of the bar already holding the latest sample
/// overwrites it; a new stamp appends. Bars on which nothing is recorded
/// leave no sample.
#[derive(Debug, Clone, PartialEq)]
pub struct StampedSeries<T = f64> {
    series: RollingSeries<T>,
    stamp: Option<usize>,
}

impl<T: Clone> StampedSeries<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            series: RollingSeries::new(capacity),
            stamp: None,
        }
    }

    pub fn record(&mut self, stamp: usize, value: T) {
        if self.stamp == Some(stamp) {
            self.series.replace_last(value);
        } else {
            self.series.push(value);
            self.stamp = Some(stamp);
        }
    }

    pub fn stamp(&self) -> Option<usize> {
        self.stamp
    }

    pub fn series(&self) -> &RollingSeries<T> {
        &self.series
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut s = RollingSeries::new(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            s.push(v);
        }
        assert_eq!(s.len(), 3);
        assert_eq!(s.to_vec(), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn get_reads_back_from_latest() {
        let mut s = RollingSeries::new(10);
        for v in [1.0, 2.0, 3.0] {
            s.push(v);
        }
        assert_eq!(s.get(0), Some(&3.0));
        assert_eq!(s.get(2), Some(&1.0));
        assert_eq!(s.get(3), None);
    }

    #[test]
    fn replace_last_overwrites_or_pushes() {
        let mut s: RollingSeries<f64> = RollingSeries::new(4);
        s.replace_last(1.0);
        assert_eq!(s.len(), 1);
        s.push(2.0);
        s.replace_last(5.0);
        assert_eq!(s.to_vec(), vec![1.0, 5.0]);
    }

    #[test]
    fn window_is_oldest_first() {
        let mut s = RollingSeries::new(2);
        s.push(1.0);
        s.push(2.0);
        s.push(3.0);
        assert_eq!(s.window(), &[2.0, 3.0]);
    }

    #[test]
    fn long_runs_stay_bounded_and_ordered() {
        let mut s = RollingSeries::new(5);
        for v in 0..1000 {
            s.push(v);
        }
        assert_eq!(s.window(), &[995, 996, 997, 998, 999]);
        assert!(s.buffer.len() <= 2 * s.capacity());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut s = RollingSeries::new(0);
        s.push(1.0);
        s.push(2.0);
        assert_eq!(s.capacity(), 1);
        assert_eq!(s.to_vec(), vec![2.0]);
    }

    #[test]
    fn stamped_series_overwrites_within_a_bar() {
        let mut s = StampedSeries::new(10);
        s.record(0, 1.0);
        s.record(0, 2.0);
        s.record(1, 3.0);
        s.record(3, 4.0);
        assert_eq!(s.series().to_vec(), vec![2.0, 3.0, 4.0]);
        assert_eq!(s.stamp(), Some(3));
    }
}
