/// Fixed-capacity rolling window of RSSI samples.
///
/// Samples are written in place at a cursor that wraps at `N`. A separate
/// written-count gives partial averages during the first fill, so a genuine
/// 0 dBm reading is a sample like any other rather than an empty slot.
use core::fmt;

/// Statistics query failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsError {
    /// Nothing has been recorded yet
    NoSamples,
}

impl fmt::Display for StatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsError::NoSamples => f.write_str("no rssi samples yet"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RssiBuffer<const N: usize> {
    samples: [i16; N],
    /// Next write slot, always < N
    cursor: usize,
    /// Valid samples, saturates at N
    count: usize,
}

impl<const N: usize> RssiBuffer<N> {
    pub const fn new() -> Self {
        assert!(N > 0, "RssiBuffer needs a non-zero capacity");
        Self {
            samples: [0; N],
            cursor: 0,
            count: 0,
        }
    }

    /// Record a sample, overwriting the oldest once the window is full.
    pub fn push(&mut self, sample: i16) {
        self.samples[self.cursor] = sample;
        self.cursor = (self.cursor + 1) % N;
        if self.count < N {
            self.count += 1;
        }
    }

    /// Integer mean of the valid samples, truncated toward zero.
    pub fn average(&self) -> Result<i16, StatsError> {
        if self.count == 0 {
            return Err(StatsError::NoSamples);
        }
        // Until the first wrap the valid samples are exactly 0..count.
        let total: i32 = self.samples[..self.count]
            .iter()
            .map(|&s| i32::from(s))
            .sum();
        // The mean of i16 values always fits back into i16.
        Ok((total / self.count as i32) as i16)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == N
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for RssiBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Empty / partial fill ────────────────────────────────────────

    #[test]
    fn average_of_empty_buffer_fails() {
        let buf = RssiBuffer::<20>::new();
        assert_eq!(buf.average(), Err(StatsError::NoSamples));
        assert!(buf.is_empty());
    }

    #[test]
    fn partial_fill_averages_written_samples() {
        let mut buf = RssiBuffer::<20>::new();
        buf.push(-40);
        buf.push(-42);
        assert_eq!(buf.average(), Ok(-41));
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn single_sample_is_its_own_average() {
        let mut buf = RssiBuffer::<20>::new();
        buf.push(-77);
        assert_eq!(buf.average(), Ok(-77));
    }

    #[test]
    fn average_truncates_toward_zero() {
        let mut buf = RssiBuffer::<20>::new();
        buf.push(-40);
        buf.push(-41);
        // -81 / 2 = -40.5 → -40
        assert_eq!(buf.average(), Ok(-40));
    }

    #[test]
    fn zero_reading_counts_as_a_sample() {
        let mut buf = RssiBuffer::<20>::new();
        buf.push(-40);
        buf.push(0);
        buf.push(-20);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.average(), Ok(-20));
    }

    // ── Wraparound ──────────────────────────────────────────────────

    #[test]
    fn full_window_averages_all_slots() {
        let mut buf = RssiBuffer::<4>::new();
        for s in [-10, -20, -30, -40] {
            buf.push(s);
        }
        assert!(buf.is_full());
        assert_eq!(buf.average(), Ok(-25));
    }

    #[test]
    fn wraparound_keeps_most_recent_window() {
        let mut buf = RssiBuffer::<4>::new();
        for s in [-90, -90, -90, -90, -10, -20] {
            buf.push(s);
        }
        // Window now holds -10, -20, -90, -90
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.average(), Ok(-52));
    }

    #[test]
    fn many_wraps_track_last_n() {
        let mut buf = RssiBuffer::<20>::new();
        for i in 0..137i16 {
            buf.push(-(i % 50) - 1);
        }
        let expected: i32 = (117..137i16).map(|i| i32::from(-(i % 50) - 1)).sum::<i32>() / 20;
        assert_eq!(buf.average(), Ok(expected as i16));
        assert_eq!(buf.len(), 20);
    }

    #[test]
    fn extreme_values_do_not_overflow() {
        let mut buf = RssiBuffer::<20>::new();
        for _ in 0..20 {
            buf.push(i16::MIN);
        }
        assert_eq!(buf.average(), Ok(i16::MIN));
    }

    #[test]
    fn capacity_is_const_parameter() {
        assert_eq!(RssiBuffer::<20>::new().capacity(), 20);
        assert_eq!(RssiBuffer::<7>::default().capacity(), 7);
    }
}
