//! Real-time stream smoothing
//!
//! Recorded pointer samples are jittery. This filter smooths a stream of
//! values as they arrive: each pushed value joins a bounded buffer and the
//! return value is the (optionally recency-weighted) mean of the buffer.
//! The x and y coordinate streams each get their own filter, reset at the
//! start of every stroke path.

use std::collections::VecDeque;

/// Number of user-facing smoothing levels (0 = off).
pub const MAX_SMOOTH_LEVEL: u8 = 9;

/// Buffer samples added per smoothing level; level 9 → window of 36.
const SAMPLES_PER_LEVEL: usize = 4;

/// A windowed moving-average filter over a stream of values.
#[derive(Debug, Clone)]
pub struct StreamSmoother {
    window: usize,
    buffer: VecDeque<f32>,
    weighted: bool,
}

impl StreamSmoother {
    /// A filter with an explicit window size. Zero disables smoothing.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            buffer: VecDeque::new(),
            weighted: true,
        }
    }

    /// A filter from a user-facing level 0-9; levels clamp, and each level
    /// widens the window by four samples.
    pub fn from_level(level: u8) -> Self {
        Self::new(level.min(MAX_SMOOTH_LEVEL) as usize * SAMPLES_PER_LEVEL)
    }

    /// Equal-weight averaging instead of recency-weighted.
    pub fn unweighted(mut self) -> Self {
        self.weighted = false;
        self
    }

    /// Feed one value, get the smoothed value back.
    ///
    /// With a zero window the value passes straight through, so callers
    /// can push unconditionally.
    pub fn push(&mut self, value: f32) -> f32 {
        if self.window == 0 {
            return value;
        }
        self.buffer.push_back(value);
        if self.buffer.len() > self.window {
            self.buffer.pop_front();
        }
        if self.weighted {
            // most recent sample weighted highest
            let mut sum = 0.0;
            let mut weight_sum = 0.0;
            for (i, v) in self.buffer.iter().enumerate() {
                let w = (i + 1) as f32;
                sum += w * v;
                weight_sum += w;
            }
            sum / weight_sum
        } else {
            self.buffer.iter().sum::<f32>() / self.buffer.len() as f32
        }
    }

    /// Drop all buffered samples; the next push starts a fresh stream.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_window_passes_through() {
        let mut s = StreamSmoother::new(0);
        assert_eq!(s.push(7.5), 7.5);
        assert_eq!(s.push(-2.0), -2.0);
    }

    #[test]
    fn first_sample_is_unchanged() {
        let mut s = StreamSmoother::new(4);
        assert_eq!(s.push(10.0), 10.0);
    }

    #[test]
    fn weighted_mean_leans_recent() {
        let mut s = StreamSmoother::new(4);
        s.push(0.0);
        // weights 1,2 → (1*0 + 2*6) / 3
        assert_eq!(s.push(6.0), 4.0);
    }

    #[test]
    fn unweighted_mean_is_flat() {
        let mut s = StreamSmoother::new(4).unweighted();
        s.push(0.0);
        assert_eq!(s.push(6.0), 3.0);
    }

    #[test]
    fn window_ejects_oldest() {
        let mut s = StreamSmoother::new(2).unweighted();
        s.push(100.0);
        s.push(2.0);
        // 100.0 has been ejected
        assert_eq!(s.push(4.0), 3.0);
    }

    #[test]
    fn level_mapping_is_four_per_level() {
        assert_eq!(StreamSmoother::from_level(0).window, 0);
        assert_eq!(StreamSmoother::from_level(3).window, 12);
        assert_eq!(StreamSmoother::from_level(9).window, 36);
        // out-of-range levels clamp
        assert_eq!(StreamSmoother::from_level(200).window, 36);
    }

    #[test]
    fn reset_starts_fresh() {
        let mut s = StreamSmoother::new(4);
        s.push(100.0);
        s.reset();
        assert_eq!(s.push(1.0), 1.0);
    }
}
