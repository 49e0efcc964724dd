pub mod parser;

pub use parser::{parse_silence_file, parse_silence_log};

/// A span of audio that stayed below the noise threshold, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceInterval {
    pub start: f64,
    pub end: f64,
}

impl SilenceInterval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Get the duration of this interval.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Sum of all interval durations.
pub fn total_silence_duration(intervals: &[SilenceInterval]) -> f64 {
    intervals.iter().map(SilenceInterval::duration).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_duration() {
        let interval = SilenceInterval::new(3.0, 5.5);
        assert!((interval.duration() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_total_silence_duration() {
        let intervals = vec![SilenceInterval::new(1.0, 2.0), SilenceInterval::new(4.0, 7.0)];
        assert!((total_silence_duration(&intervals) - 4.0).abs() < 1e-9);
        assert_eq!(total_silence_duration(&[]), 0.0);
    }
}
