//! Test data builders for creating sweep objects

use sweepvis_rs::{SweepPoint, SweepResult};

/// Builder for linear-frequency sweep traces
pub struct SweepBuilder {
    start_hz: u64,
    stop_hz: u64,
    points: usize,
}

impl SweepBuilder {
    pub fn new() -> Self {
        Self {
            start_hz: 1_000_000,
            stop_hz: 30_000_000,
            points: 101,
        }
    }

    pub fn range(mut self, start_hz: u64, stop_hz: u64) -> Self {
        self.start_hz = start_hz;
        self.stop_hz = stop_hz;
        self
    }

    pub fn points(mut self, points: usize) -> Self {
        self.points = points;
        self
    }

    /// Build a trace with a constant reflection magnitude
    pub fn flat(self, magnitude: f64) -> SweepResult {
        self.build_with(|_| (magnitude, 0.0))
    }

    /// Build a trace with per-frequency (re, im) from a closure
    pub fn build_with(self, f: impl Fn(u64) -> (f64, f64)) -> SweepResult {
        let span = self.stop_hz - self.start_hz;
        let steps = (self.points - 1) as u64;
        (0..self.points as u64)
            .map(|i| {
                let freq = self.start_hz + span * i / steps;
                let (re, im) = f(freq);
                SweepPoint::new(freq, re, im)
            })
            .collect()
    }
}

impl Default for SweepBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A sweep with one clear VSWR minimum at the given frequency
pub fn sweep_with_dip(dip_hz: u64) -> SweepResult {
    SweepBuilder::new().build_with(|freq| {
        let offset = (freq as f64 - dip_hz as f64).abs() / dip_hz as f64;
        ((0.05 + 5.0 * offset).min(0.9), 0.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_builder() {
        let sweep = SweepBuilder::new().range(1_000_000, 2_000_000).points(11).flat(0.5);
        assert_eq!(sweep.len(), 11);
        assert_eq!(sweep.freq_span(), Some((1_000_000, 2_000_000)));
        assert!((sweep.points()[5].magnitude() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sweep_with_dip() {
        let sweep = sweep_with_dip(14_000_000);
        let best = sweep
            .points()
            .iter()
            .min_by(|a, b| a.vswr().total_cmp(&b.vswr()))
            .unwrap();
        assert!((best.freq as f64 - 14_000_000.0).abs() < 500_000.0);
    }
}
