//! Synthetic device for tests and demo runs
//!
//! Produces a deterministic antenna-like response: a reflection dip around
//! a fixed resonance and a gently sloped transmission trace. The output is
//! a pure function of frequency, so repeated sweeps are identical.

use crate::backend::device::{SegmentData, SweepSegment, VnaDevice};
use crate::error::{Result, SweepVisError};
use crate::types::SweepPoint;
use std::f64::consts::PI;

/// Resonance frequency of the synthetic antenna
const RESONANCE_HZ: f64 = 14_100_000.0;

/// A mock sweep device with an optional injected failure
pub struct MockVna {
    /// Fail on the segment with this index (0-based), once reached
    fail_at: Option<usize>,
    segments_read: usize,
    connected: bool,
}

impl MockVna {
    /// Create a mock that always succeeds
    pub fn new() -> Self {
        Self {
            fail_at: None,
            segments_read: 0,
            connected: true,
        }
    }

    /// Fail every `read_segment` call from the `n`-th one onward
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_at = Some(n);
        self
    }

    /// Synthetic reflection coefficient at a frequency
    fn s11_at(freq: u64) -> SweepPoint {
        // Deep dip at resonance, broadening away from it
        let offset = (freq as f64 - RESONANCE_HZ) / RESONANCE_HZ;
        let magnitude = (0.05 + 12.0 * offset.abs()).min(0.9);
        let phase = -2.0 * PI * offset;
        SweepPoint::new(freq, magnitude * phase.cos(), magnitude * phase.sin())
    }

    /// Synthetic transmission coefficient at a frequency
    fn s21_at(freq: u64) -> SweepPoint {
        // Mild rolloff with frequency, roughly -1 dB per 10 MHz
        let gain_db = -(freq as f64) / 10_000_000.0;
        let magnitude = 10f64.powf(gain_db / 20.0);
        SweepPoint::new(freq, magnitude, 0.0)
    }
}

impl Default for MockVna {
    fn default() -> Self {
        Self::new()
    }
}

impl VnaDevice for MockVna {
    fn name(&self) -> &str {
        "mockvna"
    }

    fn connected(&self) -> bool {
        self.connected
    }

    fn read_segment(&mut self, segment: &SweepSegment) -> Result<SegmentData> {
        if let Some(fail_at) = self.fail_at {
            if self.segments_read >= fail_at {
                self.connected = false;
                return Err(SweepVisError::Acquisition(
                    "injected segment failure".to_string(),
                ));
            }
        }
        self.segments_read += 1;

        let mut data = SegmentData::default();
        for freq in segment.frequencies() {
            data.s11.push(Self::s11_at(freq));
            data.s21.push(Self::s21_at(freq));
        }
        Ok(data)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn reconnect(&mut self) -> Result<()> {
        self.connected = true;
        Ok(())
    }
}
