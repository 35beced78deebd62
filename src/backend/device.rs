//! Device seam for sweep acquisition
//!
//! [`VnaDevice`] abstracts over the serial hardware so the worker and the
//! tests run against the same interface. [`SweepSegment`] describes one
//! contiguous frequency range the device acquires in a single pass.

use crate::error::Result;
use crate::types::SweepPoint;

/// One contiguous frequency range acquired in a single device pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSegment {
    /// First frequency in Hz
    pub start_hz: u64,
    /// Last frequency in Hz
    pub stop_hz: u64,
    /// Number of sample points, at least 2
    pub points: usize,
}

impl SweepSegment {
    /// The sample frequencies of this segment, ascending.
    ///
    /// A segment with fewer than 2 points has no usable grid and yields
    /// nothing.
    pub fn frequencies(&self) -> impl Iterator<Item = u64> + '_ {
        let span = self.stop_hz.saturating_sub(self.start_hz);
        let steps = (self.points as u64).saturating_sub(1);
        let count = if steps == 0 { 0 } else { self.points as u64 };
        (0..count).map(move |i| self.start_hz + span * i / steps)
    }
}

/// Raw data acquired for one segment.
///
/// The S21 vector may be empty when the device reports reflection only.
#[derive(Debug, Clone, Default)]
pub struct SegmentData {
    /// Reflection samples, frequency-ascending
    pub s11: Vec<SweepPoint>,
    /// Transmission samples, frequency-ascending
    pub s21: Vec<SweepPoint>,
}

/// A sweep-capable device (real serial hardware or the mock)
pub trait VnaDevice: Send {
    /// Device name used for source labels and logging
    fn name(&self) -> &str;

    /// Whether the device connection is currently usable
    fn connected(&self) -> bool;

    /// Acquire one segment from the device
    fn read_segment(&mut self, segment: &SweepSegment) -> Result<SegmentData>;

    /// Discard any stale buffered device output
    fn flush(&mut self) -> Result<()>;

    /// Drop and re-establish the device connection
    fn reconnect(&mut self) -> Result<()>;
}

/// Split the configured sweep range into per-segment ranges.
///
/// Segments partition the overall range evenly; each segment carries the
/// configured point count. With fewer than 2 points or a degenerate range,
/// no segments are produced.
pub fn plan_segments(
    start_hz: u64,
    stop_hz: u64,
    segments: usize,
    points_per_segment: usize,
) -> Vec<SweepSegment> {
    if points_per_segment < 2 || stop_hz <= start_hz || segments == 0 {
        return Vec::new();
    }
    let span = stop_hz - start_hz;
    (0..segments as u64)
        .map(|i| SweepSegment {
            start_hz: start_hz + span * i / segments as u64,
            stop_hz: start_hz + span * (i + 1) / segments as u64,
            points: points_per_segment,
        })
        .collect()
}
