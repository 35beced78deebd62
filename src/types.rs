//! Core data types for sweep acquisition and analysis
//!
//! This module contains the fundamental data structures used throughout
//! the crate for representing sweep samples and captured references.
//!
//! # Main Types
//!
//! - [`SweepPoint`] - One frequency sample with its complex S-parameter
//! - [`SweepResult`] - A frequency-ascending sequence of points for one parameter
//! - [`ReferenceSet`] - A captured (S11, S21) baseline with source label and timestamp
//! - [`SweepStatus`] - Acquisition state as seen by the foreground pipeline
//!
//! # Derived quantities
//!
//! VSWR and gain are derived from the complex reflection/transmission
//! coefficient and never stored separately: a [`SweepPoint`] is immutable
//! once produced, so the derivations cannot go stale.

use rustfft::num_complex::Complex64;

/// One frequency sample of a scattering parameter.
///
/// Immutable once produced; VSWR, gain, and phase are derived on demand
/// from the complex coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    /// Sample frequency in Hz (non-negative)
    pub freq: u64,
    /// Complex reflection/transmission coefficient
    pub coefficient: Complex64,
}

impl SweepPoint {
    /// Create a new sweep point from frequency and raw real/imaginary parts
    pub fn new(freq: u64, re: f64, im: f64) -> Self {
        Self {
            freq,
            coefficient: Complex64::new(re, im),
        }
    }

    /// Magnitude of the complex coefficient
    #[inline]
    pub fn magnitude(&self) -> f64 {
        self.coefficient.norm()
    }

    /// Phase of the coefficient in degrees
    #[inline]
    pub fn phase_deg(&self) -> f64 {
        self.coefficient.arg().to_degrees()
    }

    /// Voltage standing wave ratio derived from the reflection coefficient.
    ///
    /// A total reflection (|Γ| >= 1) yields `f64::INFINITY`.
    pub fn vswr(&self) -> f64 {
        let mag = self.magnitude();
        if mag >= 1.0 {
            f64::INFINITY
        } else {
            (1.0 + mag) / (1.0 - mag)
        }
    }

    /// Gain in dB (20·log10 of the magnitude). A zero coefficient yields
    /// `f64::NEG_INFINITY`.
    pub fn gain_db(&self) -> f64 {
        let mag = self.magnitude();
        if mag > 0.0 {
            20.0 * mag.log10()
        } else {
            f64::NEG_INFINITY
        }
    }
}

/// Ordered sequence of [`SweepPoint`] for one parameter (S11 or S21).
///
/// Always sorted by ascending frequency; may be empty. The S11 and S21
/// sequences of one sweep may legitimately differ in length when the
/// hardware reports only one parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepResult {
    points: Vec<SweepPoint>,
}

impl SweepResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a result from points already sorted by ascending frequency
    pub fn from_points(points: Vec<SweepPoint>) -> Self {
        debug_assert!(
            points.windows(2).all(|w| w[0].freq <= w[1].freq),
            "sweep points must be frequency-ascending"
        );
        Self { points }
    }

    /// Append a frequency-ascending segment to the end of the sweep
    pub fn extend_segment(&mut self, segment: Vec<SweepPoint>) {
        debug_assert!(
            segment.windows(2).all(|w| w[0].freq <= w[1].freq),
            "segment must be frequency-ascending"
        );
        debug_assert!(
            self.points
                .last()
                .zip(segment.first())
                .map_or(true, |(a, b)| a.freq <= b.freq),
            "segment must not precede existing points"
        );
        self.points.extend(segment);
    }

    /// All points, frequency-ascending
    pub fn points(&self) -> &[SweepPoint] {
        &self.points
    }

    /// Point at a resolved index
    pub fn get(&self, index: usize) -> Option<&SweepPoint> {
        self.points.get(index)
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the sweep holds no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Frequency span (first, last) in Hz, if at least two points exist
    pub fn freq_span(&self) -> Option<(u64, u64)> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if self.points.len() >= 2 => Some((first.freq, last.freq)),
            _ => None,
        }
    }

    /// Apply a fixed external-attenuator correction.
    ///
    /// Compensates a known attenuation (in dB, positive) inserted in the S21
    /// path by scaling every coefficient back up. Zero or negative
    /// attenuation returns the data unchanged.
    pub fn corrected_for_attenuation(mut self, attenuation_db: f64) -> Self {
        if attenuation_db <= 0.0 {
            return self;
        }
        let scale = 10f64.powf(attenuation_db / 20.0);
        for p in &mut self.points {
            p.coefficient *= scale;
        }
        self
    }
}

impl FromIterator<SweepPoint> for SweepResult {
    fn from_iter<I: IntoIterator<Item = SweepPoint>>(iter: I) -> Self {
        Self::from_points(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a SweepResult {
    type Item = &'a SweepPoint;
    type IntoIter = std::slice::Iter<'a, SweepPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// A captured baseline: the (S11, S21) pair at a point in time.
///
/// Replaced wholesale on reset, never mutated in place. At most one
/// reference is active; absence is an explicit state in
/// [`ReferenceManager`](crate::pipeline::reference::ReferenceManager),
/// never an empty-sequence stand-in.
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    /// Reflection baseline
    pub s11: SweepResult,
    /// Transmission baseline
    pub s21: SweepResult,
    /// Where the baseline came from (sweep source label)
    pub source: String,
    /// When the baseline was captured
    pub captured_at: chrono::DateTime<chrono::Local>,
}

impl ReferenceSet {
    /// Capture a reference from sweep data
    pub fn capture(s11: SweepResult, s21: SweepResult, source: impl Into<String>) -> Self {
        Self {
            s11,
            s21,
            source: source.into(),
            captured_at: chrono::Local::now(),
        }
    }
}

/// Acquisition state as observed by the foreground pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepStatus {
    /// No sweep in progress
    #[default]
    Idle,
    /// Worker is acquiring segments
    Running,
    /// Last sweep ended with a device error
    Error,
}

impl std::fmt::Display for SweepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweepStatus::Idle => write!(f, "Idle"),
            SweepStatus::Running => write!(f, "Sweeping"),
            SweepStatus::Error => write!(f, "Error"),
        }
    }
}
