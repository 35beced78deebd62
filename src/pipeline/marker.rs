//! Marker resolution against sweep and reference data
//!
//! A [`Marker`] points at a frequency of interest; on every data refresh it
//! is re-resolved to the nearest sweep index and its display labels are
//! recomputed. The optional delta marker compares two live markers, or one
//! live marker against the captured reference at the same location.

use crate::format::{format_frequency, format_gain, format_phase, format_vswr};
use crate::types::{ReferenceSet, SweepPoint, SweepResult};

/// Cached display labels for one marker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerLabels {
    /// Resolved frequency
    pub frequency: String,
    /// S11 VSWR at the resolved point
    pub s11_vswr: String,
    /// S11 return loss / gain
    pub s11_gain: String,
    /// S11 phase
    pub s11_phase: String,
    /// S21 gain (blank when S21 data is absent at the resolved index)
    pub s21_gain: String,
    /// S21 phase (blank when S21 data is absent at the resolved index)
    pub s21_phase: String,
}

impl MarkerLabels {
    /// Blank all labels
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A frequency-of-interest pointer into a sweep.
///
/// Created by user action, re-resolved on every data refresh, destroyed by
/// user removal.
#[derive(Debug, Clone)]
pub struct Marker {
    /// Unique identifier
    pub id: u32,
    /// Human-readable name
    pub name: String,
    /// Target frequency in Hz
    pub target_freq: u64,
    /// Resolved index into the current S11 sweep
    pub location: Option<usize>,
    /// Cached display labels
    pub labels: MarkerLabels,
}

impl Marker {
    /// Create a new marker pointing at a target frequency
    pub fn new(id: u32, name: impl Into<String>, target_freq: u64) -> Self {
        Self {
            id,
            name: name.into(),
            target_freq,
            location: None,
            labels: MarkerLabels::default(),
        }
    }

    /// Blank the cached labels and drop the resolved location
    pub fn reset_labels(&mut self) {
        self.location = None;
        self.labels.clear();
    }
}

/// Numeric values of one resolved delta operand
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedOperand {
    /// Frequency at the resolved index
    pub freq: u64,
    /// S11 point at the resolved index
    pub s11: SweepPoint,
    /// S21 point at the resolved index, when present
    pub s21: Option<SweepPoint>,
}

/// Per-field differences between two resolved operands (operand2 − operand1),
/// each field subtracted independently in its own unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaValues {
    /// Frequency difference in Hz
    pub freq_hz: i64,
    /// S11 gain difference in dB
    pub s11_gain_db: f64,
    /// S11 phase difference in degrees
    pub s11_phase_deg: f64,
    /// S11 VSWR difference
    pub s11_vswr: f64,
    /// S21 gain difference in dB, when both operands have S21 data
    pub s21_gain_db: Option<f64>,
    /// S21 phase difference in degrees, when both operands have S21 data
    pub s21_phase_deg: Option<f64>,
}

impl DeltaValues {
    fn between(first: &ResolvedOperand, second: &ResolvedOperand) -> Self {
        let s21 = second.s21.zip(first.s21);
        Self {
            freq_hz: second.freq as i64 - first.freq as i64,
            s11_gain_db: second.s11.gain_db() - first.s11.gain_db(),
            s11_phase_deg: second.s11.phase_deg() - first.s11.phase_deg(),
            s11_vswr: second.s11.vswr() - first.s11.vswr(),
            s21_gain_db: s21.map(|(b, a)| b.gain_db() - a.gain_db()),
            s21_phase_deg: s21.map(|(b, a)| b.phase_deg() - a.phase_deg()),
        }
    }
}

/// Registry of live markers plus the delta-marker mode flag
#[derive(Debug, Default)]
pub struct MarkerEngine {
    markers: Vec<Marker>,
    next_id: u32,
    /// When set, the delta marker compares marker 1 against the reference
    /// instead of against marker 2
    pub reference_comparison: bool,
    /// Result of the last delta resolution, `None` when no delta is showable
    last_delta: Option<DeltaValues>,
}

impl MarkerEngine {
    /// Create an empty engine
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Add a marker at a target frequency, returning its id
    pub fn add(&mut self, name: impl Into<String>, target_freq: u64) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.markers.push(Marker::new(id, name, target_freq));
        id
    }

    /// Remove a marker by id
    pub fn remove(&mut self, id: u32) -> bool {
        if let Some(pos) = self.markers.iter().position(|m| m.id == id) {
            self.markers.remove(pos);
            true
        } else {
            false
        }
    }

    /// Marker by id
    pub fn get(&self, id: u32) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    /// Mutable marker by id
    pub fn get_mut(&mut self, id: u32) -> Option<&mut Marker> {
        self.markers.iter_mut().find(|m| m.id == id)
    }

    /// All live markers
    pub fn all(&self) -> &[Marker] {
        &self.markers
    }

    /// Number of live markers
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Whether no markers exist
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Result of the last delta resolution
    pub fn last_delta(&self) -> Option<&DeltaValues> {
        self.last_delta.as_ref()
    }

    /// Blank every marker's labels (sweep start)
    pub fn reset_all_labels(&mut self) {
        for m in &mut self.markers {
            m.reset_labels();
        }
        self.last_delta = None;
    }

    /// Re-resolve every marker against new sweep data
    pub fn resolve_all(&mut self, s11: &SweepResult, s21: &SweepResult) {
        for m in &mut self.markers {
            Self::resolve(m, s11, s21);
        }
    }

    /// Resolve one marker: locate the nearest S11 index, reset labels, then
    /// recompute them from `s11[i]` and, when present, `s21[i]`.
    pub fn resolve(marker: &mut Marker, s11: &SweepResult, s21: &SweepResult) {
        marker.reset_labels();
        marker.location = nearest_index(s11, marker.target_freq);

        let Some(index) = marker.location else {
            return;
        };
        let Some(p11) = s11.get(index) else {
            return;
        };

        marker.labels.frequency = format_frequency(p11.freq);
        marker.labels.s11_vswr = format_vswr(p11.vswr());
        marker.labels.s11_gain = format_gain(p11.gain_db());
        marker.labels.s11_phase = format_phase(p11.phase_deg());

        // S21 may be shorter or empty; its labels stay blank then
        if let Some(p21) = s21.get(index) {
            marker.labels.s21_gain = format_gain(p21.gain_db());
            marker.labels.s21_phase = format_phase(p21.phase_deg());
        }
    }

    /// Resolve the delta marker against the current data.
    ///
    /// In reference-comparison mode the second operand is a synthetic marker
    /// at marker 1's resolved location evaluated against the reference data;
    /// otherwise it is the second live marker. Fewer than two resolvable
    /// operands is a normal state and yields `None` (blank display).
    pub fn resolve_delta(
        &mut self,
        s11: &SweepResult,
        s21: &SweepResult,
        reference: Option<&ReferenceSet>,
    ) -> Option<DeltaValues> {
        self.last_delta = self.compute_delta(s11, s21, reference);
        self.last_delta
    }

    fn compute_delta(
        &self,
        s11: &SweepResult,
        s21: &SweepResult,
        reference: Option<&ReferenceSet>,
    ) -> Option<DeltaValues> {
        let first_marker = self.markers.first()?;
        let first = operand_at(first_marker.location?, s11, s21)?;

        let second = if self.reference_comparison {
            let Some(reference) = reference else {
                tracing::warn!("No reference data for delta marker");
                return None;
            };
            let Some(op) = operand_at(first_marker.location?, &reference.s11, &reference.s21)
            else {
                tracing::debug!("Marker location outside reference data, no delta");
                return None;
            };
            op
        } else if let Some(second_marker) = self.markers.get(1) {
            operand_at(second_marker.location?, s11, s21)?
        } else {
            tracing::debug!("No second operand for delta, display stays blank");
            return None;
        };

        Some(DeltaValues::between(&first, &second))
    }
}

fn operand_at(index: usize, s11: &SweepResult, s21: &SweepResult) -> Option<ResolvedOperand> {
    let p11 = s11.get(index)?;
    Some(ResolvedOperand {
        freq: p11.freq,
        s11: *p11,
        s21: s21.get(index).copied(),
    })
}

/// Index of the point nearest `target` by frequency, ties broken toward the
/// lower index. `None` on empty input.
pub fn nearest_index(result: &SweepResult, target: u64) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for (i, p) in result.into_iter().enumerate() {
        let distance = p.freq.abs_diff(target);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((i, distance)),
        }
    }
    best.map(|(i, _)| i)
}
