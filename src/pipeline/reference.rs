//! Capture and reset of the reference baseline
//!
//! At most one [`ReferenceSet`] is active at a time. Absence is an explicit
//! state here, never a null or empty-sequence stand-in. The set is replaced
//! wholesale on capture and dropped wholesale on reset.

use crate::pipeline::buffer::SweepBuffer;
use crate::types::{ReferenceSet, SweepResult};

/// Foreground-only holder of the active reference baseline
#[derive(Debug, Default)]
pub struct ReferenceManager {
    active: Option<ReferenceSet>,
}

impl ReferenceManager {
    /// Create a manager in the "no reference" state
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a new reference.
    ///
    /// When explicit data is not given, a snapshot of the current sweep
    /// buffer is taken; the source label likewise defaults to the buffer's
    /// current sweep source. Returns the stored set.
    pub fn set_reference(
        &mut self,
        buffer: &SweepBuffer,
        data: Option<(SweepResult, SweepResult)>,
        source: Option<String>,
    ) -> &ReferenceSet {
        let (s11, s21) = data.unwrap_or_else(|| buffer.snapshot());
        let source = source.unwrap_or_else(|| buffer.source());
        tracing::debug!(source = %source, points = s11.len(), "reference captured");
        self.active.insert(ReferenceSet::capture(s11, s21, source))
    }

    /// Clear to the explicit "no reference" state. Idempotent.
    pub fn reset_reference(&mut self) {
        if self.active.take().is_some() {
            tracing::debug!("reference cleared");
        }
    }

    /// The active reference, if any
    pub fn active(&self) -> Option<&ReferenceSet> {
        self.active.as_ref()
    }

    /// Whether a reference is currently captured
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Source label of the active reference (empty when none)
    pub fn source(&self) -> &str {
        self.active.as_ref().map_or("", |r| r.source.as_str())
    }

    /// Number of S11 points in the active reference (0 when none)
    pub fn s11_len(&self) -> usize {
        self.active.as_ref().map_or(0, |r| r.s11.len())
    }
}
