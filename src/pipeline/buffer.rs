//! Thread-guarded holder of the latest sweep results
//!
//! [`SweepBuffer`] is the only mutable state shared between the acquisition
//! worker and the foreground pipeline. The worker replaces the stored pair
//! under a scoped lock; the foreground takes a snapshot copy and uses it
//! with the lock released, so consumer fan-out never blocks acquisition.

use crate::types::{SweepPoint, SweepResult};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
struct BufferInner {
    s11: SweepResult,
    s21: SweepResult,
    source: String,
}

/// Shared holder of the latest S11/S21 sweep results.
///
/// The lock is held only for the duration of a copy or replace, never
/// across consumer notification.
#[derive(Debug)]
pub struct SweepBuffer {
    inner: Mutex<BufferInner>,
    device_name: String,
    s21_attenuation_db: f64,
}

impl SweepBuffer {
    /// Create an empty buffer.
    ///
    /// `device_name` seeds synthesized source labels; `s21_attenuation_db`
    /// is the fixed external attenuation compensated on every write (0 for
    /// none).
    pub fn new(device_name: impl Into<String>, s21_attenuation_db: f64) -> Self {
        Self {
            inner: Mutex::new(BufferInner::default()),
            device_name: device_name.into(),
            s21_attenuation_db,
        }
    }

    /// Atomically replace the stored sweep results.
    ///
    /// The S21 attenuation correction is applied before storing. When no
    /// explicit source label is given, one is synthesized as
    /// `"{device}_{local timestamp}"`.
    pub fn write(&self, s11: SweepResult, s21: SweepResult, source: Option<String>) {
        let s21 = s21.corrected_for_attenuation(self.s21_attenuation_db);
        let source = source.unwrap_or_else(|| {
            let time = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            format!("{}_{}", self.device_name, time)
        });

        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.s11 = s11;
        guard.s21 = s21;
        guard.source = source;
    }

    /// Point-in-time copy of the stored (S11, S21) pair.
    ///
    /// The returned data is owned by the caller; the lock is released
    /// before this function returns.
    pub fn snapshot(&self) -> (SweepResult, SweepResult) {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        (guard.s11.clone(), guard.s21.clone())
    }

    /// Current sweep source label (empty until the first write)
    pub fn source(&self) -> String {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.source.clone()
    }

    /// Number of stored S11 points
    pub fn s11_len(&self) -> usize {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.s11.len()
    }

    /// Device name used for synthesized source labels
    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

/// Convenience constructor used by tests and the demo binary
impl SweepBuffer {
    /// Build a buffer prefilled with the given points (no attenuation)
    pub fn with_data(s11: Vec<SweepPoint>, s21: Vec<SweepPoint>, source: &str) -> Self {
        let buffer = Self::new("test", 0.0);
        buffer.write(
            SweepResult::from_points(s11),
            SweepResult::from_points(s21),
            Some(source.to_string()),
        );
        buffer
    }
}
