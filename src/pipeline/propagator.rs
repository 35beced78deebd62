//! Fan-out of sweep snapshots and reference events to consumers
//!
//! Structurally an observer registry: consumers register in one of three
//! capability-typed lists (S11-only, S21-only, combined) and receive copies
//! of the data on every refresh. The propagator also owns the derived
//! display state the original main window kept in labels: metric strings,
//! progress, the TDR estimate, and the window title.
//!
//! No errors propagate out of the update path; every consumer update is
//! total over its input, including empty sequences.

use crate::analysis::TdrAnalyzer;
use crate::format::{format_frequency, format_gain, format_vswr};
use crate::pipeline::buffer::SweepBuffer;
use crate::pipeline::marker::MarkerEngine;
use crate::pipeline::metrics;
use crate::pipeline::reference::ReferenceManager;
use crate::types::{ReferenceSet, SweepResult};
use crossbeam_channel::{bounded, Receiver, Sender};

/// A consumer of one trace (S11-only or S21-only)
pub trait TraceConsumer: Send {
    /// Receive a fresh copy of the trace
    fn set_data(&mut self, data: &SweepResult);
    /// Receive the reference overlay for the trace
    fn set_reference(&mut self, reference: &SweepResult);
    /// Drop the reference overlay
    fn reset_reference(&mut self);
}

/// A consumer of the (S11, S21) pair
pub trait CombinedConsumer: Send {
    /// Receive fresh copies of both traces
    fn set_combined_data(&mut self, s11: &SweepResult, s21: &SweepResult);
    /// Receive the reference overlay for both traces
    fn set_combined_reference(&mut self, s11: &SweepResult, s21: &SweepResult);
    /// Drop the reference overlay
    fn reset_reference(&mut self);
}

/// Derived display strings recomputed on every refresh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusLabels {
    /// Minimum VSWR with its frequency, e.g. `"1.050 @ 2MHz"`
    pub s11_min_vswr: String,
    /// Return loss at the minimum-VSWR point
    pub s11_return_loss: String,
    /// Minimum gain with its frequency
    pub s21_min_gain: String,
    /// Maximum gain with its frequency
    pub s21_max_gain: String,
    /// Estimated cable length, e.g. `"10.085 m"`
    pub tdr_result: String,
}

impl StatusLabels {
    /// Blank all labels
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Pushes sweep snapshots and reference events to all subscribers in a
/// fixed order, then recomputes the derived display state.
pub struct UpdatePropagator {
    s11_consumers: Vec<Box<dyn TraceConsumer>>,
    s21_consumers: Vec<Box<dyn TraceConsumer>>,
    combined_consumers: Vec<Box<dyn CombinedConsumer>>,
    data_available: Vec<Sender<()>>,
    tdr: TdrAnalyzer,
    labels: StatusLabels,
    progress: u8,
    base_title: String,
    title: String,
}

impl UpdatePropagator {
    /// Create a propagator with no subscribers
    pub fn new(base_title: impl Into<String>, tdr_velocity_factor: f64) -> Self {
        let base_title = base_title.into();
        Self {
            s11_consumers: Vec::new(),
            s21_consumers: Vec::new(),
            combined_consumers: Vec::new(),
            data_available: Vec::new(),
            tdr: TdrAnalyzer::new(tdr_velocity_factor),
            labels: StatusLabels::default(),
            progress: 0,
            title: base_title.clone(),
            base_title,
        }
    }

    /// Register an S11-only consumer
    pub fn add_s11_consumer(&mut self, consumer: Box<dyn TraceConsumer>) {
        self.s11_consumers.push(consumer);
    }

    /// Register an S21-only consumer
    pub fn add_s21_consumer(&mut self, consumer: Box<dyn TraceConsumer>) {
        self.s21_consumers.push(consumer);
    }

    /// Register a combined consumer
    pub fn add_combined_consumer(&mut self, consumer: Box<dyn CombinedConsumer>) {
        self.combined_consumers.push(consumer);
    }

    /// Subscribe to the generic "data available" notification.
    ///
    /// The channel only signals that new data exists; a slow subscriber
    /// sees a coalesced notification rather than a backlog.
    pub fn subscribe_data_available(&mut self) -> Receiver<()> {
        let (tx, rx) = bounded(1);
        self.data_available.push(tx);
        rx
    }

    /// Handle a "data updated" event from the acquisition worker.
    ///
    /// Takes a snapshot outside the buffer lock, recomputes marker labels
    /// and the delta marker, fans the data out to all consumers, refreshes
    /// progress, the TDR estimate, the metric labels, and the title, then
    /// broadcasts the data-available notification.
    pub fn on_sweep_updated(
        &mut self,
        buffer: &SweepBuffer,
        markers: &mut MarkerEngine,
        reference: &ReferenceManager,
        progress: u8,
    ) {
        let (s11, s21) = buffer.snapshot();

        markers.resolve_all(&s11, &s21);
        markers.resolve_delta(&s11, &s21, reference.active());

        for c in &mut self.s11_consumers {
            c.set_data(&s11);
        }
        for c in &mut self.s21_consumers {
            c.set_data(&s21);
        }
        for c in &mut self.combined_consumers {
            c.set_combined_data(&s11, &s21);
        }

        self.progress = progress.min(100);

        self.labels.tdr_result = match self.tdr.compute(&s11) {
            Some(result) => format!("{:.3} m", result.cable_length_m),
            None => String::new(),
        };

        self.recompute_metric_labels(&s11, &s21);
        self.recompute_title(buffer, reference);

        for tx in &self.data_available {
            // A full slot already signals pending data
            let _ = tx.try_send(());
        }
    }

    /// Push a freshly captured reference to every overlay-capable consumer
    /// and refresh the title.
    pub fn on_reference_set(
        &mut self,
        buffer: &SweepBuffer,
        reference: &ReferenceManager,
        set: &ReferenceSet,
    ) {
        for c in &mut self.s11_consumers {
            c.set_reference(&set.s11);
        }
        for c in &mut self.s21_consumers {
            c.set_reference(&set.s21);
        }
        for c in &mut self.combined_consumers {
            c.set_combined_reference(&set.s11, &set.s21);
        }
        self.recompute_title(buffer, reference);
    }

    /// Tell every consumer to drop its reference overlay and refresh the
    /// title.
    pub fn on_reference_reset(&mut self, buffer: &SweepBuffer, reference: &ReferenceManager) {
        for c in &mut self.s11_consumers {
            c.reset_reference();
        }
        for c in &mut self.s21_consumers {
            c.reset_reference();
        }
        for c in &mut self.combined_consumers {
            c.reset_reference();
        }
        self.recompute_title(buffer, reference);
    }

    /// Blank the metric labels and zero the progress (sweep start)
    pub fn reset_labels(&mut self) {
        self.labels.clear();
        self.progress = 0;
    }

    /// Force the progress indicator (sweep finish sets 100)
    pub fn set_progress(&mut self, progress: u8) {
        self.progress = progress.min(100);
    }

    /// Current derived display strings
    pub fn labels(&self) -> &StatusLabels {
        &self.labels
    }

    /// Current progress, 0-100
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Current window title
    pub fn title(&self) -> &str {
        &self.title
    }

    fn recompute_metric_labels(&mut self, s11: &SweepResult, s21: &SweepResult) {
        match metrics::min_vswr(s11) {
            Some(best) => {
                self.labels.s11_min_vswr = format!(
                    "{} @ {}",
                    format_vswr(best.vswr()),
                    format_frequency(best.freq)
                );
                self.labels.s11_return_loss = format_gain(best.gain_db());
            }
            None => {
                self.labels.s11_min_vswr.clear();
                self.labels.s11_return_loss.clear();
            }
        }

        match (metrics::min_gain(s21), metrics::max_gain(s21)) {
            (Some(min), Some(max)) => {
                self.labels.s21_min_gain = format!(
                    "{} @ {}",
                    format_gain(min.gain_db()),
                    format_frequency(min.freq)
                );
                self.labels.s21_max_gain = format!(
                    "{} @ {}",
                    format_gain(max.gain_db()),
                    format_frequency(max.freq)
                );
            }
            _ => {
                self.labels.s21_min_gain.clear();
                self.labels.s21_max_gain.clear();
            }
        }
    }

    fn recompute_title(&mut self, buffer: &SweepBuffer, reference: &ReferenceManager) {
        let sweep_source = buffer.source();
        let reference_source = reference.source();

        let mut parts = Vec::new();
        if !sweep_source.is_empty() {
            parts.push(format!(
                "Sweep: {} @ {} points",
                sweep_source,
                buffer.s11_len()
            ));
        }
        if !reference_source.is_empty() {
            parts.push(format!(
                "Reference: {} @ {} points",
                reference_source,
                reference.s11_len()
            ));
        }

        self.title = if parts.is_empty() {
            self.base_title.clone()
        } else {
            format!("{} ({})", self.base_title, parts.join(", "))
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SweepPoint;
    use std::sync::{Arc, Mutex};

    /// Trace consumer that records what it was pushed
    #[derive(Default)]
    struct Recorder {
        data: Arc<Mutex<Vec<usize>>>,
        reference: Arc<Mutex<Option<usize>>>,
    }

    impl TraceConsumer for Recorder {
        fn set_data(&mut self, data: &SweepResult) {
            self.data.lock().unwrap().push(data.len());
        }
        fn set_reference(&mut self, reference: &SweepResult) {
            *self.reference.lock().unwrap() = Some(reference.len());
        }
        fn reset_reference(&mut self) {
            *self.reference.lock().unwrap() = None;
        }
    }

    fn buffer_with(mags_s11: &[(u64, f64)], mags_s21: &[(u64, f64)]) -> SweepBuffer {
        SweepBuffer::with_data(
            mags_s11
                .iter()
                .map(|&(f, m)| SweepPoint::new(f, m, 0.0))
                .collect(),
            mags_s21
                .iter()
                .map(|&(f, m)| SweepPoint::new(f, m, 0.0))
                .collect(),
            "test_sweep",
        )
    }

    #[test]
    fn test_fan_out_and_labels() {
        let buffer = buffer_with(
            &[(1_000_000, 0.5), (2_000_000, 0.1)],
            &[(1_000_000, 0.9), (2_000_000, 0.8)],
        );
        let mut markers = MarkerEngine::new();
        markers.add("Marker 1", 1_500_000);
        let reference = ReferenceManager::new();

        let mut propagator = UpdatePropagator::new("sweepvis", 0.66);
        let recorder = Recorder::default();
        let seen = recorder.data.clone();
        propagator.add_s11_consumer(Box::new(recorder));

        propagator.on_sweep_updated(&buffer, &mut markers, &reference, 50);

        assert_eq!(seen.lock().unwrap().as_slice(), &[2]);
        assert_eq!(propagator.progress(), 50);
        assert!(!propagator.labels().s11_min_vswr.is_empty());
        assert!(propagator.title().contains("test_sweep @ 2 points"));
        // Marker got resolved during the update
        assert_eq!(markers.all()[0].location, Some(0));
    }

    #[test]
    fn test_min_vswr_label_scenario() {
        // vswr 1.2, 1.05, 3.0 at 1/2/3 MHz: |Γ| = (v-1)/(v+1)
        let gamma = |v: f64| (v - 1.0) / (v + 1.0);
        let buffer = buffer_with(
            &[
                (1_000_000, gamma(1.2)),
                (2_000_000, gamma(1.05)),
                (3_000_000, gamma(3.0)),
            ],
            &[],
        );
        let mut markers = MarkerEngine::new();
        let reference = ReferenceManager::new();
        let mut propagator = UpdatePropagator::new("sweepvis", 0.66);

        propagator.on_sweep_updated(&buffer, &mut markers, &reference, 100);
        assert_eq!(propagator.labels().s11_min_vswr, "1.050 @ 2MHz");
    }

    #[test]
    fn test_empty_sweep_blanks_labels() {
        let buffer = SweepBuffer::new("vna", 0.0);
        buffer.write(SweepResult::new(), SweepResult::new(), Some("empty".into()));
        let mut markers = MarkerEngine::new();
        let reference = ReferenceManager::new();
        let mut propagator = UpdatePropagator::new("sweepvis", 0.66);

        propagator.on_sweep_updated(&buffer, &mut markers, &reference, 10);
        assert!(propagator.labels().s11_min_vswr.is_empty());
        assert!(propagator.labels().s21_min_gain.is_empty());
        assert!(propagator.labels().tdr_result.is_empty());
    }

    #[test]
    fn test_reference_overlay_lifecycle() {
        let buffer = buffer_with(&[(1_000_000, 0.5)], &[]);
        let mut reference = ReferenceManager::new();
        let mut propagator = UpdatePropagator::new("sweepvis", 0.66);
        let recorder = Recorder::default();
        let overlay = recorder.reference.clone();
        propagator.add_s11_consumer(Box::new(recorder));

        let set = reference.set_reference(&buffer, None, None).clone();
        propagator.on_reference_set(&buffer, &reference, &set);
        assert_eq!(*overlay.lock().unwrap(), Some(1));
        assert!(propagator.title().contains("Reference: test_sweep @ 1 points"));

        reference.reset_reference();
        propagator.on_reference_reset(&buffer, &reference);
        assert_eq!(*overlay.lock().unwrap(), None);
        assert!(!propagator.title().contains("Reference"));
    }

    #[test]
    fn test_data_available_notification_coalesces() {
        let buffer = buffer_with(&[(1_000_000, 0.5)], &[]);
        let mut markers = MarkerEngine::new();
        let reference = ReferenceManager::new();
        let mut propagator = UpdatePropagator::new("sweepvis", 0.66);
        let rx = propagator.subscribe_data_available();

        propagator.on_sweep_updated(&buffer, &mut markers, &reference, 10);
        propagator.on_sweep_updated(&buffer, &mut markers, &reference, 20);

        // Two updates with no drain coalesce into one pending signal
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_progress_clamped() {
        let buffer = buffer_with(&[(1_000_000, 0.5)], &[]);
        let mut markers = MarkerEngine::new();
        let reference = ReferenceManager::new();
        let mut propagator = UpdatePropagator::new("sweepvis", 0.66);

        propagator.on_sweep_updated(&buffer, &mut markers, &reference, 250);
        assert_eq!(propagator.progress(), 100);
    }
}
