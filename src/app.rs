//! Foreground sweep session
//!
//! [`SweepSession`] ties the pieces together: it spawns the acquisition
//! backend, owns the marker engine, the reference manager, and the update
//! propagator, and translates backend messages into pipeline updates. A
//! frontend drives it by calling [`SweepSession::process_messages`] on its
//! refresh tick and reading the derived state back out.

use crate::backend::{FrontendHandle, SweepBackend, SweepMessage, VnaDevice};
use crate::config::AppConfig;
use crate::error::{Result, SweepVisError};
use crate::pipeline::{MarkerEngine, ReferenceManager, StatusLabels, SweepBuffer, UpdatePropagator};
use crate::types::SweepStatus;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Upper bound on waiting for the backend thread at shutdown
const WORKER_KILL_TIMEOUT: Duration = Duration::from_secs(10);

/// One live sweep session: backend thread plus foreground pipeline state
pub struct SweepSession {
    config: AppConfig,
    buffer: Arc<SweepBuffer>,
    markers: MarkerEngine,
    reference: ReferenceManager,
    propagator: UpdatePropagator,
    frontend: FrontendHandle,
    worker_handle: Option<JoinHandle<()>>,
    status: SweepStatus,
    reset_reference_enabled: bool,
    last_error: Option<String>,
}

impl SweepSession {
    /// Spawn the backend for the given device and set up the pipeline.
    ///
    /// Markers are created per the chart configuration, spread evenly over
    /// the configured sweep range.
    pub fn new(config: AppConfig, device: Box<dyn VnaDevice>) -> Result<Self> {
        let buffer = Arc::new(SweepBuffer::new(
            &config.sweep.device_name,
            config.sweep.s21_attenuation_db,
        ));
        let (backend, frontend) =
            SweepBackend::new(config.sweep.clone(), device, buffer.clone());

        let worker_handle = std::thread::Builder::new()
            .name("sweep-backend".to_string())
            .spawn(move || backend.run())
            .map_err(|e| SweepVisError::Acquisition(format!("backend spawn failed: {e}")))?;

        let mut markers = MarkerEngine::new();
        let span = config.sweep.stop_hz.saturating_sub(config.sweep.start_hz);
        let count = config.chart.marker_count as u64;
        for i in 0..count {
            let target = config.sweep.start_hz + span * (i + 1) / (count + 1);
            markers.add(format!("Marker {}", i + 1), target);
        }

        let propagator =
            UpdatePropagator::new("sweepvis-rs", config.sweep.tdr_velocity_factor);

        Ok(Self {
            config,
            buffer,
            markers,
            reference: ReferenceManager::new(),
            propagator,
            frontend,
            worker_handle: Some(worker_handle),
            status: SweepStatus::Idle,
            reset_reference_enabled: false,
            last_error: None,
        })
    }

    /// Begin a sweep: blank stale labels, then command the backend
    pub fn start_sweep(&mut self) {
        self.markers.reset_all_labels();
        self.propagator.reset_labels();
        self.last_error = None;
        self.status = SweepStatus::Running;
        self.frontend.start_sweep();
        tracing::info!(
            start_hz = self.config.sweep.start_hz,
            stop_hz = self.config.sweep.stop_hz,
            "sweep requested"
        );
    }

    /// Ask the backend to abort the running sweep
    pub fn stop_sweep(&self) {
        self.frontend.stop_sweep();
    }

    /// Drain backend messages and apply them to the pipeline
    pub fn process_messages(&mut self) {
        for msg in self.frontend.drain() {
            match msg {
                SweepMessage::Updated { progress } => self.data_updated(progress),
                SweepMessage::Finished => self.sweep_finished(),
                SweepMessage::SweepError(error) => self.sweep_error(error),
                SweepMessage::Shutdown => self.status = SweepStatus::Idle,
            }
        }
    }

    fn data_updated(&mut self, progress: u8) {
        self.propagator
            .on_sweep_updated(&self.buffer, &mut self.markers, &self.reference, progress);
    }

    fn sweep_finished(&mut self) {
        if self.status != SweepStatus::Error {
            self.status = SweepStatus::Idle;
        }
        self.propagator.set_progress(100);
    }

    fn sweep_error(&mut self, error: String) {
        tracing::error!(error = %error, "sweep failed");
        self.status = SweepStatus::Error;
        self.last_error = Some(error);
    }

    /// Capture the current sweep as the reference baseline
    pub fn set_reference(&mut self) {
        let captured = self
            .reference
            .set_reference(&self.buffer, None, None)
            .clone();
        self.propagator
            .on_reference_set(&self.buffer, &self.reference, &captured);
        self.reset_reference_enabled = true;
    }

    /// Drop the reference baseline. Idempotent.
    pub fn reset_reference(&mut self) {
        self.reference.reset_reference();
        self.propagator
            .on_reference_reset(&self.buffer, &self.reference);
        self.reset_reference_enabled = false;
    }

    /// Whether the reset-reference action is currently meaningful
    pub fn reset_reference_enabled(&self) -> bool {
        self.reset_reference_enabled
    }

    /// Acquisition status as last observed
    pub fn status(&self) -> SweepStatus {
        self.status
    }

    /// Last sweep error, if the most recent sweep failed
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Derived metric labels
    pub fn labels(&self) -> &StatusLabels {
        self.propagator.labels()
    }

    /// Window title reflecting sweep and reference sources
    pub fn title(&self) -> &str {
        self.propagator.title()
    }

    /// Sweep progress, 0-100
    pub fn progress(&self) -> u8 {
        self.propagator.progress()
    }

    /// Marker engine, for marker manipulation by the frontend
    pub fn markers(&self) -> &MarkerEngine {
        &self.markers
    }

    /// Mutable marker engine
    pub fn markers_mut(&mut self) -> &mut MarkerEngine {
        &mut self.markers
    }

    /// Shared sweep buffer
    pub fn buffer(&self) -> &Arc<SweepBuffer> {
        &self.buffer
    }

    /// Update propagator, for consumer registration
    pub fn propagator_mut(&mut self) -> &mut UpdatePropagator {
        &mut self.propagator
    }

    /// Session configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Stop the backend and wait for the worker, bounded in time.
    ///
    /// A worker stuck mid-acquisition is abandoned after the timeout so
    /// shutdown never hangs the process.
    pub fn shutdown(&mut self) {
        self.frontend.shutdown();

        let Some(handle) = self.worker_handle.take() else {
            return;
        };
        let deadline = Instant::now() + WORKER_KILL_TIMEOUT;
        while !handle.is_finished() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        if handle.is_finished() {
            let _ = handle.join();
            tracing::info!("backend thread stopped");
        } else {
            tracing::warn!("backend thread did not stop in time, abandoning it");
        }
    }
}

impl Drop for SweepSession {
    fn drop(&mut self) {
        if self.worker_handle.is_some() {
            self.shutdown();
        }
    }
}
