//! Sweep worker loop
//!
//! The worker owns the device exclusively and is the only writer of the
//! shared sweep buffer. A sweep proceeds segment by segment: after every
//! segment the accumulated data is published to the buffer and an update
//! message is sent, so the frontend redraws incrementally instead of
//! waiting for the full sweep.
//!
//! # Error handling
//!
//! A device failure mid-sweep never tears the pipeline down: the worker
//! logs it, flushes and reconnects the device so the next sweep starts
//! clean, and reports the failure followed by a `Finished` message. Data
//! acquired before the failure stays in the buffer.

use crate::backend::device::{plan_segments, SweepSegment, VnaDevice};
use crate::backend::{SweepCommand, SweepMessage};
use crate::config::SweepConfig;
use crate::pipeline::SweepBuffer;
use crate::types::SweepResult;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How long the idle loop blocks waiting for a command
const COMMAND_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Outcome of the between-segment command check
enum SweepControl {
    Continue,
    Abort,
}

/// The worker that acquires sweeps and fills the buffer
pub struct SweepWorker {
    config: SweepConfig,
    device: Box<dyn VnaDevice>,
    buffer: Arc<SweepBuffer>,
    command_rx: Receiver<SweepCommand>,
    message_tx: Sender<SweepMessage>,
    running: Arc<AtomicBool>,
}

impl SweepWorker {
    /// Create a new worker
    pub fn new(
        config: SweepConfig,
        device: Box<dyn VnaDevice>,
        buffer: Arc<SweepBuffer>,
        command_rx: Receiver<SweepCommand>,
        message_tx: Sender<SweepMessage>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            device,
            buffer,
            command_rx,
            message_tx,
            running,
        }
    }

    /// Run the main worker loop
    pub fn run(&mut self) {
        tracing::info!(device = self.device.name(), "sweep worker started");

        while self.running.load(Ordering::SeqCst) {
            match self.command_rx.recv_timeout(COMMAND_POLL_INTERVAL) {
                Ok(SweepCommand::StartSweep) => self.run_sweep(),
                // A stop with no sweep in progress is stale, drop it
                Ok(SweepCommand::StopSweep) => {}
                Ok(SweepCommand::Shutdown) => {
                    self.running.store(false, Ordering::SeqCst);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                }
            }
        }

        let _ = self.message_tx.send(SweepMessage::Shutdown);
        tracing::info!("sweep worker stopped");
    }

    /// Acquire one full sweep, publishing after every segment
    fn run_sweep(&mut self) {
        let segments = plan_segments(
            self.config.start_hz,
            self.config.stop_hz,
            self.config.segments,
            self.config.points_per_segment,
        );
        if segments.is_empty() {
            tracing::warn!(
                start_hz = self.config.start_hz,
                stop_hz = self.config.stop_hz,
                "sweep range yields no segments"
            );
            let _ = self.message_tx.send(SweepMessage::Finished);
            return;
        }

        tracing::debug!(
            segments = segments.len(),
            points = self.config.points_per_segment,
            "sweep started"
        );

        let mut s11 = SweepResult::new();
        let mut s21 = SweepResult::new();

        for (i, segment) in segments.iter().enumerate() {
            if matches!(self.check_abort(), SweepControl::Abort) {
                tracing::info!(completed = i, total = segments.len(), "sweep aborted");
                break;
            }

            let mut data = match self.device.read_segment(segment) {
                Ok(data) => data,
                Err(e) => {
                    self.handle_sweep_error(segment, &e.to_string());
                    return;
                }
            };

            // Adjacent segments share their boundary frequency; drop the
            // repeated sample so the accumulated sweep stays a strictly
            // ascending, uniform grid
            trim_boundary_overlap(&s11, &mut data.s11);
            trim_boundary_overlap(&s21, &mut data.s21);

            s11.extend_segment(data.s11);
            s21.extend_segment(data.s21);

            self.buffer.write(s11.clone(), s21.clone(), None);
            let progress = ((i + 1) * 100 / segments.len()) as u8;
            self.try_send_message(SweepMessage::Updated { progress });
        }

        let _ = self.message_tx.send(SweepMessage::Finished);
    }

    /// Drain pending commands between segments, watching for an abort
    fn check_abort(&mut self) -> SweepControl {
        loop {
            match self.command_rx.try_recv() {
                Ok(SweepCommand::StopSweep) => return SweepControl::Abort,
                Ok(SweepCommand::Shutdown) => {
                    self.running.store(false, Ordering::SeqCst);
                    return SweepControl::Abort;
                }
                // A redundant start during a sweep is dropped
                Ok(SweepCommand::StartSweep) => {}
                Err(TryRecvError::Empty) => return SweepControl::Continue,
                Err(TryRecvError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                    return SweepControl::Abort;
                }
            }
        }
    }

    /// Recover the device after a failed segment and report the failure.
    ///
    /// Previously published buffer contents are left intact.
    fn handle_sweep_error(&mut self, segment: &SweepSegment, error: &str) {
        tracing::error!(
            start_hz = segment.start_hz,
            stop_hz = segment.stop_hz,
            error,
            "segment acquisition failed"
        );

        if let Err(e) = self.device.flush() {
            tracing::warn!(error = %e, "device flush failed during recovery");
        }
        match self.device.reconnect() {
            Ok(()) => tracing::info!(device = self.device.name(), "device reconnected"),
            Err(e) => tracing::warn!(error = %e, "device reconnect failed"),
        }

        let _ = self
            .message_tx
            .send(SweepMessage::SweepError(error.to_string()));
        let _ = self.message_tx.send(SweepMessage::Finished);
    }

    /// Try to send a message, dropping it if the frontend is not draining
    fn try_send_message(&self, msg: SweepMessage) {
        if self.message_tx.try_send(msg).is_err() {
            tracing::debug!("frontend message queue full, update dropped");
        }
    }
}

/// Drop the segment's first sample when it repeats the frequency already at
/// the end of the accumulated sweep
fn trim_boundary_overlap(accumulated: &SweepResult, segment: &mut Vec<crate::types::SweepPoint>) {
    if let (Some(last), Some(first)) = (accumulated.points().last(), segment.first()) {
        if first.freq == last.freq {
            segment.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockVna;
    use crossbeam_channel::bounded;

    fn create_test_worker(
        config: SweepConfig,
        device: Box<dyn VnaDevice>,
    ) -> (
        SweepWorker,
        Arc<SweepBuffer>,
        Receiver<SweepMessage>,
        Sender<SweepCommand>,
    ) {
        let (cmd_tx, cmd_rx) = bounded(16);
        let (msg_tx, msg_rx) = bounded(256);
        let running = Arc::new(AtomicBool::new(true));
        let buffer = Arc::new(SweepBuffer::new(&config.device_name, 0.0));

        let worker = SweepWorker::new(config, device, buffer.clone(), cmd_rx, msg_tx, running);
        (worker, buffer, msg_rx, cmd_tx)
    }

    fn small_config(segments: usize) -> SweepConfig {
        SweepConfig {
            start_hz: 1_000_000,
            stop_hz: 10_000_000,
            segments,
            points_per_segment: 11,
            ..SweepConfig::default()
        }
    }

    #[test]
    fn test_sweep_fills_buffer_and_reports_progress() {
        let (mut worker, buffer, msg_rx, _cmd_tx) =
            create_test_worker(small_config(2), Box::new(MockVna::new()));

        worker.run_sweep();

        // 2 segments of 11 points sharing one boundary sample
        assert_eq!(buffer.s11_len(), 21);
        let messages: Vec<SweepMessage> = msg_rx.try_iter().collect();
        let progresses: Vec<u8> = messages
            .iter()
            .filter_map(|m| match m {
                SweepMessage::Updated { progress } => Some(*progress),
                _ => None,
            })
            .collect();
        assert_eq!(progresses, vec![50, 100]);
        assert!(matches!(messages.last(), Some(SweepMessage::Finished)));
    }

    #[test]
    fn test_multi_segment_sweep_has_strictly_ascending_grid() {
        let (mut worker, buffer, _msg_rx, _cmd_tx) =
            create_test_worker(small_config(3), Box::new(MockVna::new()));

        worker.run_sweep();

        let (s11, s21) = buffer.snapshot();
        assert_eq!(s11.len(), 31);
        assert_eq!(s21.len(), 31);
        assert!(
            s11.points().windows(2).all(|w| w[0].freq < w[1].freq),
            "segment boundaries must not repeat a frequency"
        );
        // The uniform step survives the segment joins
        let step = s11.points()[1].freq - s11.points()[0].freq;
        assert!(s11
            .points()
            .windows(2)
            .all(|w| (w[1].freq - w[0].freq).abs_diff(step) <= 1));
    }

    #[test]
    fn test_pending_stop_aborts_without_clearing_buffer() {
        let (mut worker, buffer, msg_rx, cmd_tx) =
            create_test_worker(small_config(4), Box::new(MockVna::new()));

        // A stop already queued when the sweep starts aborts it before the
        // first segment; whatever the buffer held stays untouched
        cmd_tx.send(SweepCommand::StopSweep).unwrap();
        worker.run_sweep();

        assert_eq!(buffer.s11_len(), 0);
        let messages: Vec<SweepMessage> = msg_rx.try_iter().collect();
        assert!(matches!(messages.last(), Some(SweepMessage::Finished)));
    }

    #[test]
    fn test_device_error_reports_and_finishes() {
        let device = MockVna::new().failing_after(1);
        let (mut worker, buffer, msg_rx, _cmd_tx) =
            create_test_worker(small_config(3), Box::new(device));

        worker.run_sweep();

        // First segment landed before the failure
        assert_eq!(buffer.s11_len(), 11);
        let messages: Vec<SweepMessage> = msg_rx.try_iter().collect();
        assert!(messages
            .iter()
            .any(|m| matches!(m, SweepMessage::SweepError(_))));
        assert!(matches!(messages.last(), Some(SweepMessage::Finished)));
    }

    #[test]
    fn test_degenerate_range_finishes_immediately() {
        let config = SweepConfig {
            start_hz: 5_000_000,
            stop_hz: 5_000_000,
            ..small_config(1)
        };
        let (mut worker, buffer, msg_rx, _cmd_tx) =
            create_test_worker(config, Box::new(MockVna::new()));

        worker.run_sweep();

        assert_eq!(buffer.s11_len(), 0);
        let messages: Vec<SweepMessage> = msg_rx.try_iter().collect();
        assert!(matches!(messages.as_slice(), [SweepMessage::Finished]));
    }

    #[test]
    fn test_shutdown_command_stops_loop() {
        let (mut worker, _buffer, _msg_rx, cmd_tx) =
            create_test_worker(small_config(1), Box::new(MockVna::new()));

        cmd_tx.send(SweepCommand::Shutdown).unwrap();
        worker.run();

        assert!(!worker.running.load(Ordering::SeqCst));
    }
}
