//! Backend module for sweep acquisition over serial
//!
//! This module handles all device communication in a separate thread to keep
//! the foreground pipeline responsive. It uses crossbeam channels for
//! thread-safe communication with the frontend.
//!
//! # Architecture
//!
//! The backend runs in a separate thread, communicating via channels:
//!
//! - [`SweepCommand`] - Messages sent from the frontend to the backend
//! - [`SweepMessage`] - Messages sent from the backend to the frontend
//! - [`FrontendHandle`] - Frontend-side handle for sending commands and
//!   receiving messages
//! - [`SweepBackend`] - Main backend entry point that runs the worker loop
//!
//! # Components
//!
//! - [`VnaDevice`] - Device seam: real serial hardware or the mock
//! - [`SerialVna`] - Serial protocol implementation for NanoVNA-class devices
//! - [`MockVna`] - Synthetic device for tests and demo runs
//! - [`SweepWorker`] - Worker loop that acquires segments and fills the buffer
//!
//! # Example
//!
//! ```ignore
//! use sweepvis_rs::backend::{MockVna, SweepBackend, SweepMessage};
//! use sweepvis_rs::config::SweepConfig;
//! use sweepvis_rs::pipeline::SweepBuffer;
//! use std::sync::Arc;
//!
//! let config = SweepConfig::default();
//! let buffer = Arc::new(SweepBuffer::new(&config.device_name, 0.0));
//! let (backend, frontend) = SweepBackend::new(config, Box::new(MockVna::new()), buffer);
//!
//! std::thread::spawn(move || backend.run());
//! frontend.start_sweep();
//!
//! for msg in frontend.drain() {
//!     match msg {
//!         SweepMessage::Updated { progress } => { /* refresh consumers */ }
//!         _ => {}
//!     }
//! }
//! ```

pub mod device;
pub mod mock;
pub mod serial;
pub mod worker;

pub use device::{SegmentData, SweepSegment, VnaDevice};
pub use mock::MockVna;
pub use serial::SerialVna;
pub use worker::SweepWorker;

use crate::config::SweepConfig;
use crate::pipeline::SweepBuffer;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Message sent from the frontend to the backend
#[derive(Debug, Clone)]
pub enum SweepCommand {
    /// Begin a full sweep over all configured segments
    StartSweep,
    /// Abort the sweep in progress; already acquired data stays valid
    StopSweep,
    /// Shutdown the backend
    Shutdown,
}

/// Message sent from the backend to the frontend
#[derive(Debug, Clone)]
pub enum SweepMessage {
    /// New data landed in the sweep buffer
    Updated {
        /// Sweep completion, 0-100
        progress: u8,
    },
    /// The sweep ended (completed, aborted, or failed)
    Finished,
    /// The device failed mid-sweep; a reconnect was attempted
    SweepError(String),
    /// Backend is shutting down
    Shutdown,
}

/// Frontend handle for driving the backend
pub struct FrontendHandle {
    /// Receiver for backend messages
    pub receiver: Receiver<SweepMessage>,
    /// Sender for commands to the backend
    pub command_sender: Sender<SweepCommand>,
}

impl FrontendHandle {
    /// Try to receive a message without blocking
    pub fn try_recv(&self) -> Option<SweepMessage> {
        self.receiver.try_recv().ok()
    }

    /// Receive all pending messages
    pub fn drain(&self) -> Vec<SweepMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.receiver.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Send a command to the backend
    pub fn send_command(&self, cmd: SweepCommand) -> bool {
        self.command_sender.send(cmd).is_ok()
    }

    /// Request a sweep start
    pub fn start_sweep(&self) {
        let _ = self.command_sender.send(SweepCommand::StartSweep);
    }

    /// Request the running sweep to stop
    pub fn stop_sweep(&self) {
        let _ = self.command_sender.send(SweepCommand::StopSweep);
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        let _ = self.command_sender.send(SweepCommand::Shutdown);
    }
}

/// The acquisition backend that runs in a separate thread
pub struct SweepBackend {
    /// Sweep configuration
    config: SweepConfig,
    /// Device to sweep with
    device: Box<dyn VnaDevice>,
    /// Shared sweep buffer filled during acquisition
    buffer: Arc<SweepBuffer>,
    /// Receiver for commands from the frontend
    command_receiver: Receiver<SweepCommand>,
    /// Sender for messages to the frontend
    message_sender: Sender<SweepMessage>,
    /// Running flag
    running: Arc<AtomicBool>,
}

impl SweepBackend {
    /// Create a new backend with communication channels
    pub fn new(
        config: SweepConfig,
        device: Box<dyn VnaDevice>,
        buffer: Arc<SweepBuffer>,
    ) -> (Self, FrontendHandle) {
        let (cmd_tx, cmd_rx) = bounded(64);
        // Bounded for backpressure; a sweep produces one message per segment
        // plus Finished, so this never fills in practice
        let (msg_tx, msg_rx) = bounded(256);

        let backend = Self {
            config,
            device,
            buffer,
            command_receiver: cmd_rx,
            message_sender: msg_tx,
            running: Arc::new(AtomicBool::new(true)),
        };

        let frontend = FrontendHandle {
            receiver: msg_rx,
            command_sender: cmd_tx,
        };

        (backend, frontend)
    }

    /// Run the backend loop
    pub fn run(self) {
        let mut worker = SweepWorker::new(
            self.config,
            self.device,
            self.buffer,
            self.command_receiver,
            self.message_sender,
            self.running,
        );
        worker.run();
    }

    /// Get a handle to stop the backend
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}
