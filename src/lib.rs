//! # SweepVis-RS: VNA Sweep Visualizer Core
//!
//! A sweep-data pipeline for NanoVNA-class vector network analyzers. The
//! architecture separates the serial acquisition backend from the foreground
//! pipeline that derives everything a frontend displays.
//!
//! ## Architecture
//!
//! - **Backend**: Acquires sweeps segment by segment over serial in a
//!   separate thread
//! - **Pipeline**: Shared sweep buffer, markers, reference baseline, sweep
//!   metrics, and the update propagator that fans data out to consumers
//! - **Analysis**: Time-domain reflectometry derived from the S11 trace
//! - **Device**: Band-switch control over I/O expanders
//! - **Communication**: Crossbeam channels for thread-safe data transfer
//!
//! ## Configuration
//!
//! Settings are stored in the platform-appropriate data directory under
//! `dev.hxyulin.sweepvis-rs`:
//!
//! - **Linux**: `~/.local/share/dev.hxyulin.sweepvis-rs/`
//! - **macOS**: `~/Library/Application Support/dev.hxyulin.sweepvis-rs/`
//! - **Windows**: `%APPDATA%\dev.hxyulin.sweepvis-rs\`
//!
//! ## Example
//!
//! ```ignore
//! use sweepvis_rs::{app::SweepSession, backend::MockVna, config::AppConfig};
//!
//! let config = AppConfig::load_or_default();
//! let mut session = SweepSession::new(config, Box::new(MockVna::new()))?;
//!
//! session.start_sweep();
//! loop {
//!     session.process_messages();
//!     // render session.labels(), session.markers(), session.title()
//! }
//! ```

pub mod analysis;
pub mod app;
pub mod backend;
pub mod config;
pub mod device;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use app::SweepSession;
pub use backend::{SweepBackend, SweepCommand, SweepMessage};
pub use config::AppConfig;
pub use error::{Result, SweepVisError};
pub use types::{ReferenceSet, SweepPoint, SweepResult, SweepStatus};
