//! VNA Sweep Visualizer - Main Entry Point
//!
//! Runs one full sweep against the configured device and reports the
//! derived results. A serial port can be given as the first argument;
//! without one, an attached USB serial device is auto-detected, and the
//! synthetic device is used as a last resort.

use sweepvis_rs::app::SweepSession;
use sweepvis_rs::backend::{MockVna, SerialVna, VnaDevice};
use sweepvis_rs::config::AppConfig;
use sweepvis_rs::types::SweepStatus;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sweepvis_rs=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting VNA sweep visualizer");

    let config = AppConfig::load_or_default();

    let device: Box<dyn VnaDevice> = match std::env::args().nth(1) {
        Some(port) => Box::new(SerialVna::open(&port)?),
        None => match SerialVna::detect_port() {
            Some(port) => {
                tracing::info!(port = %port, "auto-detected serial device");
                Box::new(SerialVna::open(&port)?)
            }
            None => {
                tracing::warn!("no serial device found, using the synthetic device");
                Box::new(MockVna::new())
            }
        },
    };

    let mut session = SweepSession::new(config, device)?;
    session.start_sweep();

    while session.status() == SweepStatus::Running {
        session.process_messages();
        std::thread::sleep(Duration::from_millis(20));
    }

    if let Some(error) = session.last_error() {
        tracing::error!(error, "sweep did not complete");
    } else {
        let labels = session.labels();
        tracing::info!(title = session.title(), "sweep complete");
        tracing::info!(min_vswr = %labels.s11_min_vswr, return_loss = %labels.s11_return_loss);
        if !labels.s21_min_gain.is_empty() {
            tracing::info!(min_gain = %labels.s21_min_gain, max_gain = %labels.s21_max_gain);
        }
        if !labels.tdr_result.is_empty() {
            tracing::info!(cable_length = %labels.tdr_result);
        }
        for marker in session.markers().all() {
            tracing::info!(
                marker = %marker.name,
                frequency = %marker.labels.frequency,
                vswr = %marker.labels.s11_vswr,
                gain = %marker.labels.s11_gain,
            );
        }
    }

    if let Err(e) = session.config().store() {
        tracing::warn!(error = %e, "could not persist configuration");
    }
    session.shutdown();
    Ok(())
}
