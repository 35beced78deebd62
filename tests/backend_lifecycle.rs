//! Integration tests for the acquisition backend lifecycle
//!
//! These tests run the real worker loop in a thread against the synthetic
//! device and validate:
//! - Sweep start, segment updates, and completion
//! - Error reporting and recovery mid-sweep
//! - Clean shutdown

mod common;

use sweepvis_rs::backend::{MockVna, SweepBackend, SweepMessage};
use sweepvis_rs::config::SweepConfig;
use sweepvis_rs::pipeline::SweepBuffer;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn test_config() -> SweepConfig {
    SweepConfig {
        start_hz: 1_000_000,
        stop_hz: 30_000_000,
        segments: 3,
        points_per_segment: 21,
        ..SweepConfig::default()
    }
}

/// Collect messages until `Finished` arrives or the timeout hits
fn collect_until_finished(
    frontend: &sweepvis_rs::backend::FrontendHandle,
) -> Vec<SweepMessage> {
    let deadline = Instant::now() + common::test_timeout();
    let mut messages = Vec::new();
    while Instant::now() < deadline {
        if let Some(msg) = frontend.try_recv() {
            let finished = matches!(msg, SweepMessage::Finished);
            messages.push(msg);
            if finished {
                return messages;
            }
        } else {
            thread::sleep(Duration::from_millis(5));
        }
    }
    panic!("sweep did not finish within the timeout");
}

#[test]
fn test_full_sweep_lifecycle() {
    let config = test_config();
    let buffer = Arc::new(SweepBuffer::new(&config.device_name, 0.0));
    let (backend, frontend) = SweepBackend::new(config, Box::new(MockVna::new()), buffer.clone());
    let handle = thread::spawn(move || backend.run());

    frontend.start_sweep();
    let messages = collect_until_finished(&frontend);

    let progresses: Vec<u8> = messages
        .iter()
        .filter_map(|m| match m {
            SweepMessage::Updated { progress } => Some(*progress),
            _ => None,
        })
        .collect();
    assert_eq!(progresses, vec![33, 66, 100]);
    // 3 segments of 21 points, each join sharing one boundary sample
    assert_eq!(buffer.s11_len(), 61);
    let (s11, _) = buffer.snapshot();
    assert!(
        s11.points().windows(2).all(|w| w[0].freq < w[1].freq),
        "accumulated sweep must be strictly frequency-ascending"
    );
    assert!(buffer.source().starts_with("nanovna_"));

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_sweep_error_keeps_partial_data() {
    let config = test_config();
    let buffer = Arc::new(SweepBuffer::new(&config.device_name, 0.0));
    let device = MockVna::new().failing_after(2);
    let (backend, frontend) = SweepBackend::new(config, Box::new(device), buffer.clone());
    let handle = thread::spawn(move || backend.run());

    frontend.start_sweep();
    let messages = collect_until_finished(&frontend);

    assert!(messages
        .iter()
        .any(|m| matches!(m, SweepMessage::SweepError(_))));
    // Two segments landed before the injected failure
    assert_eq!(buffer.s11_len(), 41);

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_consecutive_sweeps_replace_buffer() {
    let config = test_config();
    let buffer = Arc::new(SweepBuffer::new(&config.device_name, 0.0));
    let (backend, frontend) = SweepBackend::new(config, Box::new(MockVna::new()), buffer.clone());
    let handle = thread::spawn(move || backend.run());

    frontend.start_sweep();
    collect_until_finished(&frontend);
    let first_len = buffer.s11_len();

    frontend.start_sweep();
    collect_until_finished(&frontend);

    // Second sweep replaces rather than appends
    assert_eq!(buffer.s11_len(), first_len);

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_shutdown_without_sweep() {
    let config = test_config();
    let buffer = Arc::new(SweepBuffer::new(&config.device_name, 0.0));
    let (backend, frontend) = SweepBackend::new(config, Box::new(MockVna::new()), buffer);
    let handle = thread::spawn(move || backend.run());

    frontend.shutdown();
    handle.join().unwrap();

    // The worker announces its exit
    let messages = frontend.drain();
    assert!(messages
        .iter()
        .any(|m| matches!(m, SweepMessage::Shutdown)));
}
