//! Serial protocol implementation for NanoVNA-class devices
//!
//! The device speaks a line-oriented text shell over USB serial: commands
//! are terminated with `\r`, replies are echoed lines followed by a `ch>`
//! prompt. A segment acquisition is three commands: `sweep` to set the
//! range, `frequencies` for the sample axis, and `data 0` / `data 1` for
//! the raw S11/S21 pairs.

use crate::backend::device::{SegmentData, SweepSegment, VnaDevice};
use crate::error::{Result, SweepVisError};
use crate::types::SweepPoint;
use serialport::{ClearBuffer, SerialPort};
use std::io::{BufRead, BufReader, Write};
use std::time::Duration;

const BAUD_RATE: u32 = 115_200;
const READ_TIMEOUT: Duration = Duration::from_millis(500);
/// Time for the device to complete an on-board sweep before readback
const SWEEP_SETTLE: Duration = Duration::from_millis(300);
const PROMPT: &str = "ch>";

/// A NanoVNA-class device on a serial port
pub struct SerialVna {
    port_name: String,
    reader: BufReader<Box<dyn SerialPort>>,
    healthy: bool,
}

impl SerialVna {
    /// Open the device on the given serial port
    pub fn open(port_name: &str) -> Result<Self> {
        let port = serialport::new(port_name, BAUD_RATE)
            .timeout(READ_TIMEOUT)
            .open()?;
        tracing::info!(port = port_name, "serial device opened");

        Ok(Self {
            port_name: port_name.to_string(),
            reader: BufReader::new(port),
            healthy: true,
        })
    }

    /// Serial port in use (for logging)
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// First USB serial port on the system, if any
    pub fn detect_port() -> Option<String> {
        let ports = serialport::available_ports().ok()?;
        ports
            .into_iter()
            .find(|p| matches!(p.port_type, serialport::SerialPortType::UsbPort(_)))
            .map(|p| p.port_name)
    }

    /// Send one command and collect the reply lines up to the prompt.
    ///
    /// The device echoes the command itself; the echo and the prompt line
    /// are stripped from the result.
    fn command(&mut self, cmd: &str) -> Result<Vec<String>> {
        let port = self.reader.get_mut();
        port.write_all(cmd.as_bytes())?;
        port.write_all(b"\r")?;
        port.flush()?;

        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            let n = self.reader.read_line(&mut line)?;
            if n == 0 {
                return Err(SweepVisError::Protocol(format!(
                    "device closed the connection during '{cmd}'"
                )));
            }
            let line = line.trim();
            if line.starts_with(PROMPT) {
                return Ok(lines);
            }
            if line.is_empty() || line == cmd {
                continue;
            }
            lines.push(line.to_string());
        }
    }

    /// Parse `frequencies` output: one integer Hz value per line
    fn parse_frequencies(lines: &[String]) -> Result<Vec<u64>> {
        lines
            .iter()
            .map(|line| {
                line.trim().parse::<u64>().map_err(|_| {
                    SweepVisError::Protocol(format!("bad frequency line: {line:?}"))
                })
            })
            .collect()
    }

    /// Parse `data N` output: one "re im" float pair per line
    fn parse_data(lines: &[String]) -> Result<Vec<(f64, f64)>> {
        lines
            .iter()
            .map(|line| {
                let mut parts = line.split_whitespace();
                let re = parts.next().and_then(|s| s.parse::<f64>().ok());
                let im = parts.next().and_then(|s| s.parse::<f64>().ok());
                match (re, im) {
                    (Some(re), Some(im)) => Ok((re, im)),
                    _ => Err(SweepVisError::Protocol(format!(
                        "bad data line: {line:?}"
                    ))),
                }
            })
            .collect()
    }
}

impl VnaDevice for SerialVna {
    fn name(&self) -> &str {
        "nanovna"
    }

    fn connected(&self) -> bool {
        self.healthy
    }

    fn read_segment(&mut self, segment: &SweepSegment) -> Result<SegmentData> {
        let result = (|| {
            self.command(&format!(
                "sweep {} {} {}",
                segment.start_hz, segment.stop_hz, segment.points
            ))?;
            std::thread::sleep(SWEEP_SETTLE);

            let freqs = Self::parse_frequencies(&self.command("frequencies")?)?;
            if freqs.len() != segment.points {
                return Err(SweepVisError::Protocol(format!(
                    "expected {} frequencies, device sent {}",
                    segment.points,
                    freqs.len()
                )));
            }

            let s11_raw = Self::parse_data(&self.command("data 0")?)?;
            if s11_raw.len() != freqs.len() {
                return Err(SweepVisError::Protocol(format!(
                    "frequency/data length mismatch: {} vs {}",
                    freqs.len(),
                    s11_raw.len()
                )));
            }
            let s21_raw = Self::parse_data(&self.command("data 1")?)?;

            let s11 = freqs
                .iter()
                .zip(&s11_raw)
                .map(|(&f, &(re, im))| SweepPoint::new(f, re, im))
                .collect();
            // Some firmware reports reflection only; a short or missing S21
            // readback is acceptable
            let s21 = freqs
                .iter()
                .zip(&s21_raw)
                .map(|(&f, &(re, im))| SweepPoint::new(f, re, im))
                .collect();

            Ok(SegmentData { s11, s21 })
        })();

        if result.is_err() {
            self.healthy = false;
        }
        result
    }

    fn flush(&mut self) -> Result<()> {
        self.reader.get_ref().clear(ClearBuffer::All)?;
        // Drop whatever half-read line is buffered on our side too
        let buffered = self.reader.buffer().len();
        self.reader.consume(buffered);
        Ok(())
    }

    fn reconnect(&mut self) -> Result<()> {
        let port = serialport::new(&self.port_name, BAUD_RATE)
            .timeout(READ_TIMEOUT)
            .open()?;
        self.reader = BufReader::new(port);
        self.healthy = true;
        tracing::info!(port = %self.port_name, "serial device reopened");
        Ok(())
    }
}
