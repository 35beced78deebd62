//! Time-domain reflectometry from the S11 trace
//!
//! Transforms the frequency-domain reflection data into an impulse
//! response via an inverse FFT; the strongest reflection peak gives an
//! estimate of the cable length for a given velocity factor.

use crate::types::SweepResult;
use rustfft::{num_complex::Complex64, FftPlanner};
use std::f64::consts::PI;

/// Speed of light in vacuum, m/s
const C: f64 = 299_792_458.0;

/// Minimum inverse-FFT size; zero padding up to this interpolates the
/// impulse response for a usable distance resolution on short sweeps.
const MIN_FFT_SIZE: usize = 1024;

/// TDR result: impulse response over distance plus the peak estimate
#[derive(Debug, Clone)]
pub struct TdrResult {
    /// One-way distance axis in meters, one entry per impulse bin
    pub distance_m: Vec<f64>,
    /// Impulse response magnitude per bin
    pub impulse: Vec<f64>,
    /// Estimated cable length in meters (strongest reflection)
    pub cable_length_m: f64,
}

impl TdrResult {
    /// Data points for plotting (distance, magnitude pairs)
    pub fn plot_points(&self) -> Vec<[f64; 2]> {
        self.distance_m
            .iter()
            .zip(self.impulse.iter())
            .map(|(&d, &m)| [d, m])
            .collect()
    }
}

/// Computes the impulse response of the S11 trace
pub struct TdrAnalyzer {
    planner: FftPlanner<f64>,
    velocity_factor: f64,
}

impl TdrAnalyzer {
    /// Create an analyzer for a cable with the given velocity factor
    pub fn new(velocity_factor: f64) -> Self {
        Self {
            planner: FftPlanner::new(),
            velocity_factor,
        }
    }

    /// Velocity factor in use
    pub fn velocity_factor(&self) -> f64 {
        self.velocity_factor
    }

    /// Compute the impulse response of an S11 sweep.
    ///
    /// Returns `None` when the sweep has fewer than two points or no
    /// frequency span: a distance axis cannot be derived then.
    pub fn compute(&mut self, s11: &SweepResult) -> Option<TdrResult> {
        let (start, stop) = s11.freq_span()?;
        if stop <= start {
            return None;
        }
        let n = s11.len();
        let step_hz = (stop - start) as f64 / (n - 1) as f64;

        let fft_size = (n * 2).next_power_of_two().max(MIN_FFT_SIZE);

        // Hann window over the trace, zero padded to the FFT size
        let mut buffer: Vec<Complex64> = s11
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                let w = 0.5 * (1.0 - (2.0 * PI * i as f64 / n as f64).cos());
                p.coefficient * w
            })
            .collect();
        buffer.resize(fft_size, Complex64::new(0.0, 0.0));

        let ifft = self.planner.plan_fft_inverse(fft_size);
        ifft.process(&mut buffer);

        // Time per bin follows from the frequency step; one-way distance is
        // half the round trip at the cable's propagation velocity.
        let dt = 1.0 / (fft_size as f64 * step_hz);
        let meters_per_bin = C * self.velocity_factor * dt / 2.0;

        // Bins past the halfway point are the negative-time mirror
        let usable = fft_size / 2;
        let impulse: Vec<f64> = buffer
            .iter()
            .take(usable)
            .map(|c| c.norm() / fft_size as f64)
            .collect();
        let distance_m: Vec<f64> = (0..usable).map(|i| i as f64 * meters_per_bin).collect();

        let peak_index = impulse
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)?;

        Some(TdrResult {
            cable_length_m: distance_m[peak_index],
            distance_m,
            impulse,
        })
    }
}
