//! Display formatting for frequencies and derived sweep quantities
//!
//! Pure string formatting used by marker labels, the statistics labels,
//! and the window title. Frequencies get an SI magnitude suffix; VSWR and
//! gain use fixed precision.

/// Format a frequency in Hz with an SI magnitude suffix, e.g. `"14.175MHz"`.
///
/// Trailing zeros in the fractional part are trimmed.
pub fn format_frequency(freq: u64) -> String {
    const STEPS: [(f64, &str); 3] = [(1e9, "GHz"), (1e6, "MHz"), (1e3, "kHz")];
    let freq_f = freq as f64;
    for (scale, suffix) in STEPS {
        if freq_f >= scale {
            let value = freq_f / scale;
            let mut s = format!("{value:.5}");
            while s.ends_with('0') {
                s.pop();
            }
            if s.ends_with('.') {
                s.pop();
            }
            return format!("{s}{suffix}");
        }
    }
    format!("{freq}Hz")
}

/// Format a VSWR value with fixed precision; unbounded VSWR renders as `"∞"`.
pub fn format_vswr(vswr: f64) -> String {
    if vswr.is_infinite() {
        "\u{221e}".to_string()
    } else {
        format!("{vswr:.3}")
    }
}

/// Format a gain value in dB, e.g. `"-3.210 dB"`.
pub fn format_gain(gain_db: f64) -> String {
    if gain_db.is_infinite() {
        return if gain_db < 0.0 {
            "-\u{221e} dB".to_string()
        } else {
            "\u{221e} dB".to_string()
        };
    }
    format!("{gain_db:.3} dB")
}

/// Format a phase in degrees, e.g. `"45.00°"`.
pub fn format_phase(phase_deg: f64) -> String {
    format!("{phase_deg:.2}\u{b0}")
}
