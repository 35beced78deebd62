//! I/O-expander band switching
//!
//! Each of the four expanders drives one relay bank. A band configuration
//! is written as one byte per expander: the four relay bits in the high
//! nibble and their complement in the low nibble, which the relay driver
//! board uses as a consistency check.

use crate::error::{Result, SweepVisError};

/// Bus addresses of the four relay-bank expanders, in configuration order
pub const EXPANDER_ADDRESSES: [u8; 4] = [0x20, 0x21, 0x22, 0x23];

/// All-relays-released pattern
const CLEAR_PATTERN: u8 = 0xFF;

/// Access to I/O expanders on a control bus
pub trait ExpanderBus {
    /// Whether an expander answers at the given address
    fn probe(&mut self, address: u8) -> bool;
    /// Write one byte to the expander at the given address
    fn write_byte(&mut self, address: u8, value: u8) -> Result<()>;
}

/// Parse a band configuration string into per-expander bytes.
///
/// The format is four bracket groups of four binary digits, for example
/// `"[1000][0100][0010][0001]"`; spaces between groups are ignored. Each
/// group becomes `(bits << 4) | (!bits & 0xF)`. Any malformed input is
/// rejected as a whole before anything is written.
pub fn parse_band_config(config: &str) -> Result<[u8; 4]> {
    let compact: String = config.chars().filter(|c| !c.is_whitespace()).collect();

    let mut bytes = [0u8; 4];
    let mut chars = compact.chars();
    for byte in &mut bytes {
        if chars.next() != Some('[') {
            return Err(bad_config(config));
        }
        let mut nibble = 0u8;
        for _ in 0..4 {
            nibble = (nibble << 1)
                | match chars.next() {
                    Some('0') => 0,
                    Some('1') => 1,
                    _ => return Err(bad_config(config)),
                };
        }
        if chars.next() != Some(']') {
            return Err(bad_config(config));
        }
        *byte = (nibble << 4) | (!nibble & 0x0F);
    }
    if chars.next().is_some() {
        return Err(bad_config(config));
    }
    Ok(bytes)
}

fn bad_config(config: &str) -> SweepVisError {
    SweepVisError::DeviceConfig(format!(
        "band config must be four [bbbb] groups of binary digits, got {config:?}"
    ))
}

/// Band switch over a set of expanders.
///
/// Expanders that do not answer the presence probe are skipped on every
/// write; a write failure on one expander never blocks the others.
pub struct BandSwitch<B: ExpanderBus> {
    bus: B,
    available: [bool; 4],
}

impl<B: ExpanderBus> BandSwitch<B> {
    /// Probe all expander addresses and remember which answered
    pub fn new(mut bus: B) -> Self {
        let mut available = [false; 4];
        for (slot, &address) in available.iter_mut().zip(EXPANDER_ADDRESSES.iter()) {
            *slot = bus.probe(address);
            if !*slot {
                tracing::warn!(address, "expander not responding, bank disabled");
            }
        }
        Self { bus, available }
    }

    /// Which expanders answered the presence probe
    pub fn available(&self) -> &[bool; 4] {
        &self.available
    }

    /// Apply a band configuration, or release all relays.
    ///
    /// With `clear` set, the configuration string is ignored and every
    /// available expander gets the all-released pattern. Parse errors
    /// reject the whole configuration before any write happens.
    pub fn configure(&mut self, config: &str, clear: bool) -> Result<()> {
        let bytes = if clear {
            [CLEAR_PATTERN; 4]
        } else {
            parse_band_config(config)?
        };

        for ((&address, &byte), &present) in EXPANDER_ADDRESSES
            .iter()
            .zip(bytes.iter())
            .zip(self.available.iter())
        {
            if !present {
                continue;
            }
            if let Err(e) = self.bus.write_byte(address, byte) {
                // One failed bank leaves the others switched
                tracing::error!(address, error = %e, "expander write failed");
            } else {
                tracing::debug!(address, byte, "expander written");
            }
        }
        Ok(())
    }
}
