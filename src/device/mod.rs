//! Band-switch hardware control
//!
//! Relay banks behind I/O expanders select the antenna band. The switch is
//! independent of the sweep path: a configuration write can happen between
//! sweeps or not at all.

pub mod expander;

pub use expander::{parse_band_config, BandSwitch, ExpanderBus, EXPANDER_ADDRESSES};
