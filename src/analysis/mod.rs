//! Derived analysis over sweep data

pub mod tdr;

pub use tdr::{TdrAnalyzer, TdrResult};
