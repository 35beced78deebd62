//! Foreground data pipeline
//!
//! Everything between the acquisition worker and the consumers: the shared
//! [`SweepBuffer`], marker resolution, reference handling, sweep metrics,
//! and the [`UpdatePropagator`] that fans refreshed data out.

pub mod buffer;
pub mod marker;
pub mod metrics;
pub mod propagator;
pub mod reference;

pub use buffer::SweepBuffer;
pub use marker::{DeltaValues, Marker, MarkerEngine, MarkerLabels};
pub use propagator::{CombinedConsumer, StatusLabels, TraceConsumer, UpdatePropagator};
pub use reference::ReferenceManager;
