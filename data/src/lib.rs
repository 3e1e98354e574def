pub mod annotate;
pub mod config;
pub mod cursor;
pub mod resample;
pub mod series;
pub mod theme;
pub mod util;

pub use annotate::{CornerMarker, ValueRange};
pub use cursor::{Crosshair, Readout};
pub use resample::ResampledPair;
pub use series::{Domain, Sample, Series, SeriesStore};

/// Setup-time failures that abort a visualization attempt.
///
/// Pointer input at runtime is never an error: out-of-range distances are
/// clamped and events outside the plot are ignored.
#[derive(thiserror::Error, Debug)]
pub enum TraceError {
    #[error(transparent)]
    Session(#[from] telemetry::SessionError),
    #[error("lap distance domains do not overlap: {a} vs {b}")]
    EmptyOverlap { a: Domain, b: Domain },
}
