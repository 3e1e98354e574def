pub mod session;

pub use session::{CarSample, Circuit, Corner, Lap, Session};

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("failed to read session file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse session file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no usable lap for driver {0}")]
    DataUnavailable(String),
}
