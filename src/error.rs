//! Error types.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while processing a single file. Never aborts a batch run.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("no decodable audio track in {}", path.display())]
    NoTrack { path: PathBuf },

    #[error("unknown sample rate in {}", path.display())]
    MissingSampleRate { path: PathBuf },

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
}

/// Invalid run configuration, reported before any file is touched.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("input directory does not exist: {}", .0.display())]
    MissingInputDir(PathBuf),

    #[error("{name} must be greater than zero")]
    ZeroLength { name: &'static str },

    #[error("{name} must be a finite number, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("guard padding must not be negative, got {0} s")]
    NegativeGuard(f64),

    #[error("no file extensions given")]
    NoExtensions,

    #[error("failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ProcessError>;
