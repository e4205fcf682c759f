//! Silence trimming and peak normalization for speech corpora.
//!
//! Each file is decoded to mono, cropped to its first and last non-silent
//! regions plus a guard margin, scaled to a target peak level and written as
//! WAV into a mirrored output tree.

pub mod audio;
pub mod batch;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod trim;
pub mod waveform;

pub use audio::OutputFormat;
pub use batch::{BatchOptions, RunSummary};
pub use error::{ConfigError, ProcessError};
pub use normalize::normalize_peak;
pub use pipeline::{ProcessingConfig, process_file, transform_file};
pub use trim::{TrimParams, trim_silence};
pub use waveform::Waveform;
