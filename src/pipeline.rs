//! Per-file transform: decode, trim, normalize, write.

use std::fs;
use std::path::Path;

use crate::audio::{self, OutputFormat};
use crate::error::{ConfigError, ProcessError, Result};
use crate::normalize::{normalize_peak, peak_gain};
use crate::trim::{TrimParams, trim_silence};

/// Settings applied identically to every file of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessingConfig {
    /// Silence detection settings.
    pub trim: TrimParams,
    /// Target peak level in dBFS.
    pub target_level_db: f32,
    /// Encoding of written files.
    pub output_format: OutputFormat,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            trim: TrimParams::default(),
            target_level_db: -3.0,
            output_format: OutputFormat::default(),
        }
    }
}

impl ProcessingConfig {
    /// Rejects settings that would make every file fail or misbehave.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.trim.frame_length == 0 {
            return Err(ConfigError::ZeroLength {
                name: "frame length",
            });
        }
        if self.trim.hop_length == 0 {
            return Err(ConfigError::ZeroLength { name: "hop length" });
        }
        for (name, value) in [
            ("silence threshold", self.trim.threshold_db as f64),
            ("target level", self.target_level_db as f64),
            ("guard padding", self.trim.guard_seconds),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name, value });
            }
        }
        if self.trim.guard_seconds < 0.0 {
            return Err(ConfigError::NegativeGuard(self.trim.guard_seconds));
        }
        Ok(())
    }
}

/// What happened to one successfully processed file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub sample_rate: u32,
    pub input_samples: usize,
    pub output_samples: usize,
    /// Linear gain applied by normalization; `None` when the trimmed audio
    /// was silent and left untouched.
    pub gain: Option<f32>,
}

/// Decodes `input_path`, trims and normalizes it, and writes the result to
/// `output_path` as WAV at the input's sample rate.
///
/// Parent directories of `output_path` are created as needed. Silent input is
/// not an error: it produces an empty output file.
///
/// # Errors
///
/// Returns an error if decoding, directory creation or writing fails.
pub fn transform_file(
    input_path: &Path,
    output_path: &Path,
    config: &ProcessingConfig,
) -> Result<FileReport> {
    let waveform = audio::load_mono(input_path)?;
    let trimmed = trim_silence(&waveform, &config.trim);
    if trimmed.is_empty() && !waveform.is_empty() {
        log::debug!("{} is entirely silent", input_path.display());
    }
    let gain = peak_gain(trimmed.samples(), config.target_level_db);
    let normalized = normalize_peak(&trimmed, config.target_level_db);
    log::debug!(
        "{}: kept {:.2}s of {:.2}s",
        input_path.display(),
        normalized.duration_secs(),
        waveform.duration_secs()
    );

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|source| ProcessError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    audio::write_wav(output_path, &normalized, config.output_format)?;

    Ok(FileReport {
        sample_rate: normalized.sample_rate(),
        input_samples: waveform.len(),
        output_samples: normalized.len(),
        gain,
    })
}

/// Runs [`transform_file`] and reports the outcome as a boolean.
///
/// Failures are logged with the input path and cause and never propagate.
pub fn process_file(input_path: &Path, output_path: &Path, config: &ProcessingConfig) -> bool {
    match transform_file(input_path, output_path, config) {
        Ok(report) => {
            log::debug!(
                "{} -> {}: {} -> {} samples at {} Hz",
                input_path.display(),
                output_path.display(),
                report.input_samples,
                report.output_samples,
                report.sample_rate
            );
            true
        }
        Err(e) => {
            log::error!("Error processing {}: {}", input_path.display(), e);
            false
        }
    }
}
