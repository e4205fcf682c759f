use std::path::PathBuf;

use anyhow::{Context, Result};
use audio_trim_normalize::batch::{self, BatchOptions};
use audio_trim_normalize::{OutputFormat, ProcessingConfig, TrimParams};
use clap::Parser;

/// CLI arguments for the audio-trim-normalize tool.
#[derive(Parser, Debug)]
#[command(
    name = "audio-trim-normalize",
    about = "Recursively trims leading/trailing silence from audio files \
             and normalizes their peak level."
)]
struct Args {
    /// Input directory containing audio files (processed recursively).
    input_dir: PathBuf,

    /// Output directory for processed WAV files (mirrors input structure).
    output_dir: PathBuf,

    /// Silence threshold in dBFS; frames at or below it count as silence.
    #[arg(short, long, default_value_t = -40.0, allow_negative_numbers = true)]
    threshold: f32,

    /// Target peak level in dBFS after normalization.
    #[arg(short = 'l', long, default_value_t = -3.0, allow_negative_numbers = true)]
    target_level: f32,

    /// Comma-separated file extensions to process (case-insensitive).
    #[arg(short, long, value_delimiter = ',', default_value = "wav,mp3,flac")]
    extensions: Vec<String>,

    /// Analysis frame length in samples.
    #[arg(long, default_value_t = 2048)]
    frame_length: usize,

    /// Hop between analysis frames in samples.
    #[arg(long, default_value_t = 512)]
    hop_length: usize,

    /// Audio kept before and after the detected speech, in seconds.
    #[arg(long, default_value_t = 0.2)]
    guard: f64,

    /// Sample format of the written WAV files.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pcm16)]
    format: OutputFormat,

    /// Number of files to process in parallel.
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,
}

impl Args {
    fn into_options(self) -> BatchOptions {
        BatchOptions {
            input_dir: self.input_dir,
            output_dir: self.output_dir,
            extensions: self.extensions,
            config: ProcessingConfig {
                trim: TrimParams {
                    threshold_db: self.threshold,
                    frame_length: self.frame_length,
                    hop_length: self.hop_length,
                    guard_seconds: self.guard,
                },
                target_level_db: self.target_level,
                output_format: self.format,
            },
            jobs: self.jobs.max(1),
            show_progress: !self.no_progress,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = Args::parse().into_options();
    let summary = batch::run(&options).context("Invalid configuration")?;

    if summary.discovered == 0 {
        println!(
            "No audio files found in {} with extensions {:?}",
            options.input_dir.display(),
            batch::normalize_extensions(&options.extensions)
        );
        return Ok(());
    }

    println!(
        "Successfully processed {} out of {} files",
        summary.succeeded, summary.discovered
    );
    println!("Processed files saved to {}", summary.output_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Args::parse_from(["audio-trim-normalize", "in", "out"]).into_options();
        assert_eq!(options.input_dir, PathBuf::from("in"));
        assert_eq!(options.output_dir, PathBuf::from("out"));
        assert_eq!(options.extensions, vec!["wav", "mp3", "flac"]);
        assert_eq!(options.config, ProcessingConfig::default());
        assert_eq!(options.jobs, 1);
        assert!(options.show_progress);
    }

    #[test]
    fn test_overrides() {
        let options = Args::parse_from([
            "audio-trim-normalize",
            "in",
            "out",
            "--threshold",
            "-50",
            "--target-level",
            "-1.5",
            "--extensions",
            ".WAV,ogg",
            "--format",
            "float32",
            "--jobs",
            "0",
            "--no-progress",
        ])
        .into_options();
        assert_eq!(options.config.trim.threshold_db, -50.0);
        assert_eq!(options.config.target_level_db, -1.5);
        assert_eq!(options.extensions, vec![".WAV", "ogg"]);
        assert_eq!(options.config.output_format, OutputFormat::Float32);
        assert_eq!(options.jobs, 1);
        assert!(!options.show_progress);
    }

    #[test]
    fn test_missing_paths_rejected() {
        assert!(Args::try_parse_from(["audio-trim-normalize", "in"]).is_err());
    }
}
