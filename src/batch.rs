//! Directory-level driver: discovery, output mirroring, progress and summary.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::ConfigError;
use crate::pipeline::{ProcessingConfig, process_file};

/// Extensions processed when none are given.
pub const DEFAULT_EXTENSIONS: &[&str] = &["wav", "mp3", "flac"];

/// Options for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Root of the tree to process (walked recursively).
    pub input_dir: PathBuf,
    /// Root of the mirrored output tree.
    pub output_dir: PathBuf,
    /// File-name suffixes to include, matched case-insensitively.
    pub extensions: Vec<String>,
    pub config: ProcessingConfig,
    /// Number of files processed concurrently; 1 means sequential.
    pub jobs: usize,
    pub show_progress: bool,
}

impl BatchOptions {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            config: ProcessingConfig::default(),
            jobs: 1,
            show_progress: false,
        }
    }

    /// Checks the options before any file is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.input_dir.is_dir() {
            return Err(ConfigError::MissingInputDir(self.input_dir.clone()));
        }
        if normalize_extensions(&self.extensions).is_empty() {
            return Err(ConfigError::NoExtensions);
        }
        self.config.validate()
    }
}

/// Aggregate outcome of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub discovered: usize,
    pub succeeded: usize,
    /// Inputs that could not be processed.
    pub failed: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

/// Lowercases extensions and gives each a leading dot, dropping blanks.
pub fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty() && e != ".")
        .map(|e| if e.starts_with('.') { e } else { format!(".{e}") })
        .collect()
}

fn has_extension(path: &Path, suffixes: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let name = name.to_lowercase();
    suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
}

/// Recursively collects files under `input_dir` whose names end with one of
/// `extensions` (case-insensitive). The result is sorted.
pub fn find_audio_files(input_dir: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let suffixes = normalize_extensions(extensions);
    let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("Skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && has_extension(entry.path(), &suffixes))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// Maps `input` under `input_dir` to its place under `output_dir`.
///
/// Outputs are always WAV, so any other extension is replaced by `.wav`.
pub fn output_path_for(input_dir: &Path, output_dir: &Path, input: &Path) -> Option<PathBuf> {
    let rel_path = input.strip_prefix(input_dir).ok()?;
    let mut output = output_dir.join(rel_path);
    let is_wav = output
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
    if !is_wav {
        output.set_extension("wav");
    }
    Some(output)
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    let template =
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";
    match ProgressStyle::default_bar().template(template) {
        Ok(style) => pb.set_style(style.progress_chars("#>-")),
        Err(e) => log::debug!("Falling back to default progress style: {e}"),
    }
    pb.set_message("Processing audio files");
    pb
}

fn process_one(options: &BatchOptions, input: &Path) -> bool {
    match output_path_for(&options.input_dir, &options.output_dir, input) {
        Some(output) => process_file(input, &output, &options.config),
        None => {
            log::error!(
                "Error processing {}: not under {}",
                input.display(),
                options.input_dir.display()
            );
            false
        }
    }
}

/// Processes every matching file under `options.input_dir`.
///
/// Per-file failures are logged and counted; only invalid options abort the
/// run, and they do so before any file is processed.
pub fn run(options: &BatchOptions) -> Result<RunSummary, ConfigError> {
    options.validate()?;
    if options.config.target_level_db > 0.0 {
        log::warn!(
            "Target level {:.1} dBFS is above full scale; PCM output will clip",
            options.config.target_level_db
        );
    }

    fs::create_dir_all(&options.output_dir).map_err(|source| ConfigError::OutputDir {
        path: options.output_dir.clone(),
        source,
    })?;

    let files = find_audio_files(&options.input_dir, &options.extensions);
    let mut summary = RunSummary {
        discovered: files.len(),
        succeeded: 0,
        failed: Vec::new(),
        output_dir: options.output_dir.clone(),
    };
    if files.is_empty() {
        return Ok(summary);
    }
    log::info!("Found {} audio files to process", files.len());

    let mut seen = HashSet::new();
    for input in &files {
        let Some(output) = output_path_for(&options.input_dir, &options.output_dir, input) else {
            continue;
        };
        if !seen.insert(output.clone()) {
            log::warn!(
                "{} maps to an output path already in use: {}",
                input.display(),
                output.display()
            );
        }
    }

    let pb = progress_bar(files.len(), options.show_progress);
    let outcomes: Vec<bool> = if options.jobs > 1 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(options.jobs)
            .build()
        {
            Ok(pool) => pool.install(|| {
                files
                    .par_iter()
                    .map(|input| {
                        let ok = process_one(options, input);
                        pb.inc(1);
                        ok
                    })
                    .collect()
            }),
            Err(e) => {
                log::warn!("Failed to build thread pool: {e}. Processing sequentially.");
                sequential(options, &files, &pb)
            }
        }
    } else {
        sequential(options, &files, &pb)
    };
    pb.finish_with_message("Done");

    for (input, ok) in files.into_iter().zip(outcomes) {
        if ok {
            summary.succeeded += 1;
        } else {
            summary.failed.push(input);
        }
    }
    Ok(summary)
}

fn sequential(options: &BatchOptions, files: &[PathBuf], pb: &ProgressBar) -> Vec<bool> {
    files
        .iter()
        .map(|input| {
            let ok = process_one(options, input);
            pb.inc(1);
            ok
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_normalize_extensions() {
        assert_eq!(
            normalize_extensions(&exts(&["wav", ".MP3", " flac ", "", "."])),
            exts(&[".wav", ".mp3", ".flac"])
        );
    }

    #[test]
    fn test_find_audio_files_filters_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("a.wav"));
        touch(&root.join("B.WAV"));
        touch(&root.join("sub/deeper/c.Flac"));
        touch(&root.join("sub/d.mp3"));
        touch(&root.join("notes.txt"));
        touch(&root.join("sub/wav"));
        fs::create_dir_all(root.join("folder.wav")).unwrap();

        let found = find_audio_files(root, &exts(&["wav", "mp3", "flac"]));
        let names: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("B.WAV"),
                PathBuf::from("a.wav"),
                PathBuf::from("sub/d.mp3"),
                PathBuf::from("sub/deeper/c.Flac"),
            ]
        );
    }

    #[test]
    fn test_output_path_mirrors_tree() {
        let input_dir = Path::new("/data/in");
        let output_dir = Path::new("/data/out");
        assert_eq!(
            output_path_for(input_dir, output_dir, Path::new("/data/in/spk1/u1.wav")),
            Some(PathBuf::from("/data/out/spk1/u1.wav"))
        );
        assert_eq!(
            output_path_for(input_dir, output_dir, Path::new("/data/in/spk1/u2.FLAC")),
            Some(PathBuf::from("/data/out/spk1/u2.wav"))
        );
        assert_eq!(
            output_path_for(input_dir, output_dir, Path::new("/elsewhere/u3.wav")),
            None
        );
    }

    #[test]
    fn test_missing_input_dir_fails_before_processing() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("out");
        let options = BatchOptions::new(dir.path().join("missing"), &output_dir);

        assert!(matches!(run(&options), Err(ConfigError::MissingInputDir(_))));
        assert!(!output_dir.exists());
    }

    #[test]
    fn test_empty_extension_list_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = BatchOptions::new(dir.path(), dir.path().join("out"));
        options.extensions = exts(&["", " "]);
        assert!(matches!(options.validate(), Err(ConfigError::NoExtensions)));
    }

    #[test]
    fn test_run_with_no_matches() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("in/readme.md"));
        let options = BatchOptions::new(dir.path().join("in"), dir.path().join("out"));

        let summary = run(&options).unwrap();
        assert_eq!(summary.discovered, 0);
        assert_eq!(summary.succeeded, 0);
        assert!(summary.failed.is_empty());
        assert!(dir.path().join("out").is_dir());
    }
}
