//! Leading/trailing silence removal based on framed RMS energy.

use std::ops::Range;

use crate::waveform::Waveform;

/// Floor applied to frame RMS before the dB conversion, so digital silence
/// maps to -200 dBFS instead of negative infinity.
const MIN_RMS: f64 = 1e-10;

/// Parameters for silence detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimParams {
    /// Frames at or below this level (dBFS) are silent.
    pub threshold_db: f32,
    /// Analysis frame length in samples.
    pub frame_length: usize,
    /// Distance between consecutive frame centres in samples.
    pub hop_length: usize,
    /// Audio kept on each side of the detected region, in seconds.
    pub guard_seconds: f64,
}

impl Default for TrimParams {
    fn default() -> Self {
        Self {
            threshold_db: -40.0,
            frame_length: 2048,
            hop_length: 512,
            guard_seconds: 0.2,
        }
    }
}

impl TrimParams {
    /// Guard padding in samples for the given sample rate.
    pub fn guard_samples(&self, sample_rate: u32) -> usize {
        (sample_rate as f64 * self.guard_seconds).round().max(0.0) as usize
    }
}

/// Per-frame RMS level in dBFS.
///
/// Frame `i` is centred on sample `i * hop_length` and covers `frame_length`
/// samples; positions outside the signal count as zeros. A signal of `n`
/// samples yields `1 + n / hop_length` frames, or none when the signal is
/// empty or either length is zero.
pub fn frame_levels_db(samples: &[f32], frame_length: usize, hop_length: usize) -> Vec<f32> {
    if samples.is_empty() || frame_length == 0 || hop_length == 0 {
        return Vec::new();
    }

    // Prefix sums of squared samples give each frame's energy in O(1).
    let mut prefix = Vec::with_capacity(samples.len() + 1);
    prefix.push(0.0f64);
    let mut acc = 0.0f64;
    for &s in samples {
        acc += (s as f64) * (s as f64);
        prefix.push(acc);
    }

    let len = samples.len() as isize;
    let half = (frame_length / 2) as isize;
    let n_frames = 1 + samples.len() / hop_length;

    (0..n_frames)
        .map(|i| {
            let frame_start = (i * hop_length) as isize - half;
            let lo = frame_start.clamp(0, len) as usize;
            let hi = (frame_start + frame_length as isize).clamp(0, len) as usize;
            let energy = (prefix[hi] - prefix[lo]).max(0.0);
            let frame_rms = (energy / frame_length as f64).sqrt();
            (20.0 * frame_rms.max(MIN_RMS).log10()) as f32
        })
        .collect()
}

/// Finds every maximal run of frames louder than `params.threshold_db`,
/// expressed as half-open sample ranges.
///
/// A run of frames `[f0, f1)` maps to samples `[f0 * hop, min(len, f1 * hop))`.
pub fn non_silent_regions(samples: &[f32], params: &TrimParams) -> Vec<Range<usize>> {
    let levels = frame_levels_db(samples, params.frame_length, params.hop_length);
    let hop = params.hop_length;
    let len = samples.len();

    let mut regions = Vec::new();
    let mut run_start: Option<usize> = None;
    for (i, &level) in levels.iter().enumerate() {
        let loud = level > params.threshold_db;
        match (loud, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(first)) => {
                regions.push(first * hop..(i * hop).min(len));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(first) = run_start {
        regions.push(first * hop..(levels.len() * hop).min(len));
    }

    regions.retain(|r| r.start < r.end);
    regions
}

/// Trims leading and trailing silence, keeping a guard margin on each side.
///
/// # Arguments
///
/// * `waveform` - Mono input audio.
/// * `params` - Threshold, framing and guard settings.
///
/// # Returns
///
/// The samples from the first non-silent region's start to the last one's
/// end, widened by the guard and clamped to the input. Silent gaps between
/// regions are kept. Returns an empty waveform when nothing exceeds the
/// threshold.
pub fn trim_silence(waveform: &Waveform, params: &TrimParams) -> Waveform {
    let regions = non_silent_regions(waveform.samples(), params);
    let (Some(first), Some(last)) = (regions.first(), regions.last()) else {
        log::debug!(
            "No frame above {:.1} dBFS in {} samples",
            params.threshold_db,
            waveform.len()
        );
        return Waveform::empty(waveform.sample_rate());
    };

    let guard = params.guard_samples(waveform.sample_rate());
    let start = first.start.saturating_sub(guard);
    let end = last.end.saturating_add(guard).min(waveform.len());

    log::debug!(
        "{} non-silent region(s), keeping samples {}..{} of {}",
        regions.len(),
        start,
        end,
        waveform.len()
    );
    waveform.slice(start..end)
}
