//! Peak normalization.

use crate::waveform::Waveform;

/// Converts a dBFS level to a linear amplitude (0 dB = 1.0).
pub fn db_to_amplitude(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Converts a linear amplitude to dBFS; zero maps to negative infinity.
pub fn amplitude_to_db(amplitude: f32) -> f32 {
    20.0 * amplitude.log10()
}

/// Largest absolute sample value, or 0.0 for an empty slice.
pub fn peak_amplitude(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |peak, &s| peak.max(s.abs()))
}

/// Linear gain that brings the peak of `samples` to `target_level_db` dBFS,
/// or `None` when there is no non-zero sample to scale.
pub fn peak_gain(samples: &[f32], target_level_db: f32) -> Option<f32> {
    let peak = peak_amplitude(samples);
    if peak == 0.0 {
        return None;
    }
    Some(db_to_amplitude(target_level_db) / peak)
}

/// Scales `waveform` so its peak absolute sample equals `target_level_db` dBFS.
///
/// A single positive gain is applied to every sample, so shape and sign are
/// kept. Empty or all-zero input is returned unchanged.
pub fn normalize_peak(waveform: &Waveform, target_level_db: f32) -> Waveform {
    let Some(gain) = peak_gain(waveform.samples(), target_level_db) else {
        return waveform.clone();
    };
    log::debug!(
        "Scaling peak to {:.2} dBFS (gain {:.3}x, {:+.2} dB)",
        target_level_db,
        gain,
        amplitude_to_db(gain)
    );

    let samples = waveform.samples().iter().map(|&s| s * gain).collect();
    Waveform::new(samples, waveform.sample_rate())
}
