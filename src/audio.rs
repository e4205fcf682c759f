//! Decoding audio files to mono waveforms and writing WAV output.
//!
//! WAV input is read with `hound`; every other container goes through
//! Symphonia's probe. Multi-channel audio is averaged down to mono and
//! integer PCM is scaled to `[-1.0, 1.0)`.

use std::fs::File;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{ProcessError, Result};
use crate::waveform::Waveform;

/// Sample encoding of written files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// 16-bit signed integer PCM.
    #[default]
    Pcm16,
    /// 32-bit IEEE float.
    Float32,
}

impl OutputFormat {
    fn wav_spec(self, sample_rate: u32) -> WavSpec {
        let (bits_per_sample, sample_format) = match self {
            OutputFormat::Pcm16 => (16, SampleFormat::Int),
            OutputFormat::Float32 => (32, SampleFormat::Float),
        };
        WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample,
            sample_format,
        }
    }
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

/// Decodes `path` to a mono waveform at its native sample rate.
///
/// WAV encodings `hound` rejects (A-law, µ-law, ADPCM, ...) are retried
/// through Symphonia.
pub fn load_mono(path: &Path) -> Result<Waveform> {
    if !is_wav(path) {
        return load_with_symphonia(path);
    }
    match load_wav(path) {
        Err(ProcessError::Decode { reason, .. }) => {
            log::debug!(
                "hound cannot read {} ({reason}), retrying with Symphonia",
                path.display()
            );
            load_with_symphonia(path)
        }
        other => other,
    }
}

/// Averages interleaved frames of `channels` samples into one mono sample each.
fn downmix(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}

fn load_wav(path: &Path) -> Result<Waveform> {
    let decode_err = |e: hound::Error| ProcessError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut reader = WavReader::open(path).map_err(|e| match e {
        hound::Error::IoError(source) => ProcessError::Open {
            path: path.to_path_buf(),
            source,
        },
        other => decode_err(other),
    })?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(ProcessError::NoTrack {
            path: path.to_path_buf(),
        });
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(decode_err)?,
        SampleFormat::Int => {
            let scale = (1u64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(decode_err)?
        }
    };

    let mut samples = Vec::with_capacity(interleaved.len() / spec.channels as usize);
    downmix(&interleaved, spec.channels as usize, &mut samples);
    log::debug!(
        "Read {} ({} ch, {} Hz, {} frames)",
        path.display(),
        spec.channels,
        spec.sample_rate,
        samples.len()
    );
    Ok(Waveform::new(samples, spec.sample_rate))
}

fn load_with_symphonia(path: &Path) -> Result<Waveform> {
    let decode_err = |e: SymphoniaError| ProcessError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let file = File::open(path).map_err(|source| ProcessError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(decode_err)?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ProcessError::NoTrack {
            path: path.to_path_buf(),
        })?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| ProcessError::MissingSampleRate {
            path: path.to_path_buf(),
        })?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(decode_err)?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(decode_err(e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                downmix(buf.samples(), spec.channels.count(), &mut samples);
            }
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("Skipping undecodable packet in {}: {e}", path.display());
            }
            Err(e) => return Err(decode_err(e)),
        }
    }

    log::debug!(
        "Decoded {} ({} Hz, {} frames)",
        path.display(),
        sample_rate,
        samples.len()
    );
    Ok(Waveform::new(samples, sample_rate))
}

/// Writes `waveform` as a mono WAV file at its own sample rate.
///
/// Samples outside `[-1.0, 1.0]` are clipped when writing integer PCM. An
/// empty waveform produces a valid header-only file.
pub fn write_wav(path: &Path, waveform: &Waveform, format: OutputFormat) -> Result<()> {
    let encode_err = |source: hound::Error| ProcessError::Encode {
        path: path.to_path_buf(),
        source,
    };

    let spec = format.wav_spec(waveform.sample_rate());
    let mut writer = WavWriter::create(path, spec).map_err(encode_err)?;
    match format {
        OutputFormat::Pcm16 => {
            for &sample in waveform.samples() {
                let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
                writer.write_sample(value).map_err(encode_err)?;
            }
        }
        OutputFormat::Float32 => {
            for &sample in waveform.samples() {
                writer.write_sample(sample).map_err(encode_err)?;
            }
        }
    }
    writer.finalize().map_err(encode_err)?;

    Ok(())
}
