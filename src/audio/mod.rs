//! Audio decoding, down-mixing and resampling
//!
//! WAV files go through `hound`; everything else is probed and decoded with
//! Symphonia. The result is always a mono waveform at the requested rate.

use std::fs::File;
use std::path::Path;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::AnalysisError;

/// File extensions the loader accepts, lowercase.
pub const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "wav", "flac", "ogg"];

/// Mono samples in [-1.0, 1.0].
#[derive(Debug, Clone)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Interleaved samples straight out of a decoder.
struct Decoded {
    samples: Vec<f32>,
    channels: usize,
    sample_rate: u32,
}

pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            AUDIO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Decode `path`, mix it down to mono and resample it to `target_rate`.
pub fn load_mono(path: &Path, target_rate: u32) -> Result<Waveform, AnalysisError> {
    if target_rate == 0 {
        return Err(AnalysisError::InvalidInput("Invalid target sample rate".to_string()));
    }

    let is_wav = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);

    let decoded = if is_wav {
        decode_wav(path)?
    } else {
        decode_with_symphonia(path)?
    };

    log::debug!(
        "Decoded {} samples, {} channel(s) at {} Hz from {}",
        decoded.samples.len(),
        decoded.channels,
        decoded.sample_rate,
        path.display()
    );

    let mono = downmix(&decoded.samples, decoded.channels);
    if mono.is_empty() {
        return Err(AnalysisError::InvalidInput(format!(
            "No audio samples in {}",
            path.display()
        )));
    }

    let samples = resample(mono, decoded.sample_rate, target_rate)?;
    Ok(Waveform {
        samples,
        sample_rate: target_rate,
    })
}

fn decode_wav(path: &Path) -> Result<Decoded, AnalysisError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max_value = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_value))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(Decoded {
        samples,
        channels: spec.channels as usize,
        sample_rate: spec.sample_rate,
    })
}

fn decode_with_symphonia(path: &Path) -> Result<Decoded, AnalysisError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(ext);
    }

    // Gapless trims encoder delay and padding so frame 0 is the first real sample
    let format_opts = FormatOptions {
        enable_gapless: true,
        ..Default::default()
    };
    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &format_opts,
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AnalysisError::Decoding("No audio tracks found".to_string()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut channels = track.codec_params.channels.map(|c| c.count());

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                return Err(AnalysisError::Decoding(
                    "Stream changed mid-file (reset required)".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate.get_or_insert(spec.rate);
                channels.get_or_insert(spec.channels.count());

                let needs_buffer = sample_buf
                    .as_ref()
                    .map(|buf| buf.capacity() < decoded.capacity() * spec.channels.count())
                    .unwrap_or(true);
                if needs_buffer {
                    sample_buf = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
                }

                if let Some(buf) = sample_buf.as_mut() {
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
            }
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("Skipping corrupt packet in {}: {}", path.display(), e);
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let sample_rate = sample_rate
        .ok_or_else(|| AnalysisError::Decoding("Sample rate not specified".to_string()))?;
    let channels = channels
        .ok_or_else(|| AnalysisError::Decoding("Channel count not specified".to_string()))?;

    Ok(Decoded {
        samples,
        channels,
        sample_rate,
    })
}

/// Average interleaved channels into one.
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Resample mono `samples` from `from_rate` to `to_rate`.
pub fn resample(samples: Vec<f32>, from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AnalysisError> {
    if from_rate == to_rate {
        return Ok(samples);
    }
    if from_rate == 0 || samples.is_empty() {
        return Err(AnalysisError::InvalidInput(format!(
            "Cannot resample {} samples at {} Hz",
            samples.len(),
            from_rate
        )));
    }

    log::debug!("Resampling {} Hz -> {} Hz", from_rate, to_rate);

    let mut resampler = SincFixedIn::<f32>::new(
        to_rate as f64 / from_rate as f64,
        2.0,
        SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        },
        samples.len(),
        1,
    )
    .map_err(|e| AnalysisError::Processing(format!("Failed to create resampler: {}", e)))?;

    let waves_in = vec![samples];
    let mut waves_out = resampler
        .process(&waves_in, None)
        .map_err(|e| AnalysisError::Processing(format!("Resampling failed: {}", e)))?;

    Ok(waves_out.swap_remove(0))
}
