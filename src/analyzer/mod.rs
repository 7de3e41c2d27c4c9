//! Spectral pitch tracking
//!
//! A [`PitchTracker`] turns a mono waveform into one pitch estimate per STFT
//! frame. [`Piptrack`] is the default tracker: it picks thresholded local
//! maxima of each magnitude spectrum and refines them by parabolic
//! interpolation, then averages every bin of the frame into one value.

use std::f32::consts::PI;

use realfft::RealFftPlanner;
use rustfft::num_complex::Complex;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

/// One pitch estimate per frame, with the frame start times.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchTrack {
    /// Seconds
    pub times: Vec<f64>,
    /// Hz, `None` for unvoiced frames
    pub frequencies: Vec<Option<f32>>,
}

impl PitchTrack {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Anything that can estimate a per-frame pitch from mono samples.
pub trait PitchTracker {
    fn track(&self, samples: &[f32], sample_rate: u32) -> Result<PitchTrack, AnalysisError>;
}

/// Per-bin pitch candidates for every frame, frame-major.
///
/// Bins that are not candidates hold 0.0 in both matrices.
#[derive(Debug, Clone)]
pub struct PitchCandidates {
    pub times: Vec<f64>,
    pub pitches: Vec<Vec<f32>>,
    pub magnitudes: Vec<Vec<f32>>,
}

/// Parabolic-interpolation peak tracker over a centered Hann STFT.
#[derive(Debug, Clone)]
pub struct Piptrack {
    frame_size: usize,
    hop_size: usize,
    fmin: f32,
    fmax: f32,
    threshold: f32,
}

impl Default for Piptrack {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl Piptrack {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            frame_size: config.frame_size,
            hop_size: config.hop_size,
            fmin: config.fmin.max(0.0),
            fmax: config.fmax,
            threshold: config.threshold,
        }
    }

    /// Number of frequency bins per frame.
    pub fn bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    pub fn candidates(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<PitchCandidates, AnalysisError> {
        if samples.is_empty() {
            return Err(AnalysisError::InvalidInput("Empty audio samples".to_string()));
        }
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput("Invalid sample rate".to_string()));
        }
        // Centering pads frame_size / 2 on each side, so the size must be even
        if self.frame_size < 4 || self.frame_size % 2 != 0 || self.hop_size == 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid STFT parameters: frame size {}, hop size {}",
                self.frame_size, self.hop_size
            )));
        }

        let sr = sample_rate as f32;
        let bin_freq = sr / self.frame_size as f32;
        let fmax = self.fmax.min(sr / 2.0);
        let window = hann_window(self.frame_size);

        // Center each frame on its hop position
        let pad = self.frame_size / 2;
        let mut padded = vec![0.0f32; samples.len() + 2 * pad];
        padded[pad..pad + samples.len()].copy_from_slice(samples);
        let n_frames = 1 + samples.len() / self.hop_size;

        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(self.frame_size);
        let mut input = fft.make_input_vec();
        let mut output: Vec<Complex<f32>> = fft.make_output_vec();

        let mut times = Vec::with_capacity(n_frames);
        let mut pitches = Vec::with_capacity(n_frames);
        let mut magnitudes = Vec::with_capacity(n_frames);

        for frame_index in 0..n_frames {
            let start = frame_index * self.hop_size;
            let frame = &padded[start..start + self.frame_size];

            for (inp, (&x, &w)) in input.iter_mut().zip(frame.iter().zip(window.iter())) {
                *inp = x * w;
            }

            fft.process(&mut input, &mut output)
                .map_err(|e| AnalysisError::Processing(format!("FFT failed: {}", e)))?;

            let spectrum: Vec<f32> = output.iter().map(|c| c.norm()).collect();
            let (frame_pitches, frame_magnitudes) =
                pick_candidates(&spectrum, bin_freq, self.fmin, fmax, self.threshold);

            times.push(start as f64 / sample_rate as f64);
            pitches.push(frame_pitches);
            magnitudes.push(frame_magnitudes);
        }

        log::debug!(
            "Tracked {} frames ({} bins each) at {} Hz",
            n_frames,
            self.bins(),
            sample_rate
        );

        Ok(PitchCandidates {
            times,
            pitches,
            magnitudes,
        })
    }
}

impl PitchTracker for Piptrack {
    fn track(&self, samples: &[f32], sample_rate: u32) -> Result<PitchTrack, AnalysisError> {
        let candidates = self.candidates(samples, sample_rate)?;
        let frequencies = candidates
            .pitches
            .iter()
            .map(|bins| {
                let mean = bins.iter().sum::<f32>() / bins.len() as f32;
                (mean > 0.0).then_some(mean)
            })
            .collect();

        Ok(PitchTrack {
            times: candidates.times,
            frequencies,
        })
    }
}

/// Periodic Hann window.
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / size as f32).cos())
        .collect()
}

/// Pitch and magnitude per bin for one magnitude spectrum.
///
/// A bin is a candidate when it lies in `[fmin, fmax)` and is a local maximum
/// of the spectrum with everything at or below `threshold * max` zeroed.
fn pick_candidates(
    spectrum: &[f32],
    bin_freq: f32,
    fmin: f32,
    fmax: f32,
    threshold: f32,
) -> (Vec<f32>, Vec<f32>) {
    let n = spectrum.len();
    let mut pitches = vec![0.0f32; n];
    let mut magnitudes = vec![0.0f32; n];
    if n < 3 {
        return (pitches, magnitudes);
    }

    let peak = spectrum.iter().cloned().fold(0.0f32, f32::max);
    let reference = threshold * peak;
    let gated: Vec<f32> = spectrum
        .iter()
        .map(|&s| if s > reference { s } else { 0.0 })
        .collect();

    for k in 1..n {
        let freq = k as f32 * bin_freq;
        if freq < fmin || freq >= fmax {
            continue;
        }

        // The last bin compares against itself on the right
        let right = if k + 1 < n { gated[k + 1] } else { gated[k] };
        if !(gated[k] > gated[k - 1] && gated[k] >= right) {
            continue;
        }

        let (avg, shift) = if k + 1 < n {
            parabolic_shift(spectrum[k - 1], spectrum[k], spectrum[k + 1])
        } else {
            (0.0, 0.0)
        };

        pitches[k] = (k as f32 + shift) * bin_freq;
        magnitudes[k] = spectrum[k] + 0.5 * avg * shift;
    }

    (pitches, magnitudes)
}

/// Slope and vertex offset of the parabola through three neighbouring bins.
fn parabolic_shift(left: f32, centre: f32, right: f32) -> (f32, f32) {
    let avg = 0.5 * (right - left);
    let mut curvature = 2.0 * centre - right - left;
    if curvature.abs() < f32::MIN_POSITIVE {
        curvature += 1.0;
    }
    (avg, avg / curvature)
}
