//! Analysis parameters

/// Fixed parameters for loading audio and tracking pitch
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Rate every file is resampled to before analysis (default: 22050 Hz)
    pub sample_rate: u32,

    /// STFT frame size in samples (default: 2048)
    pub frame_size: usize,

    /// STFT hop size in samples (default: 512)
    pub hop_size: usize,

    /// Lowest frequency considered a pitch candidate (default: 150.0 Hz)
    pub fmin: f32,

    /// Upper bound for pitch candidates, clamped to Nyquist (default: 4000.0 Hz)
    pub fmax: f32,

    /// Candidate bins must exceed this fraction of the frame's peak magnitude (default: 0.1)
    pub threshold: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            frame_size: 2048,
            hop_size: 512,
            fmin: 150.0,
            fmax: 4000.0,
            threshold: 0.1,
        }
    }
}
