//! End-to-end tests: synthesized and fixture melodies through the whole batch

use std::f32::consts::PI;
use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use melody_notes::{batch, midi, output, AnalysisConfig, Piptrack, PitchTracker};

const SR: u32 = 22050;

/// Per-test directory under the system temp dir, removed on drop.
struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "melody-notes-it-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        ScratchDir(dir)
    }
}

impl Deref for ScratchDir {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.0
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(filename)
}

/// Write a mono 16-bit WAV of back-to-back tones; a frequency of 0 is silence.
fn write_melody(path: &Path, tones: &[(f32, f32)]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SR,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let mut n = 0usize;
    for &(freq, seconds) in tones {
        let count = (SR as f32 * seconds) as usize;
        for _ in 0..count {
            let t = n as f32 / SR as f32;
            let s = if freq > 0.0 {
                0.5 * (2.0 * PI * freq * t).sin()
            } else {
                0.0
            };
            writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
            n += 1;
        }
    }
    writer.finalize().unwrap();
}

#[test]
fn test_batch_writes_parseable_notes() {
    let base = ScratchDir::new("batch");
    let unit = base.join("unit1");
    fs::create_dir_all(&unit).unwrap();
    write_melody(&unit.join("melody1.wav"), &[(440.0, 1.0), (0.0, 0.5)]);
    write_melody(&unit.join("melody2.wav"), &[(0.0, 0.5)]);

    let summary = batch::run(&base, &AnalysisConfig::default()).unwrap();
    assert!(summary.is_success(), "failures: {:?}", summary.failures);
    assert_eq!(summary.units, 1);
    assert_eq!(summary.files, 2);

    let text = fs::read_to_string(unit.join("melody1_notes.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let notes = value["notes"].as_array().unwrap();
    assert!(!notes.is_empty());
    for note in notes {
        let object = note.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert!(object["note"].is_string());
        assert!(object["duration"].is_number());
        assert!(object["startTime"].is_number());
        assert!(object["duration"].as_f64().unwrap() > 0.0);
    }

    let silent = fs::read_to_string(unit.join("melody2_notes.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&silent).unwrap();
    assert_eq!(value["notes"].as_array().unwrap().len(), 0);
}

#[test]
fn test_steady_tone_yields_one_long_note() {
    let dir = ScratchDir::new("steady");
    let input = dir.join("melody1.wav");
    write_melody(&input, &[(440.0, 1.0)]);

    let config = AnalysisConfig::default();
    let notes = batch::analyze_file(
        &input,
        &dir.join("melody1_notes.json"),
        &Piptrack::new(&config),
        &config,
    )
    .unwrap();

    // Per-frame pitch is the mean over every bin, so a lone 440 Hz peak
    // lands far below the audible range.
    let expected = midi::midi_to_note_name(midi::hz_to_midi(440.0 / 1025.0).unwrap());
    let longest = notes
        .iter()
        .max_by(|a, b| a.duration.total_cmp(&b.duration))
        .unwrap();
    assert_eq!(longest.name, expected);
    assert!(longest.duration > 0.5, "duration {}", longest.duration);
}

#[test]
fn test_stereo_and_resampled_input() {
    let dir = ScratchDir::new("stereo");
    let input = dir.join("melody1.wav");
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&input, spec).unwrap();
    for i in 0..44100 {
        let t = i as f32 / 44100.0;
        let s = (0.5 * (2.0 * PI * 440.0 * t).sin() * i16::MAX as f32) as i16;
        writer.write_sample(s).unwrap();
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();

    let config = AnalysisConfig::default();
    let waveform = melody_notes::audio::load_mono(&input, config.sample_rate).unwrap();
    let track = Piptrack::new(&config)
        .track(&waveform.samples, waveform.sample_rate)
        .unwrap();

    let voiced = track.frequencies.iter().filter(|f| f.is_some()).count();
    assert!(voiced > track.len() / 2, "{} of {} voiced", voiced, track.len());
}

#[test]
fn test_batch_decodes_mp3_and_flac() {
    let base = ScratchDir::new("compressed");
    let unit = base.join("unit1");
    fs::create_dir_all(&unit).unwrap();
    fs::copy(fixture_path("melody_silence.mp3"), unit.join("melody1.mp3")).unwrap();
    fs::copy(fixture_path("melody_sine.flac"), unit.join("melody2.flac")).unwrap();

    let summary = batch::run(&base, &AnalysisConfig::default()).unwrap();
    assert!(summary.is_success(), "failures: {:?}", summary.failures);
    assert_eq!(summary.files, 2);

    let silent = output::read_notes(&unit.join("melody1_notes.json")).unwrap();
    assert!(silent.notes.is_empty());

    let sine = output::read_notes(&unit.join("melody2_notes.json")).unwrap();
    assert!(!sine.notes.is_empty());
    assert_eq!(summary.notes, sine.notes.len());
    for note in &sine.notes {
        assert!(note.duration > 0.0);
        assert!(note.start_time >= 0.0 && note.start_time < 1.1);
    }
}
