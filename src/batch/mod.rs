//! Walking unit directories and converting every melody in them

use std::fs;
use std::path::{Path, PathBuf};

use crate::analyzer::{Piptrack, PitchTracker};
use crate::audio;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::midi;
use crate::output;
use crate::segment::{self, NoteEvent};

/// Directory scanned when no base directory is given.
pub const DEFAULT_BASE_DIR: &str = "../../public/audio/melodies";

const UNIT_PREFIX: &str = "unit";
const MELODY_PREFIX: &str = "melody";

/// Totals for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub units: usize,
    pub files: usize,
    pub failures: Vec<PathBuf>,
    pub notes: usize,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

fn file_name_starts_with(path: &Path, prefix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with(prefix))
        .unwrap_or(false)
}

fn sorted_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>, AnalysisError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if keep(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// `unit*` directories directly under `base`, by name.
pub fn find_unit_dirs(base: &Path) -> Result<Vec<PathBuf>, AnalysisError> {
    sorted_entries(base, |path| {
        path.is_dir() && file_name_starts_with(path, UNIT_PREFIX)
    })
}

/// `melody*` audio files directly under `unit_dir`, by name.
pub fn find_melody_files(unit_dir: &Path) -> Result<Vec<PathBuf>, AnalysisError> {
    sorted_entries(unit_dir, |path| {
        path.is_file() && file_name_starts_with(path, MELODY_PREFIX) && audio::is_audio_file(path)
    })
}

/// Turn one audio file into notes and write them to `output_path`.
pub fn analyze_file(
    input_path: &Path,
    output_path: &Path,
    tracker: &dyn PitchTracker,
    config: &AnalysisConfig,
) -> Result<Vec<NoteEvent>, AnalysisError> {
    log::info!("Analyzing file: {}", input_path.display());

    let waveform = audio::load_mono(input_path, config.sample_rate)?;
    log::debug!(
        "Loaded {:.2}s of audio at {} Hz",
        waveform.duration(),
        waveform.sample_rate
    );

    let track = tracker.track(&waveform.samples, waveform.sample_rate)?;
    let midi_notes: Vec<Option<i32>> = track
        .frequencies
        .iter()
        .map(|f| f.and_then(midi::hz_to_midi))
        .collect();
    log::debug!(
        "{} of {} frames voiced",
        midi_notes.iter().filter(|m| m.is_some()).count(),
        midi_notes.len()
    );

    let notes = segment::segment_notes(&midi_notes, &track.times);

    if let Some(first) = midi_notes.iter().flatten().next() {
        log::debug!(
            "First voiced frame: MIDI {} ({:.2} Hz)",
            first,
            midi::midi_to_hz(*first)
        );
    }

    log::info!("Found {} notes", notes.len());
    log::info!("Saving to {}", output_path.display());
    output::write_notes(output_path, &notes)?;

    Ok(notes)
}

/// Analyze every melody in `unit_dir`, skipping files that fail.
pub fn process_unit_directory(
    unit_dir: &Path,
    tracker: &dyn PitchTracker,
    config: &AnalysisConfig,
    summary: &mut BatchSummary,
) -> Result<(), AnalysisError> {
    log::info!("Processing directory: {}", unit_dir.display());
    let melody_files = find_melody_files(unit_dir)?;
    log::info!("Found {} melody files", melody_files.len());

    for melody_file in melody_files {
        let output_path = output::notes_output_path(&melody_file);
        summary.files += 1;
        match analyze_file(&melody_file, &output_path, tracker, config) {
            Ok(notes) => {
                log::info!(
                    "Found {} notes in sequence for {}",
                    notes.len(),
                    melody_file.display()
                );
                summary.notes += notes.len();
            }
            Err(e) => {
                log::error!("Failed to analyze {}: {}", melody_file.display(), e);
                summary.failures.push(melody_file);
            }
        }
    }

    Ok(())
}

/// Process every unit directory under `base_dir` with the default tracker.
pub fn run(base_dir: &Path, config: &AnalysisConfig) -> Result<BatchSummary, AnalysisError> {
    run_with_tracker(base_dir, &Piptrack::new(config), config)
}

pub fn run_with_tracker(
    base_dir: &Path,
    tracker: &dyn PitchTracker,
    config: &AnalysisConfig,
) -> Result<BatchSummary, AnalysisError> {
    log::info!("Looking for unit directories in {}", base_dir.display());
    let unit_dirs = find_unit_dirs(base_dir)?;
    log::info!("Found {} unit directories", unit_dirs.len());

    let mut summary = BatchSummary {
        units: unit_dirs.len(),
        ..BatchSummary::default()
    };

    for unit_dir in &unit_dirs {
        if let Err(e) = process_unit_directory(unit_dir, tracker, config, &mut summary) {
            log::error!("Failed to read {}: {}", unit_dir.display(), e);
            summary.failures.push(unit_dir.clone());
        }
    }

    Ok(summary)
}
