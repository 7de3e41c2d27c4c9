//! Note sequence files

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::segment::NoteEvent;

/// The document written next to each melody file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteSequence {
    pub notes: Vec<NoteEvent>,
}

/// `unit1/melody1.mp3` => `unit1/melody1_notes.json`
pub fn notes_output_path(audio_path: &Path) -> PathBuf {
    let stem = audio_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    audio_path.with_file_name(format!("{}_notes.json", stem))
}

pub fn write_notes(path: &Path, notes: &[NoteEvent]) -> Result<(), AnalysisError> {
    #[derive(Serialize)]
    struct Borrowed<'a> {
        notes: &'a [NoteEvent],
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &Borrowed { notes })?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn read_notes(path: &Path) -> Result<NoteSequence, AnalysisError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
