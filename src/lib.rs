//! # melody-notes
//!
//! Batch conversion of melody recordings into note sequences.
//!
//! Every `melody*` audio file found under `<base>/unit*/` is decoded, pitch
//! tracked frame by frame, mapped to semitones and grouped into notes. The
//! result is written beside the source as `<name>_notes.json`:
//!
//! ```json
//! { "notes": [ { "note": "A4", "duration": 0.58, "startTime": 1.23 } ] }
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! audio file -> mono waveform -> pitch track -> MIDI indices -> note events -> JSON
//! ```
//!
//! The pitch tracker sits behind [`analyzer::PitchTracker`], so segmentation
//! only ever sees frame times and optional MIDI indices.

pub mod analyzer;
pub mod audio;
pub mod batch;
pub mod config;
pub mod error;
pub mod midi;
pub mod output;
pub mod segment;

#[cfg(test)]
mod test_util;

pub use analyzer::{Piptrack, PitchTrack, PitchTracker};
pub use batch::{run, BatchSummary, DEFAULT_BASE_DIR};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use output::NoteSequence;
pub use segment::NoteEvent;
