//! Grouping per-frame MIDI indices into note events

use serde::{Deserialize, Serialize};

use crate::midi;

/// Frames a run must last to count as a note.
pub const MIN_NOTE_FRAMES: usize = 5;

/// Consecutive unvoiced frames that end the open note.
pub const SILENCE_THRESHOLD_FRAMES: usize = 5;

/// A run of same-pitch frames long enough to be a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    #[serde(rename = "note")]
    pub name: String,
    /// Seconds
    pub duration: f64,
    /// Seconds
    #[serde(rename = "startTime")]
    pub start_time: f64,
}

/// The note currently being accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenNote {
    pub midi: i32,
    pub frames: usize,
}

/// Close `open` at frame index `end` (exclusive).
///
/// Emits only when the note lasted at least [`MIN_NOTE_FRAMES`]. The start
/// time is read `open.frames` frames before `end`, which for a note ended by
/// silence is later than the note's first frame.
pub fn close_note(
    open: &OpenNote,
    end: usize,
    times: &[f64],
    frame_interval: f64,
) -> Option<NoteEvent> {
    if open.frames < MIN_NOTE_FRAMES {
        return None;
    }
    let start_time = *times.get(end.checked_sub(open.frames)?)?;
    Some(NoteEvent {
        name: midi::midi_to_note_name(open.midi),
        duration: open.frames as f64 * frame_interval,
        start_time,
    })
}

/// Collapse a per-frame MIDI sequence into note events.
///
/// `times[i]` is the start of frame `i` in seconds; `midi_notes` and `times`
/// are expected to have the same length.
pub fn segment_notes(midi_notes: &[Option<i32>], times: &[f64]) -> Vec<NoteEvent> {
    let frame_interval = match times {
        [first, second, ..] => second - first,
        _ => 0.0,
    };

    let mut notes = Vec::new();
    let mut current: Option<OpenNote> = None;
    let mut silence_duration = 0;

    for (i, midi_note) in midi_notes.iter().enumerate() {
        match *midi_note {
            None => {
                silence_duration += 1;
                if silence_duration >= SILENCE_THRESHOLD_FRAMES {
                    if let Some(open) = current.take() {
                        notes.extend(close_note(&open, i, times, frame_interval));
                    }
                }
            }
            Some(midi) => {
                if current.map(|open| open.midi) != Some(midi) {
                    if let Some(previous) = current.take() {
                        notes.extend(close_note(&previous, i, times, frame_interval));
                    }
                    current = Some(OpenNote { midi, frames: 0 });
                }
                if let Some(open) = current.as_mut() {
                    open.frames += 1;
                }
                silence_duration = 0;
            }
        }
    }

    if let Some(open) = current {
        notes.extend(close_note(&open, times.len(), times, frame_interval));
    }

    notes
}
