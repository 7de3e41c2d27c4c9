const MIDI_NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Nearest-semitone MIDI index for `frequency` (A4 = 440 Hz = 69).
///
/// Unvoiced values (zero, negative or NaN) have no index.
pub fn hz_to_midi(frequency: f32) -> Option<i32> {
    if frequency.is_nan() || frequency <= 0.0 {
        return None;
    }
    let midi = 12.0 * (f64::from(frequency) / 440.0).log2() + 69.0;
    Some(midi.round() as i32)
}

/// Equal-tempered frequency of a MIDI index, the inverse of [`hz_to_midi`].
pub fn midi_to_hz(midi_note: i32) -> f32 {
    440.0 * 2.0f32.powf((midi_note - 69) as f32 / 12.0)
}

/// Note name with octave, e.g. 69 => "A4", 60 => "C4".
///
/// Octaves are floor-divided so indices below zero keep counting down
/// (-1 => "B-2").
pub fn midi_to_note_name(midi_note: i32) -> String {
    let note_index = midi_note.rem_euclid(12);
    let octave = midi_note.div_euclid(12) - 1;
    format!("{}{}", MIDI_NOTE_NAMES[note_index as usize], octave)
}
