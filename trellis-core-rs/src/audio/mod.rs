//! Monophonic square-wave tone engine for a PWM audio pin.
//!
//! # Architecture
//!
//! - **`period`** — pure frequency → (divider, top) arithmetic for a 16-bit
//!   PWM counter.
//! - **`engine`** — [`AudioEngine`], the Silent/Sounding state machine with
//!   click-suppressing attack and decay ramps, driving any [`ToneOutput`].
//!
//! Output frequency is `clock / (divider * (top + 1))`. The compare level is
//! held at `(top + 1) / 2` while sounding, a 50% duty cycle, which gives the
//! loudest square wave with no even harmonics.
//!
//! # Note table
//!
//! Keys map to a chromatic scale from C4 (middle C) upwards, row-major, so
//! pitch rises left→right and top→bottom:
//!
//! ```text
//! Row 0: C4   C#4  D4   D#4
//! Row 1: E4   F4   F#4  G4
//! Row 2: G#4  A4   A#4  B4
//! Row 3: C5   C#5  D5   D#5
//! ```

mod engine;
mod period;

pub use engine::{AudioEngine, EnvelopeConfig, RetriggerPolicy, ToneOutput, Voice};
pub use period::{compute_period, PeriodSetting, MAX_DIVIDER, MAX_TOP, MIN_AUDIBLE_HZ};

use crate::KEY_COUNT;

/// Note frequencies in Hz, indexed by logical key.
pub const NOTE_FREQUENCIES: [f32; KEY_COUNT] = [
    261.63, 277.18, 293.66, 311.13, // C4 – D#4
    329.63, 349.23, 369.99, 392.00, // E4 – G4
    415.30, 440.00, 466.16, 493.88, // G#4 – B4
    523.25, 554.37, 587.33, 622.25, // C5 – D#5
];

/// Frequency assigned to key `index`, or `None` off the grid.
pub fn note_for_index(index: u8) -> Option<f32> {
    NOTE_FREQUENCIES.get(usize::from(index)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_table_is_ascending_semitones() {
        for pair in NOTE_FREQUENCIES.windows(2) {
            let ratio = pair[1] / pair[0];
            // One equal-tempered semitone is 2^(1/12) ≈ 1.0595.
            assert!((ratio - 1.059_463).abs() < 0.001, "ratio {}", ratio);
        }
    }

    #[test]
    fn note_for_index_bounds() {
        assert_eq!(note_for_index(9), Some(440.0));
        assert_eq!(note_for_index(16), None);
    }
}
