//! Error types for the tone engine.

/// Errors reported by the tone engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioError {
    /// The requested frequency cannot be reached with any clock divider
    /// (too low for the 16-bit period register, or above the clock rate).
    FrequencyOutOfRange,
    /// Key index is out of bounds (must be < [`KEY_COUNT`](crate::KEY_COUNT)).
    InvalidIndex,
}
