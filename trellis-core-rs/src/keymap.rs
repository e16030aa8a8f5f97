//! Printed legend of the wired 4×4 keypad.
//!
//! The wired scanner reports keys by their legend character so the queue
//! payload is human-readable in logs. The layout string is indexed by
//! `column * 4 + row`, matching the scan order.

use crate::{GRID_SIZE, KEY_COUNT};

/// Legend characters indexed by `column * 4 + row`.
pub const KEYPAD_LAYOUT: &[u8; KEY_COUNT] = b"DCBA#9630852*741";

/// Logical key index for a scan position.
///
/// Returns `None` when either coordinate is outside the grid.
pub fn index_for(column: u8, row: u8) -> Option<u8> {
    if usize::from(column) >= GRID_SIZE || usize::from(row) >= GRID_SIZE {
        return None;
    }
    Some(column * GRID_SIZE as u8 + row)
}

/// Legend character of a logical key index.
pub fn key_char(index: u8) -> Option<u8> {
    KEYPAD_LAYOUT.get(usize::from(index)).copied()
}

/// Logical key index of a legend character, if it is on the keypad.
pub fn index_of(key: u8) -> Option<u8> {
    KEYPAD_LAYOUT
        .iter()
        .position(|&c| c == key)
        .map(|i| i as u8)
}
