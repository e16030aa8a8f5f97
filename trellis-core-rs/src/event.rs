//! Button events shared by every key source.
//!
//! Both the coprocessor FIFO decoder and the wired matrix scanner produce
//! [`ButtonEvent`]s. The wired scanner crosses the interrupt boundary through
//! the [`EventQueue`](crate::EventQueue), whose slots are 16-bit, so events
//! are packed as:
//!
//! ```text
//! bit 8      : 1 = pressed, 0 = released
//! bits 0..=7 : keypad legend character (see keymap::KEYPAD_LAYOUT)
//! ```

use crate::keymap;
use crate::KEY_COUNT;

/// Bit set in a packed event when the key went down.
pub const PRESSED_FLAG: u16 = 1 << 8;

/// Direction of a key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Key went down.
    Pressed,
    /// Key came back up.
    Released,
}

/// A single key transition on the 4×4 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvent {
    /// Logical key index, 0–15, row-major.
    pub index: u8,
    /// Transition direction.
    pub edge: Edge,
}

impl ButtonEvent {
    /// Key-down event for `index`.
    pub const fn pressed(index: u8) -> Self {
        Self {
            index,
            edge: Edge::Pressed,
        }
    }

    /// Key-up event for `index`.
    pub const fn released(index: u8) -> Self {
        Self {
            index,
            edge: Edge::Released,
        }
    }

    /// `true` for key-down events.
    pub fn is_pressed(&self) -> bool {
        self.edge == Edge::Pressed
    }

    /// Pack into a queue slot: pressed flag in bit 8, legend character in the
    /// low byte.
    ///
    /// Returns `None` if `index` is not a key on the grid.
    pub fn to_packed(&self) -> Option<u16> {
        let key = keymap::key_char(self.index)?;
        let flag = match self.edge {
            Edge::Pressed => PRESSED_FLAG,
            Edge::Released => 0,
        };
        Some(flag | u16::from(key))
    }

    /// Unpack a queue slot produced by [`to_packed`](Self::to_packed).
    ///
    /// Returns `None` when the low byte is not a legend character.
    pub fn from_packed(packed: u16) -> Option<Self> {
        let index = keymap::index_of((packed & 0xFF) as u8)?;
        debug_assert!(usize::from(index) < KEY_COUNT);
        let edge = if packed & PRESSED_FLAG != 0 {
            Edge::Pressed
        } else {
            Edge::Released
        };
        Some(Self { index, edge })
    }
}
