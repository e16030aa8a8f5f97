//! Colour helpers: GRB wire order, the hue wheel and the per-key palette.

use smart_leds::RGB8;

use crate::registers::{BYTES_PER_PIXEL, KEY_COUNT, NEOPIXEL_BUFFER_LEN};

/// Pixel switched off.
pub const OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

const fn rgb(r: u8, g: u8, b: u8) -> RGB8 {
    RGB8 { r, g, b }
}

/// Colour a pressed key is lit with, by logical index.
pub const KEY_COLORS: [RGB8; KEY_COUNT] = [
    rgb(0x20, 0x00, 0x00),
    rgb(0x00, 0x20, 0x00),
    rgb(0x00, 0x00, 0x20),
    rgb(0x20, 0x20, 0x00),
    rgb(0x20, 0x00, 0x20),
    rgb(0x00, 0x20, 0x20),
    rgb(0x10, 0x10, 0x20),
    rgb(0x20, 0x10, 0x00),
    rgb(0x10, 0x20, 0x00),
    rgb(0x00, 0x10, 0x20),
    rgb(0x20, 0x00, 0x10),
    rgb(0x10, 0x00, 0x20),
    rgb(0x05, 0x20, 0x05),
    rgb(0x20, 0x05, 0x05),
    rgb(0x05, 0x05, 0x20),
    rgb(0x20, 0x10, 0x20),
];

/// Palette colour for `index`, or `None` outside 0–15.
pub fn key_color(index: u8) -> Option<RGB8> {
    KEY_COLORS.get(usize::from(index)).copied()
}

/// Bytes in the order the pixels expect them.
pub fn to_grb(color: RGB8) -> [u8; BYTES_PER_PIXEL] {
    [color.g, color.r, color.b]
}

/// Map a position on a 256-step wheel to a fully saturated hue
/// (red → green → blue → red).
pub fn color_wheel(pos: u8) -> RGB8 {
    match pos {
        0..=84 => rgb(255 - pos * 3, pos * 3, 0),
        85..=169 => {
            let p = pos - 85;
            rgb(0, 255 - p * 3, p * 3)
        }
        _ => {
            let p = pos - 170;
            rgb(p * 3, 0, 255 - p * 3)
        }
    }
}

/// One frame of the startup rainbow: key `i` shows hue `i * 16 + step * 8`.
pub fn rainbow_frame(step: u8) -> [u8; NEOPIXEL_BUFFER_LEN] {
    let mut frame = [0u8; NEOPIXEL_BUFFER_LEN];
    for (i, pixel) in frame.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
        let hue = (i as u8).wrapping_mul(16).wrapping_add(step.wrapping_mul(8));
        pixel.copy_from_slice(&to_grb(color_wheel(hue)));
    }
    frame
}

/// A frame with every pixel set to `color`.
pub fn solid_frame(color: RGB8) -> [u8; NEOPIXEL_BUFFER_LEN] {
    let grb = to_grb(color);
    let mut frame = [0u8; NEOPIXEL_BUFFER_LEN];
    for pixel in frame.chunks_exact_mut(BYTES_PER_PIXEL) {
        pixel.copy_from_slice(&grb);
    }
    frame
}
