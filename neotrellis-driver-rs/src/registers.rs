//! Seesaw register map for the Adafruit NeoTrellis 4×4 keypad.
//!
//! The Seesaw firmware uses a two-byte register addressing scheme:
//! - Byte 1: Module ID
//! - Byte 2: Function within the module

// ---------------------------------------------------------------------------
// Module IDs
// ---------------------------------------------------------------------------

/// Seesaw status module identifier.
pub const MODULE_STATUS: u8 = 0x00;

/// Seesaw NeoPixel module identifier.
pub const MODULE_NEOPIXEL: u8 = 0x0E;

/// Seesaw keypad module identifier.
pub const MODULE_KEYPAD: u8 = 0x10;

// ---------------------------------------------------------------------------
// Status module registers
// ---------------------------------------------------------------------------

/// Hardware identity (1 byte, read-only).
pub const STATUS_HW_ID: u8 = 0x01;

/// Firmware version (4 bytes, big-endian, read-only).
pub const STATUS_VERSION: u8 = 0x02;

/// Software reset trigger (1 byte, write-only).
pub const STATUS_SWRST: u8 = 0x7F;

/// Value of [`STATUS_HW_ID`] on a SAMD09-based Seesaw.
pub const HW_ID_CODE: u8 = 0x55;

/// Byte written to [`STATUS_SWRST`] to trigger a reset.
pub const SWRST_TRIGGER: u8 = 0xFF;

// ---------------------------------------------------------------------------
// NeoPixel module registers
// ---------------------------------------------------------------------------

/// Output pin of the pixel chain (1 byte).
pub const NEOPIXEL_PIN: u8 = 0x01;

/// Pixel clock speed (1 byte): 0 = 400 kHz, 1 = 800 kHz.
pub const NEOPIXEL_SPEED: u8 = 0x02;

/// Pixel buffer length in bytes (2 bytes, big-endian).
pub const NEOPIXEL_BUF_LENGTH: u8 = 0x03;

/// Pixel buffer data: 2-byte big-endian start offset followed by data bytes.
pub const NEOPIXEL_BUF: u8 = 0x04;

/// Latch the buffer out to the pixels (no payload).
pub const NEOPIXEL_SHOW: u8 = 0x05;

/// 800 kHz pixel clock.
pub const NEOPIXEL_SPEED_800KHZ: u8 = 0x01;

/// Seesaw pin the NeoTrellis pixels are wired to.
pub const NEOTRELLIS_NEOPIXEL_PIN: u8 = 3;

// ---------------------------------------------------------------------------
// Keypad module registers
// ---------------------------------------------------------------------------

/// Per-key event configuration (2 bytes: key number, edge mask).
pub const KEYPAD_EVENT: u8 = 0x01;

/// Keypad interrupt enable (1 byte).
pub const KEYPAD_INTENSET: u8 = 0x02;

/// Number of events waiting in the FIFO (1 byte).
pub const KEYPAD_COUNT: u8 = 0x04;

/// Event FIFO (1 byte per event: key number << 2 | edge code).
pub const KEYPAD_FIFO: u8 = 0x10;

/// Edge code: key is held high.
pub const EDGE_HIGH: u8 = 0;

/// Edge code: key is held low.
pub const EDGE_LOW: u8 = 1;

/// Edge code: key was released.
pub const EDGE_FALLING: u8 = 2;

/// Edge code: key was pressed.
pub const EDGE_RISING: u8 = 3;

/// Bit 0 of the edge mask enables event generation for the key.
pub const KEY_ENABLE: u8 = 0x01;

/// Edge mask enabling press and release events. Edge `e` is bit `e + 1`.
pub const KEY_EDGE_MASK: u8 = KEY_ENABLE | (1 << (EDGE_RISING + 1)) | (1 << (EDGE_FALLING + 1));

/// FIFO byte the firmware returns for an empty slot.
pub const FIFO_EMPTY: u8 = 0xFF;

// ---------------------------------------------------------------------------
// Protocol constants
// ---------------------------------------------------------------------------

/// Default I2C address of the NeoTrellis.
pub const DEFAULT_ADDRESS: u8 = 0x2E;

/// Number of keys (and pixels) on the board.
pub const KEY_COUNT: usize = 16;

/// Bytes per pixel (G, R, B).
pub const BYTES_PER_PIXEL: usize = 3;

/// Size of the device pixel buffer.
pub const NEOPIXEL_BUFFER_LEN: usize = KEY_COUNT * BYTES_PER_PIXEL;

/// Largest payload the Seesaw accepts in one write after the 2-byte register.
pub const MAX_WRITE_PAYLOAD: usize = 30;

/// Pixel data bytes per buffer write (payload minus the 2-byte offset header).
pub const NEOPIXEL_CHUNK: usize = MAX_WRITE_PAYLOAD - 2;

/// Most FIFO entries drained in one poll.
pub const MAX_EVENTS_PER_POLL: usize = 16;
