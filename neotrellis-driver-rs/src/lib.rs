//! Async driver for the Adafruit NeoTrellis 4×4 RGB keypad.
//!
//! This crate provides an Embassy-compatible async I2C driver for the
//! Seesaw-based NeoTrellis board (Product #3954): 16 RGB pixels and a 4×4
//! elastomer keypad behind one I2C address.
//!
//! # Architecture
//!
//! - **`driver`** (crate-private) — Seesaw transport: register selection,
//!   read settling, payload limits.
//! - **[`NeoTrellis`]** (public) — device handle tracking the bring-up
//!   [`Phase`], with LED ([`neopixel`]) and keypad ([`keypad`]) operations.
//! - **[`Timing`]** — every settling delay the firmware needs, in one table.
//!
//! # Quick start
//!
//! ```ignore
//! use neotrellis_driver::{key_color, NeoTrellis, DEFAULT_ADDRESS};
//!
//! let mut trellis = NeoTrellis::new(i2c, DEFAULT_ADDRESS);
//! trellis.start().await?;
//! trellis.rainbow_startup().await?;
//!
//! loop {
//!     for event in trellis.poll_batch().await? {
//!         trellis.set_key_light(event.index, event.is_pressed()).await?;
//!     }
//!     Timer::after_millis(10).await;
//! }
//! ```
//!
//! # Features
//!
//! - **`defmt`** — Enable [`defmt::Format`] implementations on error and
//!   status types, and protocol-milestone log lines.

#![cfg_attr(not(test), no_std)]

pub use color::{color_wheel, key_color, to_grb, KEY_COLORS, OFF};
pub use error::TrellisError;
pub use keypad::{decode_fifo_byte, hw_key_for_index, index_for_hw_key, EventBatch, KEY_LUT};
pub use registers::{DEFAULT_ADDRESS, KEY_COUNT, NEOTRELLIS_NEOPIXEL_PIN};
pub use smart_leds::RGB8;
pub use timing::Timing;
pub use device::{DeviceStatus, NeoTrellis, Phase, STARTUP_READY_TIMEOUT};

pub mod color;
mod device;
mod driver;
mod error;
pub mod keypad;
pub mod neopixel;
mod registers;
#[cfg(test)]
mod sim;
mod timing;
