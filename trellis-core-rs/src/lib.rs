//! Event pipeline for a 4×4 key/LED instrument.
//!
//! This crate holds the hardware-independent half of the instrument: the
//! button event model, the interrupt-safe queue that connects key producers
//! to the consumer loop, the wired-matrix scanner, and the monophonic PWM
//! tone engine. The NeoTrellis coprocessor protocol lives in the sibling
//! `neotrellis-driver` crate and produces the same [`ButtonEvent`]s.
//!
//! # Data flow
//!
//! ```text
//! matrix scanner (ISR) ──push──▶ EventQueue ──pop──▶ consumer loop ──▶ AudioEngine
//! coprocessor poll ─────────────────────────────────▶ consumer loop ──▶ LED buffer
//! ```
//!
//! # `no_std` Compatibility
//!
//! No heap allocation is used. Storage is fixed-size arrays; delays use
//! `embassy-time`. The optional `defmt` feature enables structured logging
//! and `defmt::Format` on the public types.

#![cfg_attr(not(test), no_std)]

pub mod audio;
pub mod error;
pub mod event;
pub mod keymap;
pub mod matrix;
pub mod queue;

pub use audio::{AudioEngine, EnvelopeConfig, PeriodSetting, RetriggerPolicy, ToneOutput, Voice};
pub use error::AudioError;
pub use event::{ButtonEvent, Edge};
pub use queue::{EventConsumer, EventProducer, EventQueue};

/// Number of keys on the grid.
pub const KEY_COUNT: usize = 16;

/// Keys per row (and per column) of the square grid.
pub const GRID_SIZE: usize = 4;
