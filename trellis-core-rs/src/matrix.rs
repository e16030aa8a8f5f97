//! Wired 4×4 keypad matrix scanner.
//!
//! # Theory of operation
//!
//! Four column lines are outputs, four row lines are inputs. Driving one
//! column high makes every pressed key in that column pull its row high, so a
//! full picture of the keypad takes four column steps:
//!
//! 1. **Column drive** (every [`ScanTiming::column_tick`]): advance the column
//!    index `0 → 1 → 2 → 3 → 0`, drive exactly that column high and the
//!    others low.
//! 2. **Row sample** ([`ScanTiming::row_offset`] after the column switch, so
//!    the lines have settled): read the four rows and compare each against the
//!    stored "down" state of key `column * 4 + row`. A level change pushes one
//!    event through the [`EventProducer`]; an unchanged level emits nothing.
//!
//! After a full pass the scanner rests for [`ScanTiming::pass_rearm`], which
//! also sets the effective debounce interval: a bouncing contact is only seen
//! once per pass.
//!
//! Debouncing is a pure level compare. There is no stability counter, so a
//! contact that happens to bounce exactly across a sample can produce an extra
//! press/release pair.
//!
//! # Concurrency
//!
//! The scanner is meant to run in interrupt context (a high-priority
//! executor). It only touches GPIO and [`EventProducer::push`], which never
//! blocks. Owning the producer end makes it the queue's only writer.

use core::convert::Infallible;

use embassy_time::{Duration, Timer};
use embedded_hal::digital::{InputPin, OutputPin};

use crate::event::ButtonEvent;
use crate::keymap;
use crate::queue::EventProducer;
use crate::{GRID_SIZE, KEY_COUNT};

/// Scan cadence of the wired matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanTiming {
    /// Period of the column drive step.
    pub column_tick: Duration,
    /// Delay between driving a column and sampling the rows.
    pub row_offset: Duration,
    /// Rest after each full four-column pass.
    pub pass_rearm: Duration,
}

impl Default for ScanTiming {
    fn default() -> Self {
        Self {
            column_tick: Duration::from_millis(1),
            row_offset: Duration::from_micros(100),
            pass_rearm: Duration::from_millis(25),
        }
    }
}

/// Per-key "currently down" flags, compared against fresh row samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyStates {
    down: [bool; KEY_COUNT],
}

impl KeyStates {
    /// All keys up.
    pub const fn new() -> Self {
        Self {
            down: [false; KEY_COUNT],
        }
    }

    /// Whether key `index` is currently held.
    pub fn is_down(&self, index: u8) -> bool {
        self.down.get(usize::from(index)).copied().unwrap_or(false)
    }

    /// Apply a row sample taken while `column` was driven.
    ///
    /// Bit `r` of `rows` is row `r`'s level. Each level change pushes one
    /// packed event; a full queue silently drops it but the key state still
    /// follows the hardware. Returns the number of transitions seen.
    pub fn apply_rows<const N: usize>(
        &mut self,
        column: u8,
        rows: u8,
        events: &mut EventProducer<'_, N>,
    ) -> u8 {
        let mut transitions = 0;

        for row in 0..GRID_SIZE as u8 {
            let Some(index) = keymap::index_for(column, row) else {
                continue;
            };
            let asserted = rows & (1 << row) != 0;
            let slot = &mut self.down[usize::from(index)];

            let event = match (asserted, *slot) {
                (true, false) => ButtonEvent::pressed(index),
                (false, true) => ButtonEvent::released(index),
                _ => continue,
            };

            *slot = asserted;
            transitions += 1;
            if let Some(packed) = event.to_packed() {
                let _ = events.push(packed);
            }
        }

        transitions
    }
}

/// Pin mask with only `column` driven.
pub const fn column_mask(column: u8) -> u8 {
    1 << column
}

/// Timer-driven scanner owning the four column outputs and four row inputs.
pub struct MatrixScanner<C, R> {
    columns: [C; GRID_SIZE],
    rows: [R; GRID_SIZE],
    /// Column currently driven; `None` before the first drive step.
    column: Option<u8>,
    keys: KeyStates,
    timing: ScanTiming,
}

impl<C, R> MatrixScanner<C, R>
where
    C: OutputPin,
    R: InputPin<Error = C::Error>,
{
    /// Create a scanner. No pin is touched until the first drive step.
    pub fn new(columns: [C; GRID_SIZE], rows: [R; GRID_SIZE], timing: ScanTiming) -> Self {
        Self {
            columns,
            rows,
            column: None,
            keys: KeyStates::new(),
            timing,
        }
    }

    /// Column currently driven.
    pub fn current_column(&self) -> Option<u8> {
        self.column
    }

    /// Debounce state.
    pub fn keys(&self) -> &KeyStates {
        &self.keys
    }

    /// Advance to the next column and drive it high, all others low.
    pub fn drive_next_column(&mut self) -> Result<u8, C::Error> {
        let next = match self.column {
            Some(c) => (c + 1) % GRID_SIZE as u8,
            None => 0,
        };

        let mask = column_mask(next);
        for (i, pin) in self.columns.iter_mut().enumerate() {
            if mask & (1 << i) != 0 {
                pin.set_high()?;
            } else {
                pin.set_low()?;
            }
        }

        self.column = Some(next);
        Ok(next)
    }

    /// Read the four row inputs as a bit mask (bit `r` = row `r` high).
    pub fn read_rows(&mut self) -> Result<u8, C::Error> {
        let mut rows = 0;
        for (i, pin) in self.rows.iter_mut().enumerate() {
            if pin.is_high()? {
                rows |= 1 << i;
            }
        }
        Ok(rows)
    }

    /// Sample the rows of the driven column and push any transitions.
    ///
    /// Does nothing before the first drive step.
    pub fn sample_rows<const N: usize>(
        &mut self,
        events: &mut EventProducer<'_, N>,
    ) -> Result<u8, C::Error> {
        let Some(column) = self.column else {
            return Ok(0);
        };
        let rows = self.read_rows()?;
        Ok(self.keys.apply_rows(column, rows, events))
    }

    /// One full pass: drive and sample each column, then rest.
    ///
    /// Returns the number of transitions seen during the pass.
    pub async fn scan_pass<const N: usize>(
        &mut self,
        events: &mut EventProducer<'_, N>,
    ) -> Result<u8, C::Error> {
        let settle = self
            .timing
            .column_tick
            .checked_sub(self.timing.row_offset)
            .unwrap_or(Duration::from_ticks(0));
        let mut transitions = 0;

        for _ in 0..GRID_SIZE {
            self.drive_next_column()?;
            Timer::after(self.timing.row_offset).await;
            transitions += self.sample_rows(events)?;
            Timer::after(settle).await;
        }

        Timer::after(self.timing.pass_rearm).await;
        Ok(transitions)
    }

    /// Scan forever. Only returns on a pin error.
    pub async fn run<const N: usize>(
        &mut self,
        events: &mut EventProducer<'_, N>,
    ) -> Result<Infallible, C::Error> {
        loop {
            self.scan_pass(events).await?;
        }
    }
}
