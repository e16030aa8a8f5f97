//! Keypad protocol.
//!
//! The Seesaw numbers keys on an 8-wide grid, so the 16 physical keys map
//! to a sparse set of key numbers. Each FIFO entry packs the key number and
//! an edge code into one byte: `key << 2 | edge`.

use embassy_time::Timer;
use embedded_hal_async::i2c::I2c;
use trellis::{ButtonEvent, Edge};

use crate::error::TrellisError;
use crate::registers::{
    EDGE_FALLING, EDGE_HIGH, EDGE_LOW, EDGE_RISING, FIFO_EMPTY, KEYPAD_COUNT, KEYPAD_EVENT,
    KEYPAD_FIFO, KEYPAD_INTENSET, KEY_COUNT, KEY_EDGE_MASK, MAX_EVENTS_PER_POLL, MODULE_KEYPAD,
};
use crate::device::NeoTrellis;

/// Seesaw key number for each logical index, row-major.
pub const KEY_LUT: [u8; KEY_COUNT] = [0, 1, 2, 3, 8, 9, 10, 11, 16, 17, 18, 19, 24, 25, 26, 27];

/// Upper bound on drain passes in [`NeoTrellis::clear_fifo`].
pub const MAX_CLEAR_PASSES: usize = 8;

/// Batch of decoded events from one poll.
pub type EventBatch = heapless::Vec<ButtonEvent, MAX_EVENTS_PER_POLL>;

pub fn hw_key_for_index(index: u8) -> Option<u8> {
    KEY_LUT.get(usize::from(index)).copied()
}

pub fn index_for_hw_key(key: u8) -> Option<u8> {
    KEY_LUT.iter().position(|&k| k == key).map(|i| i as u8)
}

/// Decode one FIFO byte.
///
/// Returns `None` for the empty marker, for key numbers outside the
/// board, and for level (non-edge) codes.
pub fn decode_fifo_byte(raw: u8) -> Option<ButtonEvent> {
    if raw == FIFO_EMPTY {
        return None;
    }
    let index = index_for_hw_key(raw >> 2)?;
    let edge = match raw & 0x03 {
        EDGE_RISING => Edge::Pressed,
        EDGE_FALLING => Edge::Released,
        // Level reports carry no transition.
        EDGE_HIGH | EDGE_LOW => return None,
        _ => return None,
    };
    Some(ButtonEvent { index, edge })
}

impl<I2C> NeoTrellis<I2C>
where
    I2C: I2c,
{
    /// Enable the keypad interrupt, subscribe every key to press and
    /// release edges, then discard anything already queued.
    pub async fn keypad_init(&mut self) -> Result<(), TrellisError<I2C::Error>> {
        self.driver.write_u8(MODULE_KEYPAD, KEYPAD_INTENSET, 0x01).await?;

        for key in KEY_LUT {
            self.driver
                .write(MODULE_KEYPAD, KEYPAD_EVENT, &[key, KEY_EDGE_MASK])
                .await?;
            Timer::after(self.timing.key_config_settle).await;
        }

        self.clear_fifo().await?;

        #[cfg(feature = "defmt")]
        defmt::debug!("keypad events enabled on {} keys", KEY_COUNT);
        Ok(())
    }

    /// Drain the event FIFO and decode every valid entry, in FIFO order.
    ///
    /// At most [`MAX_EVENTS_PER_POLL`] entries are read per call. A bus
    /// error aborts the poll; events decoded before it are lost.
    pub async fn poll_batch(&mut self) -> Result<EventBatch, TrellisError<I2C::Error>> {
        let mut events = EventBatch::new();

        let count = self.driver.read_u8(MODULE_KEYPAD, KEYPAD_COUNT).await?;
        let count = usize::from(count).min(MAX_EVENTS_PER_POLL);

        for _ in 0..count {
            Timer::after(self.timing.fifo_read_settle).await;
            let raw = self.driver.read_u8(MODULE_KEYPAD, KEYPAD_FIFO).await?;
            if let Some(event) = decode_fifo_byte(raw) {
                // Capacity equals the read bound.
                let _ = events.push(event);
            }
        }

        Ok(events)
    }

    /// First valid event of a [`poll_batch`](Self::poll_batch).
    ///
    /// The rest of the batch is drained and dropped.
    pub async fn poll(&mut self) -> Result<Option<ButtonEvent>, TrellisError<I2C::Error>> {
        Ok(self.poll_batch().await?.first().copied())
    }

    /// Read and discard pending FIFO entries until the device reports none
    /// (count 0 or 0xFF), giving up after [`MAX_CLEAR_PASSES`].
    pub async fn clear_fifo(&mut self) -> Result<(), TrellisError<I2C::Error>> {
        let mut scratch = [0u8; MAX_EVENTS_PER_POLL];

        for _ in 0..MAX_CLEAR_PASSES {
            let count = self.driver.read_u8(MODULE_KEYPAD, KEYPAD_COUNT).await?;
            if count == 0 || count == FIFO_EMPTY {
                return Ok(());
            }
            let n = usize::from(count).min(MAX_EVENTS_PER_POLL);
            self.driver
                .read(MODULE_KEYPAD, KEYPAD_FIFO, &mut scratch[..n])
                .await?;
        }

        #[cfg(feature = "defmt")]
        defmt::warn!("keypad FIFO still busy after {} passes", MAX_CLEAR_PASSES);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimSeesaw, Transfer};
    use crate::timing::Timing;
    use embassy_futures::block_on;
    use embassy_time::{Duration, Instant};

    fn trellis(sim: SimSeesaw) -> NeoTrellis<SimSeesaw> {
        NeoTrellis::with_timing(sim, 0x2E, Timing::instant())
    }

    fn byte(index: u8, edge: u8) -> u8 {
        KEY_LUT[usize::from(index)] << 2 | edge
    }

    #[test]
    fn lut_is_a_bijection() {
        for index in 0..16u8 {
            let hw = hw_key_for_index(index).unwrap();
            assert_eq!(index_for_hw_key(hw), Some(index));
        }
        assert_eq!(hw_key_for_index(16), None);
        assert_eq!(index_for_hw_key(4), None);
        assert_eq!(index_for_hw_key(28), None);
    }

    #[test]
    fn edge_mask_enables_rising_and_falling() {
        assert_eq!(KEY_EDGE_MASK, 0x19);
    }

    #[test]
    fn decode_edges() {
        assert_eq!(
            decode_fifo_byte(0b0000_1111),
            Some(ButtonEvent::pressed(3))
        );
        assert_eq!(
            decode_fifo_byte(byte(9, EDGE_FALLING)),
            Some(ButtonEvent::released(9))
        );
    }

    #[test]
    fn decode_skips_noise() {
        assert_eq!(decode_fifo_byte(FIFO_EMPTY), None);
        // Key number 4 is not on the board.
        assert_eq!(decode_fifo_byte(4 << 2 | EDGE_RISING), None);
        // Level codes are not edges.
        assert_eq!(decode_fifo_byte(byte(0, EDGE_HIGH)), None);
        assert_eq!(decode_fifo_byte(byte(0, EDGE_LOW)), None);
    }

    #[test]
    fn init_subscribes_every_key_then_clears() {
        let mut sim = SimSeesaw::ready();
        sim.fifo.extend([byte(1, EDGE_RISING), byte(1, EDGE_FALLING)]);
        let mut t = trellis(sim);
        block_on(t.keypad_init()).unwrap();
        let sim = t.release();

        assert_eq!(sim.writes_to(MODULE_KEYPAD, KEYPAD_INTENSET), vec![vec![0x01]]);
        let events = sim.writes_to(MODULE_KEYPAD, KEYPAD_EVENT);
        let expected: Vec<_> = KEY_LUT.iter().map(|&k| vec![k, 0x19]).collect();
        assert_eq!(events, expected);
        assert!(sim.fifo.is_empty());
    }

    #[test]
    fn init_waits_per_key() {
        let mut t = NeoTrellis::with_timing(
            SimSeesaw::ready(),
            0x2E,
            Timing {
                key_config_settle: Duration::from_millis(5),
                ..Timing::instant()
            },
        );
        let start = Instant::now();
        block_on(t.keypad_init()).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(80));
    }

    #[test]
    fn poll_empty_fifo_reads_count_only() {
        let mut t = trellis(SimSeesaw::ready());
        assert_eq!(block_on(t.poll()).unwrap(), None);
        assert_eq!(
            t.release().log,
            vec![
                Transfer::Write(vec![MODULE_KEYPAD, KEYPAD_COUNT]),
                Transfer::Read(1),
            ]
        );
    }

    #[test]
    fn poll_returns_pressed_event() {
        let mut sim = SimSeesaw::ready();
        sim.fifo.push_back(0b0000_1111);
        let mut t = trellis(sim);
        assert_eq!(
            block_on(t.poll()).unwrap(),
            Some(ButtonEvent::pressed(3))
        );
    }

    #[test]
    fn batch_keeps_order_and_skips_invalid() {
        let mut sim = SimSeesaw::ready();
        sim.fifo.extend([
            byte(0, EDGE_RISING),
            FIFO_EMPTY,
            byte(15, EDGE_RISING),
            byte(0, EDGE_FALLING),
        ]);
        let mut t = trellis(sim);
        let batch = block_on(t.poll_batch()).unwrap();
        assert_eq!(
            batch.as_slice(),
            &[
                ButtonEvent::pressed(0),
                ButtonEvent::pressed(15),
                ButtonEvent::released(0),
            ]
        );
    }

    #[test]
    fn poll_returns_first_and_drains_rest() {
        let mut sim = SimSeesaw::ready();
        sim.fifo.extend([byte(2, EDGE_RISING), byte(2, EDGE_FALLING)]);
        let mut t = trellis(sim);
        assert_eq!(
            block_on(t.poll()).unwrap(),
            Some(ButtonEvent::pressed(2))
        );
        assert!(t.release().fifo.is_empty());
    }

    #[test]
    fn batch_reads_at_most_sixteen_entries() {
        let mut sim = SimSeesaw::ready();
        sim.fifo.extend((0..20).map(|i| byte(i % 16, EDGE_RISING)));
        let mut t = trellis(sim);
        let batch = block_on(t.poll_batch()).unwrap();
        assert_eq!(batch.len(), 16);
        assert_eq!(t.release().fifo.len(), 4);
    }

    #[test]
    fn bus_error_mid_poll_is_reported() {
        let mut sim = SimSeesaw::ready();
        sim.fifo.extend([byte(0, EDGE_RISING), byte(1, EDGE_RISING)]);
        // Count select + read succeed, then the first FIFO select fails.
        sim.fail_after = Some(2);
        let mut t = trellis(sim);
        assert!(matches!(block_on(t.poll_batch()), Err(TrellisError::I2c(_))));
    }

    #[test]
    fn clear_stops_on_no_data_marker() {
        let mut sim = SimSeesaw::ready();
        sim.count_override = Some(FIFO_EMPTY);
        let mut t = trellis(sim);
        block_on(t.clear_fifo()).unwrap();
        assert_eq!(t.release().log.len(), 2);
    }

    #[test]
    fn clear_is_bounded_on_stuck_count() {
        let mut sim = SimSeesaw::ready();
        sim.count_override = Some(3);
        let mut t = trellis(sim);
        block_on(t.clear_fifo()).unwrap();
        // Each pass: count select + read, FIFO select + read.
        assert_eq!(t.release().log.len(), MAX_CLEAR_PASSES * 4);
    }
}
