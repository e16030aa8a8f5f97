//! Settling delays of the NeoTrellis protocol.
//!
//! The Seesaw firmware silently drops commands that arrive before it has
//! finished processing the previous one, so every protocol phase is followed
//! by a fixed wait. They are collected here, one field per phase, rather than
//! scattered through the driver.

use embassy_time::Duration;

/// Phase → delay table used by [`NeoTrellis`](crate::NeoTrellis).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Between the register-select write and the data read.
    pub read_settle: Duration,
    /// After a software reset.
    pub reset_settle: Duration,
    /// Interval between hardware-id polls while waiting for the device.
    pub ready_poll_interval: Duration,
    /// Before the first NeoPixel configuration write.
    pub begin_settle: Duration,
    /// After each NeoPixel configuration write.
    pub config_settle: Duration,
    /// Between the last buffer write and the show command.
    pub buffer_settle: Duration,
    /// After a show command, before the next buffer write.
    pub show_settle: Duration,
    /// After each per-key event configuration write.
    pub key_config_settle: Duration,
    /// Before each FIFO read during a poll.
    pub fifo_read_settle: Duration,
    /// Frame period of the startup animation.
    pub animation_frame: Duration,
    /// How long NeoPixel setup waits for the device to answer again.
    pub begin_ready_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            read_settle: Duration::from_micros(250),
            reset_settle: Duration::from_millis(10),
            ready_poll_interval: Duration::from_millis(5),
            begin_settle: Duration::from_millis(100),
            config_settle: Duration::from_millis(20),
            buffer_settle: Duration::from_micros(300),
            show_settle: Duration::from_millis(5),
            key_config_settle: Duration::from_millis(20),
            fifo_read_settle: Duration::from_micros(600),
            animation_frame: Duration::from_millis(20),
            begin_ready_timeout: Duration::from_millis(300),
        }
    }
}

#[cfg(test)]
impl Timing {
    /// Every delay zero except the ready timeout, for protocol tests.
    pub(crate) fn instant() -> Self {
        let zero = Duration::from_ticks(0);
        Self {
            read_settle: zero,
            reset_settle: zero,
            ready_poll_interval: zero,
            begin_settle: zero,
            config_settle: zero,
            buffer_settle: zero,
            show_settle: zero,
            key_config_settle: zero,
            fifo_read_settle: zero,
            animation_frame: zero,
            begin_ready_timeout: Duration::from_millis(50),
        }
    }
}
