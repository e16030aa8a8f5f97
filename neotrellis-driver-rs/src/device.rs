//! Device handle for the Adafruit NeoTrellis 4×4 keypad.
//!
//! [`NeoTrellis`] owns the Seesaw transport and tracks how far the board has
//! been brought up. LED operations live in [`neopixel`](crate::neopixel) and
//! keypad operations in [`keypad`](crate::keypad); both are `impl` blocks on
//! this type.

use embassy_time::{Duration, Instant, Timer};
use embedded_hal_async::i2c::I2c;

use crate::driver::SeesawDriver;
use crate::error::TrellisError;
use crate::registers::{
    HW_ID_CODE, MODULE_STATUS, NEOTRELLIS_NEOPIXEL_PIN, STATUS_HW_ID, STATUS_SWRST,
    STATUS_VERSION, SWRST_TRIGGER,
};
use crate::timing::Timing;

/// How long [`NeoTrellis::start`] waits for the board after a reset.
pub const STARTUP_READY_TIMEOUT: Duration = Duration::from_millis(500);

/// Bring-up state of the NeoTrellis.
///
/// Advances `Reset → BufferConfigured → Ready` during
/// [`begin`](NeoTrellis::begin). A new [`reset`](NeoTrellis::reset) starts
/// over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Freshly constructed or software-reset; LEDs unusable.
    Reset,
    /// Pixel buffer length written, pin and speed not yet confirmed.
    BufferConfigured,
    /// NeoPixel module configured and the device answered its id.
    Ready,
}

/// Identity reported by the status module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceStatus {
    pub hw_id: u8,
    pub version: u32,
}

impl DeviceStatus {
    /// Product code in the upper half of the version word.
    pub fn product_code(&self) -> u16 {
        (self.version >> 16) as u16
    }
}

/// Async interface to one NeoTrellis board.
///
/// # Example
///
/// ```ignore
/// use neotrellis_driver::{NeoTrellis, DEFAULT_ADDRESS};
///
/// let mut trellis = NeoTrellis::new(i2c, DEFAULT_ADDRESS);
/// trellis.start().await?;
///
/// for event in trellis.poll_batch().await? {
///     // ...
/// }
/// ```
pub struct NeoTrellis<I2C> {
    pub(crate) driver: SeesawDriver<I2C>,
    pub(crate) timing: Timing,
    pub(crate) phase: Phase,
}

impl<I2C> NeoTrellis<I2C>
where
    I2C: I2c,
{
    /// Create a handle with the default [`Timing`].
    ///
    /// # Arguments
    /// * `i2c` — I2C peripheral (takes ownership for exclusive access)
    /// * `address` — 7-bit I2C device address (typically 0x2E)
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self::with_timing(i2c, address, Timing::default())
    }

    /// Create a handle with custom settling delays.
    pub fn with_timing(i2c: I2C, address: u8, timing: Timing) -> Self {
        Self {
            driver: SeesawDriver::new(i2c, address, timing.read_settle),
            timing,
            phase: Phase::Reset,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn address(&self) -> u8 {
        self.driver.address()
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Give the I2C peripheral back.
    pub fn release(self) -> I2C {
        self.driver.release()
    }

    /// Software-reset the Seesaw.
    ///
    /// Waits out the reset settle time even when the write fails; the
    /// result reflects only the bus transaction. Does not wait for the
    /// device to come back, use [`wait_ready`](Self::wait_ready) for that.
    pub async fn reset(&mut self) -> Result<(), TrellisError<I2C::Error>> {
        let result = self
            .driver
            .write_u8(MODULE_STATUS, STATUS_SWRST, SWRST_TRIGGER)
            .await;
        Timer::after(self.timing.reset_settle).await;
        self.phase = Phase::Reset;
        result
    }

    /// Poll the hardware id until it reads [`HW_ID_CODE`] or `timeout`
    /// elapses.
    ///
    /// Bus errors while polling count as "not yet". Returns `false` only
    /// after at least `timeout` has passed.
    pub async fn wait_ready(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        while Instant::now() < deadline {
            if let Ok(HW_ID_CODE) = self.driver.read_u8(MODULE_STATUS, STATUS_HW_ID).await {
                return true;
            }
            Timer::after(self.timing.ready_poll_interval).await;
        }

        false
    }

    /// Read the hardware id and firmware version.
    pub async fn status(&mut self) -> Result<DeviceStatus, TrellisError<I2C::Error>> {
        let hw_id = self.driver.read_u8(MODULE_STATUS, STATUS_HW_ID).await?;
        let version = self.driver.read_u32(MODULE_STATUS, STATUS_VERSION).await?;
        Ok(DeviceStatus { hw_id, version })
    }

    /// Full bring-up: reset, wait for the device, configure the pixels and
    /// enable press/release events on every key.
    ///
    /// # Errors
    /// * [`TrellisError::DeviceNotReady`] if the board never answers
    /// * [`TrellisError::I2c`] on communication failure
    pub async fn start(&mut self) -> Result<(), TrellisError<I2C::Error>> {
        self.reset().await?;
        if !self.wait_ready(STARTUP_READY_TIMEOUT).await {
            return Err(TrellisError::DeviceNotReady);
        }
        self.begin(NEOTRELLIS_NEOPIXEL_PIN).await?;
        self.keypad_init().await
    }
}
