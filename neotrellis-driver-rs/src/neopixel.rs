//! LED buffer protocol.
//!
//! The Seesaw keeps a 48-byte GRB pixel buffer. Writes carry a big-endian
//! byte offset followed by at most [`NEOPIXEL_CHUNK`] data bytes; nothing
//! reaches the pixels until SHOW latches the buffer.

use embassy_time::Timer;
use embedded_hal_async::i2c::I2c;
use smart_leds::RGB8;

use crate::color::{key_color, rainbow_frame, solid_frame, to_grb, OFF};
use crate::error::TrellisError;
use crate::registers::{
    BYTES_PER_PIXEL, KEY_COUNT, MODULE_NEOPIXEL, NEOPIXEL_BUF, NEOPIXEL_BUFFER_LEN,
    NEOPIXEL_BUF_LENGTH, NEOPIXEL_CHUNK, NEOPIXEL_PIN, NEOPIXEL_SHOW, NEOPIXEL_SPEED,
    NEOPIXEL_SPEED_800KHZ,
};
use crate::device::{NeoTrellis, Phase};

/// Frames in the startup rainbow.
pub const RAINBOW_FRAMES: u8 = 32;

impl<I2C> NeoTrellis<I2C>
where
    I2C: I2c,
{
    /// Configure the NeoPixel module: buffer length, output pin and
    /// 800 kHz speed, each followed by the configuration settle time.
    ///
    /// Ends in [`Phase::Ready`] once the device answers its hardware id
    /// again within [`Timing::begin_ready_timeout`](crate::Timing).
    ///
    /// # Errors
    /// * [`TrellisError::DeviceNotReady`] if the id never reads back
    /// * [`TrellisError::I2c`] on communication failure
    pub async fn begin(&mut self, pin: u8) -> Result<(), TrellisError<I2C::Error>> {
        Timer::after(self.timing.begin_settle).await;

        self.driver
            .write_u16(MODULE_NEOPIXEL, NEOPIXEL_BUF_LENGTH, NEOPIXEL_BUFFER_LEN as u16)
            .await?;
        self.phase = Phase::BufferConfigured;
        Timer::after(self.timing.config_settle).await;

        self.driver.write_u8(MODULE_NEOPIXEL, NEOPIXEL_PIN, pin).await?;
        Timer::after(self.timing.config_settle).await;

        self.driver
            .write_u8(MODULE_NEOPIXEL, NEOPIXEL_SPEED, NEOPIXEL_SPEED_800KHZ)
            .await?;
        Timer::after(self.timing.config_settle).await;

        if !self.wait_ready(self.timing.begin_ready_timeout).await {
            #[cfg(feature = "defmt")]
            defmt::warn!("NeoTrellis did not answer after NeoPixel setup");
            return Err(TrellisError::DeviceNotReady);
        }

        self.phase = Phase::Ready;
        #[cfg(feature = "defmt")]
        defmt::debug!("NeoPixel module ready on pin {}", pin);
        Ok(())
    }

    /// Write raw bytes into the device pixel buffer at `offset`.
    ///
    /// Split into one transaction per [`NEOPIXEL_CHUNK`] bytes, each with
    /// its own offset header.
    ///
    /// # Errors
    /// * [`TrellisError::NotConfigured`] before [`begin`](Self::begin)
    /// * [`TrellisError::PayloadTooLong`] if the range runs past the buffer
    pub async fn write_buffer(
        &mut self,
        offset: u16,
        bytes: &[u8],
    ) -> Result<(), TrellisError<I2C::Error>> {
        self.ensure_ready()?;
        if usize::from(offset) + bytes.len() > NEOPIXEL_BUFFER_LEN {
            return Err(TrellisError::PayloadTooLong);
        }

        let mut payload = [0u8; 2 + NEOPIXEL_CHUNK];
        for (i, chunk) in bytes.chunks(NEOPIXEL_CHUNK).enumerate() {
            let start = offset + (i * NEOPIXEL_CHUNK) as u16;
            payload[..2].copy_from_slice(&start.to_be_bytes());
            payload[2..2 + chunk.len()].copy_from_slice(chunk);
            self.driver
                .write(MODULE_NEOPIXEL, NEOPIXEL_BUF, &payload[..2 + chunk.len()])
                .await?;
        }

        Ok(())
    }

    /// Latch the buffer out to the pixels.
    pub async fn show(&mut self) -> Result<(), TrellisError<I2C::Error>> {
        self.ensure_ready()?;
        self.driver.write(MODULE_NEOPIXEL, NEOPIXEL_SHOW, &[]).await?;
        Timer::after(self.timing.show_settle).await;
        Ok(())
    }

    /// Set one pixel in the buffer without showing it.
    ///
    /// # Errors
    /// * [`TrellisError::InvalidKey`] if `index >= 16`
    pub async fn set_one(
        &mut self,
        index: u8,
        color: RGB8,
    ) -> Result<(), TrellisError<I2C::Error>> {
        if usize::from(index) >= KEY_COUNT {
            return Err(TrellisError::InvalidKey);
        }
        let offset = u16::from(index) * BYTES_PER_PIXEL as u16;
        self.write_buffer(offset, &to_grb(color)).await
    }

    /// Set every pixel in the buffer without showing it.
    pub async fn fill_all(&mut self, color: RGB8) -> Result<(), TrellisError<I2C::Error>> {
        self.write_buffer(0, &solid_frame(color)).await
    }

    pub async fn set_one_and_show(
        &mut self,
        index: u8,
        color: RGB8,
    ) -> Result<(), TrellisError<I2C::Error>> {
        self.set_one(index, color).await?;
        Timer::after(self.timing.buffer_settle).await;
        self.show().await
    }

    pub async fn fill_all_and_show(
        &mut self,
        color: RGB8,
    ) -> Result<(), TrellisError<I2C::Error>> {
        self.fill_all(color).await?;
        Timer::after(self.timing.buffer_settle).await;
        self.show().await
    }

    /// Light a key with its palette colour, or switch it off.
    pub async fn set_key_light(
        &mut self,
        index: u8,
        on: bool,
    ) -> Result<(), TrellisError<I2C::Error>> {
        let color = if on {
            key_color(index).ok_or(TrellisError::InvalidKey)?
        } else {
            OFF
        };
        self.set_one_and_show(index, color).await
    }

    /// Sweep a rainbow across the keys, then blank them.
    pub async fn rainbow_startup(&mut self) -> Result<(), TrellisError<I2C::Error>> {
        for step in 0..RAINBOW_FRAMES {
            self.write_buffer(0, &rainbow_frame(step)).await?;
            Timer::after(self.timing.buffer_settle).await;
            self.show().await?;
            Timer::after(self.timing.animation_frame).await;
        }
        self.fill_all_and_show(OFF).await
    }

    fn ensure_ready(&self) -> Result<(), TrellisError<I2C::Error>> {
        if self.phase == Phase::Ready {
            Ok(())
        } else {
            Err(TrellisError::NotConfigured)
        }
    }
}
