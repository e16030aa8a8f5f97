//! Low-level Seesaw protocol driver.
//!
//! Implements the register-addressed I2C primitives of the Seesaw firmware:
//! every transaction starts with a two-byte `(module, function)` selector.
//! Reads are split into a select write and a separate read, with a settling
//! delay in between.
//!
//! This module is crate-private; consumers interact with
//! [`NeoTrellis`](crate::NeoTrellis) instead.

use embassy_time::{Duration, Timer};
use embedded_hal_async::i2c::I2c;

use crate::error::TrellisError;
use crate::registers::MAX_WRITE_PAYLOAD;

/// Low-level Seesaw protocol driver.
///
/// Owns an I2C peripheral. Each method is exactly one logical bus
/// operation; failures are returned to the caller and never retried here.
pub(crate) struct SeesawDriver<I2C> {
    i2c: I2C,
    address: u8,
    read_settle: Duration,
}

impl<I2C> SeesawDriver<I2C>
where
    I2C: I2c,
{
    /// Create a new Seesaw driver.
    ///
    /// # Arguments
    /// * `i2c` — I2C peripheral (takes ownership for exclusive access)
    /// * `address` — 7-bit I2C device address
    /// * `read_settle` — delay between the select write and the data read
    pub fn new(i2c: I2C, address: u8, read_settle: Duration) -> Self {
        Self {
            i2c,
            address,
            read_settle,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give the I2C peripheral back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    #[cfg(test)]
    pub fn bus(&self) -> &I2C {
        &self.i2c
    }

    // -----------------------------------------------------------------------
    // Core protocol primitives
    // -----------------------------------------------------------------------

    /// Write `payload` to a register in a single I2C transaction:
    /// `[module, function, payload...]`.
    ///
    /// An empty payload sends the bare selector, which is how commands such
    /// as NeoPixel SHOW are triggered.
    pub async fn write(
        &mut self,
        module: u8,
        function: u8,
        payload: &[u8],
    ) -> Result<(), TrellisError<I2C::Error>> {
        if payload.len() > MAX_WRITE_PAYLOAD {
            return Err(TrellisError::PayloadTooLong);
        }

        let mut buf = [0u8; 2 + MAX_WRITE_PAYLOAD];
        buf[0] = module;
        buf[1] = function;
        buf[2..2 + payload.len()].copy_from_slice(payload);

        self.i2c.write(self.address, &buf[..2 + payload.len()]).await?;

        Ok(())
    }

    /// Select a register, wait for the firmware to prepare the data, then
    /// read `buffer.len()` bytes.
    ///
    /// Uses separate `write()` and `read()` operations rather than
    /// `write_read()`: a repeated start does not leave the Seesaw enough time
    /// to prepare its response.
    pub async fn read(
        &mut self,
        module: u8,
        function: u8,
        buffer: &mut [u8],
    ) -> Result<(), TrellisError<I2C::Error>> {
        self.i2c.write(self.address, &[module, function]).await?;

        Timer::after(self.read_settle).await;

        self.i2c.read(self.address, buffer).await?;

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Typed read/write helpers
    // -----------------------------------------------------------------------

    /// Read a single byte from a register.
    pub async fn read_u8(
        &mut self,
        module: u8,
        function: u8,
    ) -> Result<u8, TrellisError<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.read(module, function, &mut buf).await?;
        Ok(buf[0])
    }

    /// Read a 32-bit big-endian value (Seesaw byte order) from a register.
    pub async fn read_u32(
        &mut self,
        module: u8,
        function: u8,
    ) -> Result<u32, TrellisError<I2C::Error>> {
        let mut buf = [0u8; 4];
        self.read(module, function, &mut buf).await?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Write a single byte to a register.
    pub async fn write_u8(
        &mut self,
        module: u8,
        function: u8,
        value: u8,
    ) -> Result<(), TrellisError<I2C::Error>> {
        self.write(module, function, &[value]).await
    }

    /// Write a 16-bit value to a register, big-endian.
    pub async fn write_u16(
        &mut self,
        module: u8,
        function: u8,
        value: u16,
    ) -> Result<(), TrellisError<I2C::Error>> {
        self.write(module, function, &value.to_be_bytes()).await
    }
}
