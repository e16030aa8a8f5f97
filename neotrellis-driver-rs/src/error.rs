//! Error types for the NeoTrellis driver.

use core::fmt;

/// Errors that can occur when talking to the NeoTrellis.
#[derive(Debug)]
pub enum TrellisError<E> {
    /// Underlying I2C bus error. Never retried by the driver.
    I2c(E),

    /// The device did not report its hardware id before the timeout.
    DeviceNotReady,

    /// Key or pixel index out of range (must be 0–15).
    InvalidKey,

    /// LED operation attempted before the device reached
    /// [`Phase::Ready`](crate::Phase::Ready).
    NotConfigured,

    /// Write payload exceeds what one Seesaw transaction can carry.
    PayloadTooLong,
}

// Allow ergonomic `?` propagation from raw I2C errors.
impl<E> From<E> for TrellisError<E> {
    fn from(error: E) -> Self {
        TrellisError::I2c(error)
    }
}

impl<E: fmt::Debug> fmt::Display for TrellisError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrellisError::I2c(e) => write!(f, "I2C error: {:?}", e),
            TrellisError::DeviceNotReady => write!(f, "NeoTrellis did not become ready"),
            TrellisError::InvalidKey => write!(f, "Invalid key index (must be 0-15)"),
            TrellisError::NotConfigured => write!(f, "NeoTrellis not configured"),
            TrellisError::PayloadTooLong => write!(f, "Seesaw write payload too long"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for TrellisError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            TrellisError::I2c(e) => defmt::write!(f, "I2C error: {}", e),
            TrellisError::DeviceNotReady => defmt::write!(f, "NeoTrellis did not become ready"),
            TrellisError::InvalidKey => defmt::write!(f, "Invalid key index"),
            TrellisError::NotConfigured => defmt::write!(f, "NeoTrellis not configured"),
            TrellisError::PayloadTooLong => defmt::write!(f, "Seesaw write payload too long"),
        }
    }
}
