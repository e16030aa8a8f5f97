//! Simulated Seesaw device for protocol tests.
//!
//! Models just enough of the NeoTrellis firmware to drive the driver: a
//! hardware-id register that becomes valid after a configurable delay, the
//! version register, and the keypad event FIFO. Every successful transfer is
//! logged for assertions.

use std::collections::VecDeque;

use embassy_time::{Duration, Instant};
use embedded_hal_async::i2c::{Error, ErrorKind, ErrorType, I2c, Operation};

use crate::registers::{
    FIFO_EMPTY, HW_ID_CODE, KEYPAD_COUNT, KEYPAD_FIFO, MODULE_KEYPAD, MODULE_STATUS, STATUS_HW_ID,
    STATUS_VERSION,
};

/// Version word reported by the simulator.
pub const SIM_VERSION: u32 = 0x0FA5_1E21;

/// One bus transfer as seen by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transfer {
    Write(Vec<u8>),
    /// Read of this many bytes.
    Read(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimError;

impl Error for SimError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct SimSeesaw {
    pub log: Vec<Transfer>,
    pub fifo: VecDeque<u8>,
    /// Hardware id reads return [`HW_ID_CODE`] once this long has passed
    /// since construction; `None` never answers.
    pub ready_after: Option<Duration>,
    /// Fail every transfer once this many have succeeded.
    pub fail_after: Option<usize>,
    /// Forced value of the FIFO count register.
    pub count_override: Option<u8>,
    created: Instant,
    selected: Option<(u8, u8)>,
}

impl SimSeesaw {
    /// A device that answers immediately.
    pub fn ready() -> Self {
        Self::ready_after(Some(Duration::from_ticks(0)))
    }

    pub fn ready_after(delay: Option<Duration>) -> Self {
        Self {
            log: Vec::new(),
            fifo: VecDeque::new(),
            ready_after: delay,
            fail_after: None,
            count_override: None,
            created: Instant::now(),
            selected: None,
        }
    }

    /// Payload-carrying writes (selector included).
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.log
            .iter()
            .filter_map(|t| match t {
                Transfer::Write(bytes) => Some(bytes.clone()),
                Transfer::Read(_) => None,
            })
            .collect()
    }

    /// Payloads of writes addressed to `(module, function)`.
    pub fn writes_to(&self, module: u8, function: u8) -> Vec<Vec<u8>> {
        self.writes()
            .into_iter()
            .filter(|w| w.len() >= 2 && w[0] == module && w[1] == function)
            .map(|w| w[2..].to_vec())
            .collect()
    }

    fn is_ready(&self) -> bool {
        self.ready_after
            .map(|d| self.created.elapsed() >= d)
            .unwrap_or(false)
    }

    fn on_write(&mut self, bytes: &[u8]) {
        if bytes.len() >= 2 {
            self.selected = Some((bytes[0], bytes[1]));
        }
        self.log.push(Transfer::Write(bytes.to_vec()));
    }

    fn on_read(&mut self, buf: &mut [u8]) {
        buf.fill(0);
        match self.selected {
            Some((MODULE_STATUS, STATUS_HW_ID)) => {
                buf[0] = if self.is_ready() { HW_ID_CODE } else { 0x00 };
            }
            Some((MODULE_STATUS, STATUS_VERSION)) => {
                let n = buf.len().min(4);
                buf[..n].copy_from_slice(&SIM_VERSION.to_be_bytes()[..n]);
            }
            Some((MODULE_KEYPAD, KEYPAD_COUNT)) => {
                buf[0] = self
                    .count_override
                    .unwrap_or(self.fifo.len().min(usize::from(u8::MAX - 1)) as u8);
            }
            Some((MODULE_KEYPAD, KEYPAD_FIFO)) => {
                for b in buf.iter_mut() {
                    *b = self.fifo.pop_front().unwrap_or(FIFO_EMPTY);
                }
            }
            _ => {}
        }
        self.log.push(Transfer::Read(buf.len()));
    }
}

impl ErrorType for SimSeesaw {
    type Error = SimError;
}

impl I2c for SimSeesaw {
    async fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations.iter_mut() {
            if let Some(limit) = self.fail_after {
                if self.log.len() >= limit {
                    return Err(SimError);
                }
            }
            match op {
                Operation::Write(bytes) => self.on_write(bytes),
                Operation::Read(buf) => self.on_read(buf),
            }
        }
        Ok(())
    }
}
