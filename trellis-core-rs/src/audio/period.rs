//! Frequency → PWM period arithmetic.

/// Largest value of the 16-bit period ("top"/wrap) register.
pub const MAX_TOP: u32 = u16::MAX as u32;

/// Largest integer clock divider.
pub const MAX_DIVIDER: u8 = 255;

/// Frequencies below this are treated as silence.
pub const MIN_AUDIBLE_HZ: f32 = 20.0;

/// Clock divider and period register value for one output frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeriodSetting {
    /// Integer clock divider, 1–255.
    pub divider: u8,
    /// Counter wrap value; the output period is `top + 1` divided clocks.
    pub top: u16,
}

impl PeriodSetting {
    /// Period programmed while the channel is silent.
    pub const SILENT: Self = Self { divider: 1, top: 0 };

    /// Compare level giving a 50% duty cycle.
    pub fn half_duty_level(&self) -> u16 {
        ((u32::from(self.top) + 1) / 2) as u16
    }

    /// Frequency actually produced for a given system clock.
    pub fn frequency(&self, clock_hz: u32) -> f32 {
        clock_hz as f32 / (f32::from(self.divider) * (f32::from(self.top) + 1.0))
    }
}

/// Compute the period setting for `frequency` Hz from a `clock_hz` clock.
///
/// Uses `top = round(clock / frequency) - 1` at divider 1. When that overflows
/// the 16-bit register, dividers 2..=255 are tried in order and the first one
/// that fits is used.
///
/// Returns `None` for non-positive or non-finite frequencies, frequencies too
/// low to fit even at the largest divider, and frequencies at or above half
/// the clock.
pub fn compute_period(clock_hz: u32, frequency: f32) -> Option<PeriodSetting> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return None;
    }

    let clock = clock_hz as f32;
    for divider in 1..=MAX_DIVIDER {
        let ticks = clock / (frequency * f32::from(divider));
        // Round half up; the saturating cast caps absurdly low frequencies.
        let rounded = (ticks + 0.5) as u32;
        if rounded < 2 {
            return None;
        }

        let top = rounded - 1;
        if top <= MAX_TOP {
            return Some(PeriodSetting {
                divider,
                top: top as u16,
            });
        }
    }

    None
}
