//! Single-voice tone state machine with click-suppressing envelopes.
//!
//! ```text
//!            play(f)                       stop() / play(f < 20 Hz)
//!  Silent ──────────▶ attack ramp ──▶ Sounding ──────────▶ decay ramp ──▶ Silent
//!                                        │  ▲
//!                                        └──┘ play(f'): retrigger policy
//! ```
//!
//! Jumping the compare level straight from 0 to 50% (or back) is a DC step on
//! the speaker and is heard as a click. Both transitions therefore ramp the
//! level linearly over [`EnvelopeConfig::steps`] steps. The ramps run inline
//! in the caller's task: while a ramp is in progress the consumer loop does
//! not service new key events.

use embassy_time::{Duration, Timer};

use super::note_for_index;
use super::period::{compute_period, PeriodSetting, MIN_AUDIBLE_HZ};
use crate::error::AudioError;

/// Hardware seam: one PWM channel wired to the speaker.
pub trait ToneOutput {
    /// Program the clock divider and period (wrap) register.
    fn set_period(&mut self, setting: PeriodSetting);

    /// Program the compare level (duty cycle numerator).
    fn set_level(&mut self, level: u16);
}

/// What happens when a note is requested while another is sounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RetriggerPolicy {
    /// Ramp the current voice down, then attack the new one.
    #[default]
    DecayFirst,
    /// Switch period and level in place, without ramps.
    Immediate,
}

/// Envelope shape and retrigger behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EnvelopeConfig {
    /// Number of level steps per ramp. `0` disables ramping.
    pub steps: u8,
    /// Delay between successive ramp steps.
    pub step_delay: Duration,
    pub retrigger: RetriggerPolicy,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            steps: 10,
            step_delay: Duration::from_micros(500),
            retrigger: RetriggerPolicy::DecayFirst,
        }
    }
}

/// State of the single voice.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Voice {
    /// Requested frequency in Hz; `0.0` when silent.
    pub frequency: f32,
    /// Period register value currently programmed.
    pub top: u16,
    /// Clock divider currently programmed.
    pub divider: u8,
    /// Compare level currently programmed.
    pub level: u16,
    pub playing: bool,
    /// Key that started the note, if it came from [`AudioEngine::play_index`].
    pub index: Option<u8>,
}

impl Voice {
    const SILENT: Self = Self {
        frequency: 0.0,
        top: PeriodSetting::SILENT.top,
        divider: PeriodSetting::SILENT.divider,
        level: 0,
        playing: false,
        index: None,
    };
}

impl Default for Voice {
    fn default() -> Self {
        Self::SILENT
    }
}

/// Monophonic tone engine.
pub struct AudioEngine<P> {
    output: P,
    clock_hz: u32,
    envelope: EnvelopeConfig,
    voice: Voice,
}

impl<P> AudioEngine<P>
where
    P: ToneOutput,
{
    /// Take ownership of the output and force it silent.
    ///
    /// # Arguments
    /// * `output` — PWM channel driving the speaker
    /// * `clock_hz` — PWM input clock (the system clock on RP2xxx)
    /// * `envelope` — ramp shape and retrigger policy
    pub fn new(mut output: P, clock_hz: u32, envelope: EnvelopeConfig) -> Self {
        output.set_level(0);
        output.set_period(PeriodSetting::SILENT);

        Self {
            output,
            clock_hz,
            envelope,
            voice: Voice::SILENT,
        }
    }

    /// Current voice state.
    pub fn voice(&self) -> &Voice {
        &self.voice
    }

    /// Borrow the output channel.
    pub fn output(&self) -> &P {
        &self.output
    }

    /// Give the output channel back.
    pub fn into_output(self) -> P {
        self.output
    }

    /// Sound `frequency` Hz.
    ///
    /// Frequencies below [`MIN_AUDIBLE_HZ`] (and NaN) silence the channel.
    ///
    /// # Errors
    /// * [`AudioError::FrequencyOutOfRange`] if no divider can produce the
    ///   frequency; the current voice is left untouched.
    pub async fn play(&mut self, frequency: f32) -> Result<(), AudioError> {
        // Negated so NaN also lands here.
        if !(frequency >= MIN_AUDIBLE_HZ) {
            self.stop().await;
            return Ok(());
        }

        let setting =
            compute_period(self.clock_hz, frequency).ok_or(AudioError::FrequencyOutOfRange)?;
        let target = setting.half_duty_level();

        if self.voice.playing {
            match self.envelope.retrigger {
                RetriggerPolicy::DecayFirst => self.ramp_down().await,
                RetriggerPolicy::Immediate => {
                    self.output.set_period(setting);
                    self.output.set_level(target);
                    self.voice = Self::sounding(frequency, setting, target);
                    return Ok(());
                }
            }
        }

        self.output.set_level(0);
        self.output.set_period(setting);
        self.voice = Self::sounding(frequency, setting, 0);
        self.ramp_up(target).await;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "tone {} Hz: div={} top={}",
            frequency,
            setting.divider,
            setting.top
        );

        Ok(())
    }

    /// Sound the note assigned to key `index`.
    ///
    /// # Errors
    /// * [`AudioError::InvalidIndex`] if `index` is not a key on the grid
    /// * [`AudioError::FrequencyOutOfRange`] as for [`play`](Self::play)
    pub async fn play_index(&mut self, index: u8) -> Result<(), AudioError> {
        let frequency = note_for_index(index).ok_or(AudioError::InvalidIndex)?;
        self.play(frequency).await?;
        self.voice.index = Some(index);
        Ok(())
    }

    /// Ramp down (if sounding) and silence the channel.
    pub async fn stop(&mut self) {
        if self.voice.playing {
            self.ramp_down().await;
        }
        self.output.set_level(0);
        self.output.set_period(PeriodSetting::SILENT);
        self.voice = Voice::SILENT;
    }

    /// Stop the voice if key `index` is the one sounding.
    ///
    /// Returns `true` when the voice was stopped. Releasing any other key
    /// leaves the current note alone.
    pub async fn release(&mut self, index: u8) -> bool {
        if self.voice.playing && self.voice.index == Some(index) {
            self.stop().await;
            true
        } else {
            false
        }
    }

    fn sounding(frequency: f32, setting: PeriodSetting, level: u16) -> Voice {
        Voice {
            frequency,
            top: setting.top,
            divider: setting.divider,
            level,
            playing: true,
            index: None,
        }
    }

    /// Linear ramp from 0 up to `target`.
    async fn ramp_up(&mut self, target: u16) {
        let steps = u32::from(self.envelope.steps);
        if steps == 0 {
            self.set_level(target);
            return;
        }

        for step in 1..=steps {
            self.set_level((u32::from(target) * step / steps) as u16);
            if step < steps {
                Timer::after(self.envelope.step_delay).await;
            }
        }
    }

    /// Linear ramp from the current level down to 0.
    async fn ramp_down(&mut self) {
        let start = u32::from(self.voice.level);
        let steps = u32::from(self.envelope.steps);
        if steps == 0 {
            self.set_level(0);
            return;
        }

        for step in 1..=steps {
            self.set_level((start * (steps - step) / steps) as u16);
            if step < steps {
                Timer::after(self.envelope.step_delay).await;
            }
        }
    }

    fn set_level(&mut self, level: u16) {
        self.output.set_level(level);
        self.voice.level = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_time::Instant;

    const CLOCK_HZ: u32 = 150_000_000;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        Period(PeriodSetting),
        Level(u16),
    }

    #[derive(Default)]
    struct RecordingPwm {
        ops: Vec<Op>,
    }

    impl RecordingPwm {
        fn levels(&self) -> Vec<u16> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Level(l) => Some(*l),
                    Op::Period(_) => None,
                })
                .collect()
        }
    }

    impl ToneOutput for RecordingPwm {
        fn set_period(&mut self, setting: PeriodSetting) {
            self.ops.push(Op::Period(setting));
        }

        fn set_level(&mut self, level: u16) {
            self.ops.push(Op::Level(level));
        }
    }

    fn no_delay(retrigger: RetriggerPolicy) -> EnvelopeConfig {
        EnvelopeConfig {
            steps: 10,
            step_delay: Duration::from_ticks(0),
            retrigger,
        }
    }

    fn engine(retrigger: RetriggerPolicy) -> AudioEngine<RecordingPwm> {
        let mut e = AudioEngine::new(RecordingPwm::default(), CLOCK_HZ, no_delay(retrigger));
        e.output.ops.clear();
        e
    }

    #[test]
    fn starts_silent() {
        let e = AudioEngine::new(RecordingPwm::default(), CLOCK_HZ, EnvelopeConfig::default());
        assert_eq!(
            e.output().ops,
            vec![Op::Level(0), Op::Period(PeriodSetting::SILENT)]
        );
        assert!(!e.voice().playing);
        assert_eq!(e.voice().frequency, 0.0);
    }

    #[test]
    fn play_programs_period_then_ramps_to_half_duty() {
        let mut e = engine(RetriggerPolicy::DecayFirst);
        block_on(e.play(5_000.0)).unwrap();

        let setting = PeriodSetting { divider: 1, top: 29_999 };
        assert_eq!(e.output().ops[0], Op::Level(0));
        assert_eq!(e.output().ops[1], Op::Period(setting));

        let ramp: Vec<u16> = e.output().levels()[1..].to_vec();
        assert_eq!(ramp.len(), 10);
        assert!(ramp.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(ramp[0], 1_500);
        assert_eq!(*ramp.last().unwrap(), 15_000);

        let v = e.voice();
        assert!(v.playing);
        assert_eq!(v.top, 29_999);
        assert_eq!(v.divider, 1);
        assert_eq!(v.level, 15_000);
        assert_eq!(v.frequency, 5_000.0);
    }

    #[test]
    fn stop_ramps_down_then_zeroes_period() {
        let mut e = engine(RetriggerPolicy::DecayFirst);
        block_on(e.play(5_000.0)).unwrap();
        e.output.ops.clear();

        block_on(e.stop());

        let ops = &e.output().ops;
        let ramp: Vec<u16> = e.output().levels();
        assert_eq!(&ramp[..10], &[13_500, 12_000, 10_500, 9_000, 7_500, 6_000, 4_500, 3_000, 1_500, 0]);
        assert_eq!(ops.last(), Some(&Op::Period(PeriodSetting::SILENT)));
        assert_eq!(*e.voice(), Voice::default());
    }

    #[test]
    fn stop_while_silent_does_not_ramp() {
        let mut e = engine(RetriggerPolicy::DecayFirst);
        block_on(e.stop());
        assert_eq!(
            e.output().ops,
            vec![Op::Level(0), Op::Period(PeriodSetting::SILENT)]
        );
    }

    #[test]
    fn inaudible_frequency_silences_without_period_calculation() {
        let mut e = engine(RetriggerPolicy::DecayFirst);
        block_on(e.play(440.0)).unwrap();
        e.output.ops.clear();

        block_on(e.play(0.0)).unwrap();
        assert!(!e.voice().playing);
        // Only the silent period is ever programmed.
        assert!(e
            .output()
            .ops
            .iter()
            .all(|op| !matches!(op, Op::Period(p) if *p != PeriodSetting::SILENT)));

        block_on(e.play(12.0)).unwrap();
        block_on(e.play(f32::NAN)).unwrap();
        assert!(!e.voice().playing);
    }

    #[test]
    fn out_of_range_keeps_current_voice() {
        let mut e = AudioEngine::new(RecordingPwm::default(), 1_000, no_delay(RetriggerPolicy::DecayFirst));
        assert_eq!(block_on(e.play(100.0)), Ok(()));
        let before = *e.voice();
        assert_eq!(block_on(e.play(900.0)), Err(AudioError::FrequencyOutOfRange));
        assert_eq!(*e.voice(), before);
    }

    #[test]
    fn decay_first_retrigger_ramps_down_before_new_attack() {
        let mut e = engine(RetriggerPolicy::DecayFirst);
        block_on(e.play(5_000.0)).unwrap();
        e.output.ops.clear();

        block_on(e.play(10_000.0)).unwrap();
        let levels = e.output().levels();
        // 10 decay steps ending at zero, the pre-attack zero, 10 attack steps.
        assert_eq!(levels.len(), 21);
        assert_eq!(levels[9], 0);
        assert_eq!(levels[10], 0);
        assert_eq!(*levels.last().unwrap(), 7_500);
        assert_eq!(e.voice().top, 14_999);
    }

    #[test]
    fn immediate_retrigger_switches_in_place() {
        let mut e = engine(RetriggerPolicy::Immediate);
        block_on(e.play(5_000.0)).unwrap();
        e.output.ops.clear();

        block_on(e.play(10_000.0)).unwrap();
        assert_eq!(
            e.output().ops,
            vec![
                Op::Period(PeriodSetting { divider: 1, top: 14_999 }),
                Op::Level(7_500),
            ]
        );
        assert!(e.voice().playing);
    }

    #[test]
    fn play_index_tracks_key_and_release_matches_it() {
        let mut e = engine(RetriggerPolicy::DecayFirst);
        block_on(e.play_index(9)).unwrap();
        assert_eq!(e.voice().index, Some(9));
        assert_eq!(e.voice().frequency, 440.0);

        // Releasing another key keeps the note.
        assert!(!block_on(e.release(3)));
        assert!(e.voice().playing);

        assert!(block_on(e.release(9)));
        assert!(!e.voice().playing);
        assert_eq!(e.voice().index, None);
    }

    #[test]
    fn play_index_rejects_off_grid_keys() {
        let mut e = engine(RetriggerPolicy::DecayFirst);
        assert_eq!(block_on(e.play_index(16)), Err(AudioError::InvalidIndex));
        assert!(e.output().ops.is_empty());
    }

    #[test]
    fn plain_play_clears_key_ownership() {
        let mut e = engine(RetriggerPolicy::DecayFirst);
        block_on(e.play_index(0)).unwrap();
        block_on(e.play(1_000.0)).unwrap();
        assert_eq!(e.voice().index, None);
        assert!(!block_on(e.release(0)));
    }

    #[test]
    fn attack_takes_steps_minus_one_delays() {
        let config = EnvelopeConfig {
            steps: 10,
            step_delay: Duration::from_millis(2),
            retrigger: RetriggerPolicy::DecayFirst,
        };
        let mut e = AudioEngine::new(RecordingPwm::default(), CLOCK_HZ, config);

        let start = Instant::now();
        block_on(e.play(440.0)).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(18));
    }

    #[test]
    fn zero_steps_jumps_directly() {
        let config = EnvelopeConfig {
            steps: 0,
            ..no_delay(RetriggerPolicy::DecayFirst)
        };
        let mut e = AudioEngine::new(RecordingPwm::default(), CLOCK_HZ, config);
        e.output.ops.clear();
        block_on(e.play(5_000.0)).unwrap();
        assert_eq!(e.output().levels(), vec![0, 15_000]);
    }
}
