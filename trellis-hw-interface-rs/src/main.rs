//! trellis-hw-interface
//!
//! 4×4 key instrument firmware for the Raspberry Pi Pico 2. Wires the two
//! library crates into a live loop:
//!
//! 1. A key is pressed on the NeoTrellis (or on a wired matrix when built
//!    with the `wired-matrix` feature).
//! 2. The key source produces a `ButtonEvent`: the NeoTrellis FIFO is polled
//!    every 10 ms from the consumer loop; the wired scanner runs on a
//!    high-priority interrupt executor and pushes into the `EVENTS` queue.
//! 3. The consumer lights the key with its palette colour and starts the
//!    key's note on the PWM speaker output; on release the key goes dark and
//!    the note decays.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::pwm::{self, Pwm};
use embassy_time::{Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use trellis::{AudioEngine, ButtonEvent, Edge, EnvelopeConfig, PeriodSetting, ToneOutput};

#[cfg(not(feature = "wired-matrix"))]
use embassy_rp::bind_interrupts;
#[cfg(not(feature = "wired-matrix"))]
use embassy_rp::i2c::{self, I2c};
#[cfg(not(feature = "wired-matrix"))]
use embassy_rp::peripherals::I2C0;
#[cfg(not(feature = "wired-matrix"))]
use neotrellis_driver::{NeoTrellis, DEFAULT_ADDRESS, NEOTRELLIS_NEOPIXEL_PIN, STARTUP_READY_TIMEOUT};

#[cfg(feature = "wired-matrix")]
use embassy_executor::InterruptExecutor;
#[cfg(feature = "wired-matrix")]
use embassy_rp::gpio::{Input, Level, Output, Pull};
#[cfg(feature = "wired-matrix")]
use embassy_rp::interrupt;
#[cfg(feature = "wired-matrix")]
use embassy_rp::interrupt::{InterruptExt, Priority};
#[cfg(feature = "wired-matrix")]
use trellis::matrix::{MatrixScanner, ScanTiming};
#[cfg(feature = "wired-matrix")]
use static_cell::StaticCell;
#[cfg(feature = "wired-matrix")]
use trellis::{EventConsumer, EventProducer, EventQueue};

// ---------------------------------------------------------------------------
// Boot block and interrupt binding
// ---------------------------------------------------------------------------

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = embassy_rp::block::ImageDef::secure_exe();

// Wire the I2C0 peripheral interrupt to Embassy's async handler.
#[cfg(not(feature = "wired-matrix"))]
bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

// ---------------------------------------------------------------------------
// Board constants
// ---------------------------------------------------------------------------

/// NeoTrellis bus speed. The Seesaw is unreliable above 100 kHz.
#[cfg(not(feature = "wired-matrix"))]
const I2C_FREQUENCY_HZ: u32 = 100_000;

/// Let the NeoTrellis power up before the first transaction.
const POWER_ON_DELAY: Duration = Duration::from_millis(500);

/// Wait after the software reset before polling the hardware id.
#[cfg(not(feature = "wired-matrix"))]
const POST_RESET_DELAY: Duration = Duration::from_secs(1);

/// Pause between bring-up stages.
#[cfg(not(feature = "wired-matrix"))]
const STAGE_DELAY: Duration = Duration::from_millis(200);

/// Keypad FIFO poll period.
#[cfg(not(feature = "wired-matrix"))]
const POLL_INTERVAL: Duration = Duration::from_millis(10);

// ---------------------------------------------------------------------------
// Static storage
// ---------------------------------------------------------------------------

/// Wired scanner → consumer loop. Split once in `main`: the scanner task
/// owns the producer end, the consumer loop the consumer end.
#[cfg(feature = "wired-matrix")]
static EVENTS: StaticCell<EventQueue> = StaticCell::new();

#[cfg(feature = "wired-matrix")]
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[cfg(feature = "wired-matrix")]
#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

// ---------------------------------------------------------------------------
// Speaker output
// ---------------------------------------------------------------------------

/// PWM channel A driving the speaker.
///
/// Keeps the whole slice config so a level change never resets the
/// divider or period.
struct PwmTone<'d> {
    pwm: Pwm<'d>,
    config: pwm::Config,
}

impl<'d> PwmTone<'d> {
    fn new(mut pwm: Pwm<'d>) -> Self {
        let mut config = pwm::Config::default();
        config.top = PeriodSetting::SILENT.top;
        config.divider = PeriodSetting::SILENT.divider.into();
        config.compare_a = 0;
        config.enable = true;
        pwm.set_config(&config);
        Self { pwm, config }
    }
}

impl ToneOutput for PwmTone<'_> {
    fn set_period(&mut self, setting: PeriodSetting) {
        self.config.divider = setting.divider.into();
        self.config.top = setting.top;
        self.pwm.set_config(&self.config);
    }

    fn set_level(&mut self, level: u16) {
        self.config.compare_a = level;
        self.pwm.set_config(&self.config);
    }
}

type Speaker = AudioEngine<PwmTone<'static>>;

/// Start or release the key's note.
async fn sound_event(speaker: &mut Speaker, event: ButtonEvent) {
    match event.edge {
        Edge::Pressed => {
            if let Err(e) = speaker.play_index(event.index).await {
                warn!("Key {} has no note: {}", event.index, e);
            }
        }
        Edge::Released => {
            speaker.release(event.index).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Wired-matrix scanner on the interrupt executor. Only touches GPIO and
/// the event queue.
#[cfg(feature = "wired-matrix")]
#[embassy_executor::task]
async fn matrix_scan_task(
    mut scanner: MatrixScanner<Output<'static>, Input<'static>>,
    mut events: EventProducer<'static>,
) {
    info!("Matrix scanner started");
    match scanner.run(&mut events).await {
        Ok(never) | Err(never) => match never {},
    }
}

#[cfg(feature = "wired-matrix")]
async fn consume_matrix(mut events: EventConsumer<'static>, mut speaker: Speaker) -> ! {
    loop {
        let packed = events.pop().await;
        match ButtonEvent::from_packed(packed) {
            Some(event) => {
                info!("Key {} {}", event.index, event.edge);
                sound_event(&mut speaker, event).await;
            }
            None => warn!("Dropped malformed queue entry {=u16:#x}", packed),
        }
    }
}

#[cfg(not(feature = "wired-matrix"))]
async fn consume_neotrellis(
    mut trellis: NeoTrellis<I2c<'static, I2C0, i2c::Async>>,
    mut speaker: Speaker,
) -> ! {
    loop {
        match trellis.poll_batch().await {
            Ok(events) => {
                for event in events {
                    info!("Key {} {}", event.index, event.edge);
                    if let Err(e) = trellis.set_key_light(event.index, event.is_pressed()).await {
                        warn!("LED update failed: {}", e);
                    }
                    sound_event(&mut speaker, event).await;
                }
            }
            Err(e) => warn!("Keypad poll failed: {}", e),
        }
        Timer::after(POLL_INTERVAL).await;
    }
}

/// Reset and configure the NeoTrellis. Any failure halts the firmware.
#[cfg(not(feature = "wired-matrix"))]
async fn bring_up(trellis: &mut NeoTrellis<I2c<'static, I2C0, i2c::Async>>) {
    if let Err(e) = trellis.reset().await {
        defmt::panic!("NeoTrellis reset failed: {}", e);
    }
    info!("NeoTrellis reset OK");
    Timer::after(POST_RESET_DELAY).await;

    if !trellis.wait_ready(STARTUP_READY_TIMEOUT).await {
        defmt::panic!("NeoTrellis not ready");
    }

    match trellis.status().await {
        Ok(status) => info!(
            "Seesaw hw_id={=u8:#x} product={} version={=u32:#x}",
            status.hw_id,
            status.product_code(),
            status.version
        ),
        Err(e) => warn!("Could not read Seesaw status: {}", e),
    }

    if let Err(e) = trellis.begin(NEOTRELLIS_NEOPIXEL_PIN).await {
        defmt::panic!("NeoPixel setup failed: {}", e);
    }

    // Animation failures are logged, not fatal.
    if let Err(e) = trellis.rainbow_startup().await {
        warn!("Startup animation failed: {}", e);
    }
    Timer::after(STAGE_DELAY).await;

    if let Err(e) = trellis.keypad_init().await {
        defmt::panic!("Keypad setup failed: {}", e);
    }
    info!("Keypad ready");
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("trellis-hw-interface starting");

    // —— Pin assignments ————————————————————————————————————————————————————
    // I2C_SDA → GP20  (p.PIN_20)
    // I2C_SCL → GP21  (p.PIN_21)
    // SPEAKER → GP16  (p.PIN_16)  PWM slice 0, channel A
    // COL0..3 → GP6..GP9           wired matrix only, driven high one at a time
    // ROW0..3 → GP2..GP5           wired matrix only, pull-down
    // ———————————————————————————————————————————————————————————————————————

    let speaker = AudioEngine::new(
        PwmTone::new(Pwm::new_output_a(p.PWM_SLICE0, p.PIN_16, pwm::Config::default())),
        clk_sys_freq(),
        EnvelopeConfig::default(),
    );
    info!("Speaker PWM ready, clk_sys={} Hz", clk_sys_freq());

    Timer::after(POWER_ON_DELAY).await;

    #[cfg(feature = "wired-matrix")]
    {
        let columns = [
            Output::new(p.PIN_6, Level::Low),
            Output::new(p.PIN_7, Level::Low),
            Output::new(p.PIN_8, Level::Low),
            Output::new(p.PIN_9, Level::Low),
        ];
        let rows = [
            Input::new(p.PIN_2, Pull::Down),
            Input::new(p.PIN_3, Pull::Down),
            Input::new(p.PIN_4, Pull::Down),
            Input::new(p.PIN_5, Pull::Down),
        ];
        let scanner = MatrixScanner::new(columns, rows, ScanTiming::default());
        let (producer, consumer) = EVENTS.init(EventQueue::new()).split();

        interrupt::SWI_IRQ_1.set_priority(Priority::P2);
        let spawner_high = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
        spawner_high.spawn(unwrap!(matrix_scan_task(scanner, producer)));

        info!("Ready, press keys");
        consume_matrix(consumer, speaker).await
    }

    #[cfg(not(feature = "wired-matrix"))]
    {
        let mut config = i2c::Config::default();
        config.frequency = I2C_FREQUENCY_HZ;
        let i2c = I2c::new_async(
            p.I2C0,
            p.PIN_21, // SCL
            p.PIN_20, // SDA
            Irqs,
            config,
        );

        let mut trellis = NeoTrellis::new(i2c, DEFAULT_ADDRESS);
        bring_up(&mut trellis).await;

        info!("Ready, press keys");
        consume_neotrellis(trellis, speaker).await
    }
}
