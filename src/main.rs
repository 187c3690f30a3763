//! The Bard's Assistant - firmware entry point.
//!
//! Brings up the nRF52840 peripherals, wraps them in the board
//! collaborators, then runs the application loop at a fixed poll rate until
//! the sleep gesture powers the chip down.

#![no_std]
#![no_main]

mod power;
mod storage;
mod ui;

use bards_assistant::board::{Indicator, Notice, PowerControl, Render, Screen};
use bards_assistant::catalog::CATALOG;
use bards_assistant::config::{
    CONTROL_PINS, PIN_DISPLAY_SCL, PIN_DISPLAY_SDA, POLL_INTERVAL_MS, STORE_NAMESPACE,
};
use bards_assistant::input::{ButtonId, Controls};
use bards_assistant::persist::DurableStore;
use bards_assistant::pins::{validate_display_pins, DisplayPins};
use bards_assistant::{App, Error};
use defmt::{info, warn};
use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Input, Level, Output, OutputDrive, Pull};
use embassy_nrf::nvmc::Nvmc;
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals, rng};
use embassy_time::{Duration, Instant, Ticker};
use embedded_storage_async::nor_flash::NorFlash;
use power::SystemOff;
use storage::FlashStore;
use ui::display::{self, OledScreen};
use ui::led::RgbLed;
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    RNG => rng::InterruptHandler<peripherals::RNG>;
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

/// Everything the application drives, one field per collaborator.
struct Board<'d, I2C, F> {
    led: RgbLed<'d>,
    screen: OledScreen<I2C>,
    power: SystemOff,
    store: FlashStore<F>,
}

impl<I2C, F> Indicator for Board<'_, I2C, F> {
    fn show_boot(&mut self) {
        self.led.show_boot();
    }

    fn show_idle(&mut self) {
        self.led.show_idle();
    }

    fn show_working(&mut self) {
        self.led.show_working();
    }

    fn show_sleep_armed(&mut self) {
        self.led.show_sleep_armed();
    }

    fn off(&mut self) {
        self.led.off();
    }
}

impl<I2C: embedded_hal::i2c::I2c, F> Screen for Board<'_, I2C, F> {
    fn show_title(&mut self) {
        self.screen.show_title();
    }

    fn show_item(&mut self, text: &str, render: Render) {
        self.screen.show_item(text, render);
    }

    fn show_notice(&mut self, notice: Notice) {
        self.screen.show_notice(notice);
    }
}

impl<I2C, F> PowerControl for Board<'_, I2C, F> {
    fn enable_wake_on(&mut self, control: ButtonId, active_low: bool) -> Result<(), Error> {
        self.power.enable_wake_on(control, active_low)
    }

    fn suspend(&mut self) {
        self.power.suspend();
    }
}

impl<I2C, F: NorFlash> DurableStore for Board<'_, I2C, F> {
    fn get_scalar(&mut self, key: &'static str, default: u32) -> u32 {
        self.store.get_scalar(key, default)
    }

    fn put_scalar(&mut self, key: &'static str, value: u32) -> Result<(), Error> {
        self.store.put_scalar(key, value)
    }

    fn get_bytes(&mut self, key: &'static str, buf: &mut [u8]) -> usize {
        self.store.get_bytes(key, buf)
    }

    fn put_bytes(&mut self, key: &'static str, bytes: &[u8]) -> Result<(), Error> {
        self.store.put_bytes(key, bytes)
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    info!("The Bard's Assistant starting...");

    // Controls, in ButtonId::ALL order (see config::CONTROL_PINS).
    let pins = [
        Input::new(p.P0_25, Pull::Up),
        Input::new(p.P0_11, Pull::Up),
        Input::new(p.P0_12, Pull::Up),
        Input::new(p.P0_24, Pull::Up),
    ];

    let led = RgbLed::new(
        Output::new(p.P0_13, Level::High, OutputDrive::Standard),
        Output::new(p.P0_14, Level::High, OutputDrive::Standard),
        Output::new(p.P0_15, Level::High, OutputDrive::Standard),
    );

    let display_pins = DisplayPins {
        sda: Some(PIN_DISPLAY_SDA),
        scl: Some(PIN_DISPLAY_SCL),
        reset: None,
    };
    let oled = match validate_display_pins(&display_pins, &CONTROL_PINS) {
        Ok(()) => {
            let i2c = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
            match display::init(i2c) {
                Ok(display) => Some(display),
                Err(e) => {
                    warn!("Display disabled: {:?}", e);
                    None
                }
            }
        }
        Err(conflict) => {
            warn!("Display disabled: {:?}", Error::from(conflict));
            None
        }
    };

    let mut board = Board {
        led,
        screen: OledScreen::new(oled),
        power: SystemOff::new(CONTROL_PINS),
        store: FlashStore::new(BlockingAsync::new(Nvmc::new(p.NVMC)), STORE_NAMESPACE),
    };

    let rng = rng::Rng::new(p.RNG, Irqs);
    let now = Instant::now().as_millis();
    let mut controls = Controls::new(pins, now);
    let mut app = App::boot(&CATALOG, rng, &mut board, now);

    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));
    loop {
        app.step(&mut controls, &mut board, Instant::now().as_millis());
        ticker.next().await;
    }
}
