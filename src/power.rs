//! Deep sleep via nRF52840 System OFF.
//!
//! System OFF stops everything but the GPIO sense logic (~0.4 µA). A pin
//! configured with SENSE wakes the chip, which then comes back through a
//! full reset, so `suspend` never returns and the next run starts at `main`.
//!
//! Only port 0 is sensed here; every control is wired to port 0.

use bards_assistant::board::PowerControl;
use bards_assistant::input::ButtonId;
use bards_assistant::Error;
use defmt::{info, warn};
use embassy_nrf::pac;
use embassy_nrf::pac::gpio::vals::{Dir, Input, Pull, Sense};

pub struct SystemOff {
    /// Port-0 pin per control, in `ButtonId::ALL` order.
    pins: [u8; 4],
}

impl SystemOff {
    pub fn new(pins: [u8; 4]) -> Self {
        Self { pins }
    }

    fn pin_for(&self, control: ButtonId) -> u8 {
        let slot = ButtonId::ALL
            .iter()
            .position(|&id| id == control)
            .unwrap_or(0);
        self.pins[slot]
    }
}

impl PowerControl for SystemOff {
    fn enable_wake_on(&mut self, control: ButtonId, active_low: bool) -> Result<(), Error> {
        let pin = self.pin_for(control);
        if pin >= 32 {
            warn!("Power: {:?} on P1.{} cannot wake", control, pin - 32);
            return Err(Error::WakeSourceUnavailable(control));
        }

        let (pull, sense) = if active_low {
            (Pull::PULLUP, Sense::LOW)
        } else {
            (Pull::PULLDOWN, Sense::HIGH)
        };
        let cnf = pac::P0.pin_cnf(pin as usize);
        cnf.write(|w| {
            w.set_dir(Dir::INPUT);
            w.set_input(Input::CONNECT);
            w.set_pull(pull);
            w.set_sense(sense);
        });

        if cnf.read().sense() != sense {
            return Err(Error::WakeConfig);
        }
        info!("Power: wake armed on P0.{} ({:?})", pin, control);
        Ok(())
    }

    fn suspend(&mut self) {
        info!("Power: entering System OFF");
        // Let RTT drain the last log lines.
        cortex_m::asm::delay(64_000 * 20);
        pac::POWER.systemoff().write(|w| w.set_systemoff(true));
        // The write takes effect asynchronously; park until it does.
        loop {
            cortex_m::asm::wfe();
        }
    }
}
