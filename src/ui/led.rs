//! RGB status LED, one GPIO per channel, active-low.
//!
//! | State       | Colour |
//! |-------------|--------|
//! | Boot        | blue   |
//! | Idle        | green  |
//! | Working     | yellow |
//! | Sleep armed | red    |

use bards_assistant::board::Indicator;
use embassy_nrf::gpio::Output;

pub struct RgbLed<'d> {
    red: Output<'d>,
    green: Output<'d>,
    blue: Output<'d>,
}

impl<'d> RgbLed<'d> {
    /// Takes the three channel outputs, already driven high (off).
    pub fn new(red: Output<'d>, green: Output<'d>, blue: Output<'d>) -> Self {
        Self { red, green, blue }
    }

    fn set(&mut self, red: bool, green: bool, blue: bool) {
        for (pin, on) in [
            (&mut self.red, red),
            (&mut self.green, green),
            (&mut self.blue, blue),
        ] {
            if on {
                pin.set_low();
            } else {
                pin.set_high();
            }
        }
    }
}

impl Indicator for RgbLed<'_> {
    fn show_boot(&mut self) {
        self.set(false, false, true);
    }

    fn show_idle(&mut self) {
        self.set(false, true, false);
    }

    fn show_working(&mut self) {
        self.set(true, true, false);
    }

    fn show_sleep_armed(&mut self) {
        self.set(true, false, false);
    }

    fn off(&mut self) {
        self.set(false, false, false);
    }
}
