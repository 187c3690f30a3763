//! Polled debouncer with tap/hold classification.
//!
//! Per poll:
//! 1. A raw level that differs from the previous sample restarts the
//!    debounce window and nothing is emitted.
//! 2. Inside the debounce window nothing is emitted.
//! 3. Past it the level is trusted: Released→Pressed arms the press,
//!    Pressed→Released emits `Tap` or `HoldEnd`, and a press that stays down
//!    past the hold threshold emits `HoldStart` once.
//!
//! A glitch shorter than the debounce window never stabilises and yields no
//! event at all.

use super::{ButtonEvent, ButtonId, ButtonState};
use crate::config::{DEBOUNCE_MS, HOLD_THRESHOLD_MS};
use crate::time::{has_elapsed, Millis};
use embedded_hal::digital::InputPin;

/// One debounced, active-low control.
pub struct Button<P> {
    id: ButtonId,
    pin: P,
    /// Last raw sample, `true` = pin low (pressed).
    last_reading: bool,
    /// When the raw sample last changed.
    last_change: Millis,
    state: ButtonState,
    pressed_at: Millis,
    hold_fired: bool,
}

impl<P: InputPin> Button<P> {
    /// Take the current raw level as baseline and start out released, so a
    /// switch held through reset is only seen once it has been stable.
    pub fn new(id: ButtonId, mut pin: P, now: Millis) -> Self {
        let last_reading = pin.is_low().unwrap_or(false);
        Self {
            id,
            pin,
            last_reading,
            last_change: now,
            state: ButtonState::Released,
            pressed_at: 0,
            hold_fired: false,
        }
    }

    pub fn id(&self) -> ButtonId {
        self.id
    }

    /// Debounced logical state.
    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// Sample the pin and advance the state machine.
    ///
    /// A failed pin read counts as "no new sample".
    pub fn poll(&mut self, now: Millis) -> ButtonEvent {
        let Ok(raw) = self.pin.is_low() else {
            return ButtonEvent::None;
        };

        if raw != self.last_reading {
            self.last_reading = raw;
            self.last_change = now;
            return ButtonEvent::None;
        }

        if !has_elapsed(now, self.last_change, DEBOUNCE_MS) {
            return ButtonEvent::None;
        }

        match (self.state, raw) {
            (ButtonState::Released, true) => {
                self.state = ButtonState::Pressed;
                self.pressed_at = now;
                self.hold_fired = false;
                ButtonEvent::None
            }
            (ButtonState::Pressed, false) => {
                self.state = ButtonState::Released;
                if self.hold_fired {
                    ButtonEvent::HoldEnd
                } else {
                    ButtonEvent::Tap
                }
            }
            (ButtonState::Pressed, true)
                if !self.hold_fired && has_elapsed(now, self.pressed_at, HOLD_THRESHOLD_MS) =>
            {
                self.hold_fired = true;
                ButtonEvent::HoldStart
            }
            _ => ButtonEvent::None,
        }
    }
}
