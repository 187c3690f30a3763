//! Physical controls - four active-low tactile switches.
//!
//!   - SLEEP  - hold then release to deep-sleep; also the wake source
//!   - RANDOM - show a fresh, non-repeating pick
//!   - NEXT   - walk forward through history, or draw when at the newest
//!   - PREV   - walk back through history
//!
//! Each switch is sampled every loop iteration by [`Button::poll`], which
//! debounces the raw level and turns press timing into intent events.

pub mod button;

pub use button::Button;

use crate::time::Millis;
use embedded_hal::digital::InputPin;

/// Identity of a physical control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonId {
    Sleep,
    Random,
    Next,
    Prev,
}

impl ButtonId {
    /// All controls, in polling order.
    pub const ALL: [ButtonId; 4] = [
        ButtonId::Sleep,
        ButtonId::Random,
        ButtonId::Next,
        ButtonId::Prev,
    ];
}

/// Debounced logical state of a control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonState {
    Released,
    Pressed,
}

/// Intent derived from a debounced press.
///
/// A press ends in exactly one of `Tap` or `HoldEnd`; `HoldEnd` only follows
/// a `HoldStart` from the same press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    None,
    Tap,
    HoldStart,
    HoldEnd,
}

/// The full set of controls, polled together.
pub struct Controls<P> {
    buttons: [Button<P>; 4],
}

impl<P: InputPin> Controls<P> {
    /// Take ownership of the four pins, given in [`ButtonId::ALL`] order.
    pub fn new(pins: [P; 4], now: Millis) -> Self {
        let [sleep, random, next, prev] = pins;
        Self {
            buttons: [
                Button::new(ButtonId::Sleep, sleep, now),
                Button::new(ButtonId::Random, random, now),
                Button::new(ButtonId::Next, next, now),
                Button::new(ButtonId::Prev, prev, now),
            ],
        }
    }

    /// Poll every control once.
    pub fn poll(&mut self, now: Millis) -> [(ButtonId, ButtonEvent); 4] {
        let mut events = [(ButtonId::Sleep, ButtonEvent::None); 4];
        for (slot, button) in events.iter_mut().zip(self.buttons.iter_mut()) {
            *slot = (button.id(), button.poll(now));
        }
        events
    }
}
