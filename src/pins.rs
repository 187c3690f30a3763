//! Display pin-set validation.
//!
//! The OLED shares the GPIO bank with the controls, so a bad board config
//! can silently steal a button pin. This is checked once before the display
//! driver is brought up.

/// Pins used by the display. `None` means not wired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayPins {
    pub sda: Option<u8>,
    pub scl: Option<u8>,
    /// Optional hardware reset line.
    pub reset: Option<u8>,
}

/// Why a pin set was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinConflict {
    /// A required pin is not assigned.
    Unassigned,
    /// The pin is already owned by a control.
    ControlPin(u8),
    /// Two required pins share a number.
    Duplicate(u8),
}

/// `true` if `value` appears anywhere in `list`.
pub fn is_in_list(value: u8, list: &[u8]) -> bool {
    list.iter().any(|&item| item == value)
}

/// Check a display pin set against the control pins.
pub fn validate_display_pins(pins: &DisplayPins, control_pins: &[u8]) -> Result<(), PinConflict> {
    let mut required = [0u8; 2];
    for (slot, pin) in required.iter_mut().zip([pins.sda, pins.scl]) {
        *slot = pin.ok_or(PinConflict::Unassigned)?;
    }

    if let Some(&pin) = required.iter().find(|&&pin| is_in_list(pin, control_pins)) {
        return Err(PinConflict::ControlPin(pin));
    }

    for (i, &first) in required.iter().enumerate() {
        if is_in_list(first, &required[i + 1..]) {
            return Err(PinConflict::Duplicate(first));
        }
    }

    match pins.reset {
        Some(pin) if is_in_list(pin, control_pins) => Err(PinConflict::ControlPin(pin)),
        _ => Ok(()),
    }
}
