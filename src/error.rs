//! Unified error type for bards-assistant.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for on-target logging.

use crate::input::ButtonId;
use crate::pins::PinConflict;

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Storage
    /// Flash read/write/erase failed.
    Storage,

    /// The store region has no room left for the item.
    StoreFull,

    // Power
    /// The requested control cannot wake the device.
    WakeSourceUnavailable(ButtonId),

    /// Programming the wake source failed.
    WakeConfig,

    // UI / Display
    /// I²C transaction to the display failed.
    Display,

    /// The display pin set is unusable.
    InvalidPins(PinConflict),

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,
}

// Convenience conversions

impl From<PinConflict> for Error {
    fn from(e: PinConflict) -> Self {
        Error::InvalidPins(e)
    }
}
