//! Application-wide constants and compile-time configuration.
//!
//! All pin assignments, timing parameters, and storage constants live here
//! so they can be tuned in one place.

use crate::input::ButtonId;

// Timing (milliseconds)

/// A raw level must hold this long before it is trusted.
pub const DEBOUNCE_MS: u64 = 30;

/// Press duration after which a press becomes a hold.
pub const HOLD_THRESHOLD_MS: u64 = 800;

/// How long the boot splash stays up before the device goes idle.
pub const BOOT_SPLASH_MS: u64 = 2000;

/// Input is discarded for this long after boot or wake.
pub const INPUT_GUARD_MS: u64 = 200;

/// Simulated work latency between accepting a request and committing it.
pub const WORK_DELAY_MS: u64 = 800;

/// Control loop period. Must stay well below `DEBOUNCE_MS`.
pub const POLL_INTERVAL_MS: u64 = 5;

// Behaviour

/// Draw and show one item on a cold boot.
pub const SHOW_ITEM_ON_BOOT: bool = true;

/// The control whose hold-then-release gesture puts the device to sleep.
/// It is also the only wake source.
pub const SLEEP_CONTROL: ButtonId = ButtonId::Sleep;

/// Wake when the sleep control reads low (pressed, active-low wiring).
pub const WAKE_ACTIVE_LOW: bool = true;

// Durable store

/// Namespace shared by every writer of the durable store.
pub const STORE_NAMESPACE: &str = "bards";

/// Flash page index where the store starts (4 KB per page on nRF52840).
pub const STORE_FLASH_PAGE_START: u32 = 240;

/// Number of flash pages reserved for the store.
pub const STORE_FLASH_PAGE_COUNT: u32 = 4;

// GPIO pin assignments (nRF52840-DK numbering, port 0)
//
//   Button RANDOM  → P0.11
//   Button NEXT    → P0.12
//   Button PREV    → P0.24
//   Button SLEEP   → P0.25  (also the System OFF wake pin)
//   I²C SDA        → P0.26
//   I²C SCL        → P0.27
//   RGB LED R/G/B  → P0.13 / P0.14 / P0.15  (active-low)

pub const PIN_RANDOM: u8 = 11;
pub const PIN_NEXT: u8 = 12;
pub const PIN_PREV: u8 = 24;
pub const PIN_SLEEP: u8 = 25;

/// Every pin owned by a control, in `ButtonId` order.
pub const CONTROL_PINS: [u8; 4] = [PIN_SLEEP, PIN_RANDOM, PIN_NEXT, PIN_PREV];

pub const PIN_DISPLAY_SDA: u8 = 26;
pub const PIN_DISPLAY_SCL: u8 = 27;

pub const PIN_LED_RED: u8 = 13;
pub const PIN_LED_GREEN: u8 = 14;
pub const PIN_LED_BLUE: u8 = 15;
