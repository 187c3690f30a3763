//! Host-testable core of the Bard's Assistant firmware.
//!
//! Everything that decides behaviour lives here: debounced input, the
//! selection engine, the suspend/resume protocol and the application state
//! machine. Hardware is reached only through the traits in [`board`] and
//! [`persist::DurableStore`].
//!
//! Usage: `cargo test --lib` / `cargo test`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and binds the nRF52840 peripherals to those traits.

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

pub mod app;
pub mod board;
pub mod catalog;
pub mod config;
pub mod error;
pub mod input;
pub mod persist;
pub mod pins;
pub mod selection;
pub mod time;

#[cfg(test)]
mod testing;

#[path = "ui/wrap.rs"]
mod ui_wrap_impl;

pub mod ui {
    pub mod wrap {
        pub use crate::ui_wrap_impl::{wrap, Wrap};
    }
}

pub use app::{App, Mode};
pub use error::Error;

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════
