//! Hardware collaborators the application drives.
//!
//! All calls are fire-and-forget except [`PowerControl::enable_wake_on`],
//! whose failure aborts a suspend attempt. The firmware implements these on
//! the nRF52840; tests implement them with recorders.

use crate::error::Error;
use crate::input::ButtonId;
use crate::persist::DurableStore;
use crate::selection::Action;

/// Single status indicator, driven by semantic state.
pub trait Indicator {
    fn show_boot(&mut self);
    fn show_idle(&mut self);
    fn show_working(&mut self);
    fn show_sleep_armed(&mut self);
    fn off(&mut self);
}

/// Why an item is being drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderReason {
    /// Picked at cold boot.
    Boot,
    /// Restored after waking from deep sleep.
    Resume,
    /// A requested action completed.
    Complete,
}

/// What to draw alongside an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Render {
    pub index: u16,
    pub action: Option<Action>,
    pub reason: RenderReason,
}

/// Degraded conditions shown instead of an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notice {
    EmptyCatalog,
    InvalidIndex(u16),
}

/// Content display.
pub trait Screen {
    fn show_title(&mut self);
    fn show_item(&mut self, text: &str, render: Render);
    fn show_notice(&mut self, notice: Notice);
}

/// Deep-sleep primitive.
pub trait PowerControl {
    /// Arm `control` as wake source at the given level.
    fn enable_wake_on(&mut self, control: ButtonId, active_low: bool) -> Result<(), Error>;
    /// Enter deep sleep. Does not return on hardware; the next run starts at
    /// boot.
    fn suspend(&mut self);
}

/// Everything the application needs from the board.
pub trait Board: Indicator + Screen + PowerControl + DurableStore {}

impl<T> Board for T where T: Indicator + Screen + PowerControl + DurableStore {}
