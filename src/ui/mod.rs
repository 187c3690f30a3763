//! Board-side user interface: the SSD1306 OLED and the RGB status LED.
//!
//! Both implement the application's collaborator traits; neither holds any
//! application state.

pub mod display;
pub mod led;
