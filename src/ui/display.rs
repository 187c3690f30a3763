//! SSD1306 OLED screen.
//!
//! 128×64 pixels with the 6×10 font gives 21 columns. Row 1 is a header
//! (what happened, which item), rows 2-5 hold the word-wrapped item text.

use bards_assistant::board::{Notice, Render, RenderReason, Screen};
use bards_assistant::selection::Action;
use bards_assistant::ui::wrap::wrap;
use bards_assistant::Error;
use core::fmt::Write;
use defmt::warn;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use embedded_graphics::text::Text;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

const COLUMNS: usize = 21;
const BODY_ROWS: usize = 4;

/// Type alias for the concrete display driver.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// Initialise the SSD1306 display and clear the screen.
pub fn init<I2C>(i2c: I2C) -> Result<Display<I2C>, Error>
where
    I2C: embedded_hal::i2c::I2c,
{
    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    display.init().map_err(|_| Error::Display)?;
    display.clear_buffer();
    display.flush().map_err(|_| Error::Display)?;
    Ok(display)
}

fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

fn draw_header<I2C>(display: &mut Display<I2C>, header: &str)
where
    I2C: embedded_hal::i2c::I2c,
{
    let _ = Text::new(header, Point::new(0, 8), text_style()).draw(display);
    let _ = Line::new(Point::new(0, 11), Point::new(127, 11))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(display);
}

fn draw_body<I2C>(display: &mut Display<I2C>, text: &str)
where
    I2C: embedded_hal::i2c::I2c,
{
    for (row, line) in wrap(text, COLUMNS).take(BODY_ROWS).enumerate() {
        let y = 24 + (row as i32 * 11);
        let _ = Text::new(line, Point::new(0, y), text_style()).draw(display);
    }
}

fn header_for(render: &Render) -> heapless::String<COLUMNS> {
    let label = match (render.reason, render.action) {
        (RenderReason::Resume, _) => "Welcome back",
        (_, Some(Action::Random)) | (RenderReason::Boot, None) => "Random",
        (_, Some(Action::Next)) => "Next",
        (_, Some(Action::Prev)) => "Previous",
        (RenderReason::Complete, None) => "",
    };
    let mut header = heapless::String::new();
    let _ = write!(header, "{label} #{}", u32::from(render.index) + 1);
    header
}

/// The OLED, if one was found on valid pins. Every call is a no-op without
/// it.
pub struct OledScreen<I2C> {
    display: Option<Display<I2C>>,
}

impl<I2C: embedded_hal::i2c::I2c> OledScreen<I2C> {
    pub fn new(display: Option<Display<I2C>>) -> Self {
        Self { display }
    }

    fn draw(&mut self, header: &str, body: &str) {
        let Some(display) = self.display.as_mut() else {
            return;
        };
        display.clear_buffer();
        draw_header(display, header);
        draw_body(display, body);
        if display.flush().is_err() {
            warn!("Display: flush failed");
        }
    }
}

impl<I2C: embedded_hal::i2c::I2c> Screen for OledScreen<I2C> {
    fn show_title(&mut self) {
        self.draw("The Bard's Assistant", "Sharpening wit...");
    }

    fn show_item(&mut self, text: &str, render: Render) {
        let header = header_for(&render);
        self.draw(&header, text);
    }

    fn show_notice(&mut self, notice: Notice) {
        match notice {
            Notice::EmptyCatalog => self.draw("No insults", "The catalog is empty."),
            Notice::InvalidIndex(index) => {
                let mut body: heapless::String<COLUMNS> = heapless::String::new();
                let _ = write!(body, "Bad index {index}");
                self.draw("Error", &body);
            }
        }
    }
}
