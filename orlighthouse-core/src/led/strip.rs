// Copyright (C) 2025 Paul Hampson
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License version 3 as  published by the
// Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::led::LedDriver;
use smart_leds::{brightness, RGB8};

/// Whatever clocks the pixel data out to the strip (PIO, SPI, ...).
pub trait PixelWriter<const LED_COUNT: usize> {
    async fn write(&mut self, pixels: &[RGB8; LED_COUNT]);
}

/// Frame buffer in front of a [`PixelWriter`]. Colours are stored as given and the global
/// brightness is only applied on the way out.
pub struct LedStrip<W, const LED_COUNT: usize> {
    writer: W,
    led_state: [RGB8; LED_COUNT],
    brightness: u8,
}

impl<W, const LED_COUNT: usize> LedStrip<W, LED_COUNT>
where
    W: PixelWriter<LED_COUNT>,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            led_state: [RGB8::default(); LED_COUNT],
            brightness: u8::MAX,
        }
    }

    pub fn pixels(&self) -> &[RGB8; LED_COUNT] {
        &self.led_state
    }
}

impl<W, const LED_COUNT: usize> LedDriver for LedStrip<W, LED_COUNT>
where
    W: PixelWriter<LED_COUNT>,
{
    fn begin(&mut self) {
        self.led_state = [RGB8::default(); LED_COUNT];
    }

    fn pixel_count(&self) -> usize {
        LED_COUNT
    }

    fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    fn set_pixel_color(&mut self, index: usize, colour: RGB8) {
        if let Some(led) = self.led_state.get_mut(index) {
            *led = colour;
        }
    }

    fn fill(&mut self, colour: RGB8) {
        self.led_state.fill(colour);
    }

    async fn show(&mut self) {
        let mut scaled_leds = [RGB8::default(); LED_COUNT];
        for (idx, led) in brightness(self.led_state.iter().cloned(), self.brightness).enumerate() {
            scaled_leds[idx] = led;
        }
        self.writer.write(&scaled_leds).await;
    }
}
