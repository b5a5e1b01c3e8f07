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

pub mod strip;

use core::iter::once;
use smart_leds::{gamma, RGB8};

/// Split a 0xRRGGBB value into its channels.
pub const fn colour_from_hex(hex: u32) -> RGB8 {
    RGB8::new(
        ((hex >> 16) & 0xFF) as u8,
        ((hex >> 8) & 0xFF) as u8,
        (hex & 0xFF) as u8,
    )
}

pub const fn colour_to_hex(colour: RGB8) -> u32 {
    ((colour.r as u32) << 16) | ((colour.g as u32) << 8) | colour.b as u32
}

pub trait LedDriver {
    /// Clear the pixel buffer and get ready to show frames.
    fn begin(&mut self);

    fn pixel_count(&self) -> usize;

    fn set_brightness(&mut self, brightness: u8);

    /// Out of range indices are ignored.
    fn set_pixel_color(&mut self, index: usize, colour: RGB8);

    fn fill(&mut self, colour: RGB8);

    /// Push the pixel buffer out to the hardware.
    async fn show(&mut self);

    fn gamma_correct(&self, colour: RGB8) -> RGB8 {
        gamma(once(colour)).next().unwrap_or_default()
    }

    /// Whole strip in one gamma corrected colour, shown straight away.
    async fn show_solid(&mut self, colour: RGB8) {
        let corrected = self.gamma_correct(colour);
        self.fill(corrected);
        self.show().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colours_split_into_channels() {
        let colour = colour_from_hex(0xAE0649);
        assert_eq!(colour, RGB8::new(0xAE, 0x06, 0x49));
        assert_eq!(colour_to_hex(colour), 0xAE0649);
    }
}
