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

use core::f32::consts::PI;
use micromath::F32Ext;
use smart_leds::RGB8;

const FULL_TURN_DEGREES: f32 = 360.0;
const LOBE_START_DEGREES: f32 = 90.0;
const LOBE_END_DEGREES: f32 = 270.0;

/// Brightness of table entry `index` out of `resolution`: `max(0, sin(angle - 90°))` with the
/// angle spread evenly over one turn. Only the middle half of the turn is lit.
pub fn brightness_factor(index: usize, resolution: usize) -> f32 {
    if resolution == 0 {
        return 0.0;
    }
    let angle = index as f32 * FULL_TURN_DEGREES / resolution as f32;
    if angle <= LOBE_START_DEGREES || angle >= LOBE_END_DEGREES {
        return 0.0;
    }
    let radians = (angle - LOBE_START_DEGREES) * PI / 180.0;
    F32Ext::sin(radians).clamp(0.0, 1.0)
}

/// Scale each channel, truncating towards zero.
pub fn scale_colour(colour: RGB8, factor: f32) -> RGB8 {
    RGB8::new(
        (factor * colour.r as f32) as u8,
        (factor * colour.g as f32) as u8,
        (factor * colour.b as f32) as u8,
    )
}

/// Base colour at every angular step of one turn. Lives for the whole run and is rewritten in
/// place when the colour changes.
pub struct ColourTable<const RESOLUTION: usize> {
    entries: [RGB8; RESOLUTION],
    base_colour: RGB8,
}

impl<const RESOLUTION: usize> ColourTable<RESOLUTION> {
    pub const fn new() -> Self {
        Self {
            entries: [RGB8::new(0, 0, 0); RESOLUTION],
            base_colour: RGB8::new(0, 0, 0),
        }
    }

    pub fn rebuild(&mut self, base_colour: RGB8) {
        self.base_colour = base_colour;
        for (index, entry) in self.entries.iter_mut().enumerate() {
            *entry = scale_colour(base_colour, brightness_factor(index, RESOLUTION));
        }
    }

    pub fn base_colour(&self) -> RGB8 {
        self.base_colour
    }

    pub fn get(&self, index: usize) -> RGB8 {
        self.entries[index % RESOLUTION]
    }

    pub fn as_slice(&self) -> &[RGB8] {
        &self.entries
    }
}

impl<const RESOLUTION: usize> Default for ColourTable<RESOLUTION> {
    fn default() -> Self {
        Self::new()
    }
}
