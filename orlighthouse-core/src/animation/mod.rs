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

//! Rotating glow. One sine lobe of the base colour is precomputed into a table covering a full
//! turn, each ring pixel then samples that table a fixed number of steps ahead of its
//! neighbour while the whole thing rotates one step per frame.

mod colour_table;

pub use colour_table::{brightness_factor, scale_colour, ColourTable};

use crate::led::LedDriver;
use smart_leds::RGB8;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnimationState {
    /// No table yet, nothing is drawn.
    Idle,
    /// Table matches the base colour, every tick renders a frame.
    Built,
}

/// Table index shown by a ring pixel for the current rotation.
pub const fn sample_index(rotation_index: usize, pixel: usize, phase_step: usize, table_length: usize) -> usize {
    (rotation_index + pixel * phase_step) % table_length
}

pub struct AnimationEngine<const RESOLUTION: usize> {
    table: ColourTable<RESOLUTION>,
    state: AnimationState,
    base_colour: RGB8,
    rotation_index: usize,
    phase_step: usize,
    rebuilds: u32,
}

impl<const RESOLUTION: usize> AnimationEngine<RESOLUTION> {
    pub const fn new(phase_step: usize) -> Self {
        Self {
            table: ColourTable::new(),
            state: AnimationState::Idle,
            base_colour: RGB8::new(0, 0, 0),
            rotation_index: 0,
            phase_step,
            rebuilds: 0,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn base_colour(&self) -> RGB8 {
        self.base_colour
    }

    pub fn rotation_index(&self) -> usize {
        self.rotation_index
    }

    pub fn table(&self) -> &ColourTable<RESOLUTION> {
        &self.table
    }

    /// How many times the table has been recomputed since boot.
    pub fn rebuild_count(&self) -> u32 {
        self.rebuilds
    }

    pub fn on_color_change(&mut self, colour: RGB8) {
        self.base_colour = colour;
        self.table.rebuild(colour);
        self.rebuilds = self.rebuilds.wrapping_add(1);
        self.state = AnimationState::Built;
        trace!("Colour table rebuilt, {} entries", RESOLUTION);
    }

    /// Draw one frame and step the rotation. Returns false when there is no table to draw from.
    pub async fn render_frame<L: LedDriver>(&mut self, leds: &mut L) -> bool {
        if self.state == AnimationState::Idle || RESOLUTION == 0 {
            return false;
        }
        let pixel_count = leds.pixel_count();
        if pixel_count == 0 {
            return false;
        }

        let status_pixel = pixel_count - 1;
        let status_colour = leds.gamma_correct(self.base_colour);
        leds.set_pixel_color(status_pixel, status_colour);

        for pixel in 0..status_pixel {
            let index = sample_index(self.rotation_index, pixel, self.phase_step, RESOLUTION);
            let colour = leds.gamma_correct(self.table.get(index));
            leds.set_pixel_color(pixel, colour);
        }
        leds.show().await;

        self.rotation_index = (self.rotation_index + 1) % RESOLUTION;
        true
    }
}
