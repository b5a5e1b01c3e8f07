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

use crate::led::colour_from_hex;
use embassy_time::Duration;
use smart_leds::RGB8;

/// Pixels on the ring, including the status pixel at the end of the strip.
pub const STRIP_SIZE: usize = 6;

/// Entries in the colour table, i.e. steps in one full rotation.
pub const ANGULAR_RESOLUTION: usize = 150;

pub const LED_BRIGHTNESS: u8 = 75;

pub const STARTUP_COLOUR: RGB8 = colour_from_hex(0x1AB2E7);
pub const NOMINAL_COLOUR: RGB8 = colour_from_hex(0x33CC33);
pub const ALERT_COLOUR: RGB8 = colour_from_hex(0xAE0649);
pub const ERROR_COLOUR: RGB8 = colour_from_hex(0xAA0000);
pub const CALIBRATION_PHASE_1_COLOUR: RGB8 = colour_from_hex(0xFFFF00);
pub const CALIBRATION_PHASE_2_COLOUR: RGB8 = colour_from_hex(0xFFFFAA);

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LighthouseConfig {
    /// Table index offset between neighbouring ring pixels.
    pub phase_step: usize,
    /// Anything strictly heavier than this shows the alert colour.
    pub weight_threshold: f32,
    /// Reference mass placed on the sensor during the second calibration phase, in kg.
    pub known_mass: f32,
    pub report_interval: Duration,
    pub frame_interval: Duration,
    pub stabilizing_time: Duration,
    pub calibration_settle_time: Duration,
    pub error_hold_time: Duration,
    pub startup_window: Duration,
    pub min_samples_per_second: f32,
    pub max_samples_per_second: f32,
    pub led_brightness: u8,
}

impl LighthouseConfig {
    pub const DEFAULT: Self = Self {
        phase_step: 30,
        weight_threshold: 10.0,
        known_mass: 2.0,
        report_interval: Duration::from_millis(750),
        frame_interval: Duration::from_millis(20),
        stabilizing_time: Duration::from_millis(1000),
        calibration_settle_time: Duration::from_secs(5),
        error_hold_time: Duration::from_millis(500),
        startup_window: Duration::from_secs(2),
        min_samples_per_second: 7.0,
        max_samples_per_second: 100.0,
        led_brightness: LED_BRIGHTNESS,
    };
}

impl Default for LighthouseConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
