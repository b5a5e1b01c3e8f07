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

pub mod hx711_adc;
pub mod interface;
pub mod monitor;

use embassy_time::Duration;

/// Load cell ADC with smoothing, tare and calibration built in.
pub trait LoadSensor {
    type Error;

    /// Power up the ADC.
    async fn begin(&mut self) -> Result<(), Self::Error>;

    fn set_tare_offset(&mut self, offset: i32);

    fn set_cal_factor(&mut self, factor: f32);

    /// Keep converting for `stabilizing_time`, optionally taring at the end. Sets the signal
    /// timeout flag if the ADC never produced a conversion.
    async fn start(&mut self, stabilizing_time: Duration, tare_on_start: bool) -> Result<(), Self::Error>;

    /// Never waits for the ADC. Returns true when a new conversion was added to the dataset.
    async fn update(&mut self) -> Result<bool, Self::Error>;

    /// Smoothed, tared and scaled weight.
    fn get_data(&self) -> f32;

    /// Blocking zero measurement. Sets the tare timeout flag if it could not finish.
    async fn tare(&mut self) -> Result<(), Self::Error>;

    fn get_tare_offset(&self) -> i32;

    /// Replace the whole dataset with fresh conversions.
    async fn refresh_dataset(&mut self) -> Result<(), Self::Error>;

    /// Work out and apply the scale factor that makes the current reading equal `known_mass`.
    fn get_new_calibration(&mut self, known_mass: f32) -> f32;

    fn get_sps(&self) -> f32;

    fn tare_timeout(&self) -> bool;

    fn signal_timeout(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WeightClass {
    Nominal,
    Alert,
}

/// Raw ADC counts to mass units.
pub fn calibrated_weight(raw: i32, tare_offset: i32, scale_factor: f32) -> f32 {
    (raw as i64 - tare_offset as i64) as f32 / scale_factor
}

/// Strictly heavier than the threshold is an alert, the threshold itself is still nominal.
pub fn classify(weight: f32, threshold: f32) -> WeightClass {
    if weight > threshold {
        WeightClass::Alert
    } else {
        WeightClass::Nominal
    }
}
