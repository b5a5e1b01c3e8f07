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

/// Conditions that stop the lamp. Every one of them ends in the error display and a halted
/// control loop, only a reset gets the device going again.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FatalError {
    /// No conversion seen during start up, or the zero measurement did not finish.
    SensorTimeout,
    /// Achieved samples per second outside the accepted band.
    SampleRateOutOfRange(f32),
    /// The sensor driver failed to talk to the ADC.
    SensorReadingError,
    /// The calibration record could not be written.
    StorageFailure,
}

impl FatalError {
    pub fn description(&self) -> &'static str {
        match self {
            FatalError::SensorTimeout => "Load cell timeout, check HX711 wiring and pins",
            FatalError::SampleRateOutOfRange(_) => "Sampling rate outside the accepted band",
            FatalError::SensorReadingError => "Load cell reading failed",
            FatalError::StorageFailure => "Unable to persist calibration",
        }
    }
}
