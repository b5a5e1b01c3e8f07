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

pub mod store;

use sequential_storage::map::{SerializationError, Value};

/// Marker byte of a record written by a completed calibration.
pub const CALIBRATION_VALID_MARKER: u8 = 0x01;

/// marker (1) + tare offset (4) + scale factor (4), little endian.
pub const CALIBRATION_RECORD_SIZE: usize = 9;

const MARKER_OFFSET: usize = 0;
const TARE_OFFSET_OFFSET: usize = 1;
const SCALE_FACTOR_OFFSET: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationRecord {
    pub marker: u8,
    pub tare_offset: i32,
    pub scale_factor: f32,
}

/// Calibration the sensor ended up running with.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EffectiveCalibration {
    pub tare_offset: i32,
    pub scale_factor: f32,
}

impl CalibrationRecord {
    pub const fn new(tare_offset: i32, scale_factor: f32) -> Self {
        Self {
            marker: CALIBRATION_VALID_MARKER,
            tare_offset,
            scale_factor,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.marker == CALIBRATION_VALID_MARKER
    }

    pub fn effective(&self) -> EffectiveCalibration {
        EffectiveCalibration {
            tare_offset: self.tare_offset,
            scale_factor: self.scale_factor,
        }
    }

    pub fn to_bytes(&self) -> [u8; CALIBRATION_RECORD_SIZE] {
        let mut bytes = [0; CALIBRATION_RECORD_SIZE];
        bytes[MARKER_OFFSET] = self.marker;
        bytes[TARE_OFFSET_OFFSET..SCALE_FACTOR_OFFSET].copy_from_slice(&self.tare_offset.to_le_bytes());
        bytes[SCALE_FACTOR_OFFSET..].copy_from_slice(&self.scale_factor.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < CALIBRATION_RECORD_SIZE {
            return None;
        }
        let mut offset = [0; 4];
        offset.copy_from_slice(&bytes[TARE_OFFSET_OFFSET..SCALE_FACTOR_OFFSET]);
        let mut factor = [0; 4];
        factor.copy_from_slice(&bytes[SCALE_FACTOR_OFFSET..CALIBRATION_RECORD_SIZE]);
        Some(Self {
            marker: bytes[MARKER_OFFSET],
            tare_offset: i32::from_le_bytes(offset),
            scale_factor: f32::from_le_bytes(factor),
        })
    }
}

impl Value<'_> for CalibrationRecord {
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        if buffer.len() < CALIBRATION_RECORD_SIZE {
            return Err(SerializationError::BufferTooSmall);
        }
        buffer[..CALIBRATION_RECORD_SIZE].copy_from_slice(&self.to_bytes());
        Ok(CALIBRATION_RECORD_SIZE)
    }

    fn deserialize_from(buffer: &[u8]) -> Result<Self, SerializationError>
    where
        Self: Sized,
    {
        Self::from_bytes(buffer).ok_or(SerializationError::BufferTooSmall)
    }
}
