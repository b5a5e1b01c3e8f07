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

use crate::calibration::{CalibrationRecord, CALIBRATION_RECORD_SIZE};
use crate::storage::{CalibrationStorage, StorageError};
use embedded_storage_async::nor_flash::{MultiwriteNorFlash, NorFlash, ReadNorFlash};

const ERASED_BYTE: u8 = 0xFF;
const MARKER_OFFSET: usize = 0;
const IMAGE_BUFFER_SIZE: usize = 16;

/// Calibration record at a fixed flash address, laid out byte for byte as
/// [`CalibrationRecord::to_bytes`]. Offset and factor go down first, the marker goes into the
/// same (already written) word last, so an interrupted save reads back as invalid.
pub struct FixedLayoutStorage<F> {
    flash: F,
    base_address: u32,
}

impl<F> FixedLayoutStorage<F>
where
    F: MultiwriteNorFlash,
{
    /// `base_address` must sit on an erase boundary, the whole erase block is owned by the record.
    pub fn new(flash: F, base_address: u32) -> Self {
        debug!(
            "Fixed layout storage at 0x{:x}, erase block {} bytes",
            base_address,
            F::ERASE_SIZE
        );
        Self { flash, base_address }
    }

    /// Record length rounded up to what the flash reads and writes in one go.
    fn image_len() -> Result<usize, StorageError> {
        let align = F::WRITE_SIZE.max(F::READ_SIZE);
        let len = CALIBRATION_RECORD_SIZE.div_ceil(align) * align;
        if len > IMAGE_BUFFER_SIZE {
            warn!("Flash write size {} too large for the record image", F::WRITE_SIZE);
            return Err(StorageError::SaveError);
        }
        Ok(len)
    }
}

impl<F> CalibrationStorage for FixedLayoutStorage<F>
where
    F: MultiwriteNorFlash,
{
    async fn load(&mut self) -> Result<Option<CalibrationRecord>, StorageError> {
        let len = Self::image_len().map_err(|_| StorageError::RetrieveError)?;
        let mut image = [ERASED_BYTE; IMAGE_BUFFER_SIZE];
        self.flash
            .read(self.base_address, &mut image[..len])
            .await
            .map_err(|_| {
                warn!("Unable to read calibration record");
                StorageError::RetrieveError
            })?;

        let bytes = &image[..CALIBRATION_RECORD_SIZE];
        if bytes.iter().all(|&b| b == ERASED_BYTE) {
            return Ok(None);
        }
        Ok(CalibrationRecord::from_bytes(bytes))
    }

    async fn save(&mut self, record: &CalibrationRecord) -> Result<(), StorageError> {
        let len = Self::image_len()?;
        let record_bytes = record.to_bytes();

        let erase_end = self.base_address + F::ERASE_SIZE as u32;
        self.flash
            .erase(self.base_address, erase_end)
            .await
            .map_err(|_| {
                warn!("Unable to erase calibration record");
                StorageError::EraseError
            })?;

        // erased marker reads as invalid until the last write
        let mut body = [ERASED_BYTE; IMAGE_BUFFER_SIZE];
        body[..CALIBRATION_RECORD_SIZE].copy_from_slice(&record_bytes);
        body[MARKER_OFFSET] = ERASED_BYTE;
        self.flash
            .write(self.base_address, &body[..len])
            .await
            .map_err(|_| {
                warn!("Unable to write calibration values");
                StorageError::SaveError
            })?;

        let mut marker = [ERASED_BYTE; IMAGE_BUFFER_SIZE];
        marker[MARKER_OFFSET] = record_bytes[MARKER_OFFSET];
        self.flash
            .write(self.base_address, &marker[..len])
            .await
            .map_err(|_| {
                warn!("Unable to write calibration marker");
                StorageError::SaveError
            })
    }
}
